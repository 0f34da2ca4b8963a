//! Lookups over loosely typed ArcGIS feature attributes.
//!
//! Upstream layers disagree on field names and casing, so every lookup takes an
//! ordered list of candidate keys and returns the first usable value.

use serde_json::{Map, Value};

pub type Attributes = Map<String, Value>;

/// First non-empty string among `keys`.
pub fn string_attr(attrs: &Attributes, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| attrs.get(*k))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Like [`string_attr`], then falls back to a case-insensitive match on the same keys.
pub fn string_attr_ci(attrs: &Attributes, keys: &[&str]) -> Option<String> {
    string_attr(attrs, keys).or_else(|| {
        keys.iter().find_map(|wanted| {
            attrs
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case(wanted))
                .filter_map(|(_, v)| v.as_str())
                .find(|s| !s.is_empty())
                .map(str::to_string)
        })
    })
}

/// First positive whole number among `keys`. Numeric strings are accepted too.
pub fn count_attr(attrs: &Attributes, keys: &[&str]) -> u32 {
    keys.iter()
        .filter_map(|k| attrs.get(*k))
        .filter_map(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .find(|n| *n > 0.0)
        .map(|n| n.min(u32::MAX as f64) as u32)
        .unwrap_or(0)
}

/// Identifier normalised to a string, whether upstream sends it as text or number.
pub fn id_attr(attrs: &Attributes, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| attrs.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(i.to_string()),
                None => n.as_f64().map(|f| format!("{}", f)),
            },
            _ => None,
        })
}

/// "Ja"/"Yes"/true count as set.
pub fn flag_attr(attrs: &Attributes, keys: &[&str]) -> bool {
    keys.iter().filter_map(|k| attrs.get(*k)).any(|v| match v {
        Value::Bool(b) => *b,
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("ja") || s.eq_ignore_ascii_case("yes")
        }
        _ => false,
    })
}
