use crate::domain::model::Address;
use crate::utils::error::{Result, RiskError};
use url::Url;

pub const MIN_LATITUDE: f64 = 57.0;
pub const MAX_LATITUDE: f64 = 72.0;
pub const MIN_LONGITUDE: f64 = 4.0;
pub const MAX_LONGITUDE: f64 = 32.0;

pub const MAX_TEXT_CHARS: usize = 500;
pub const MAX_MUNICIPALITY_NAME_CHARS: usize = 200;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RiskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RiskError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RiskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(RiskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RiskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN fails both comparisons, so reject it explicitly via partial_cmp
    if value.partial_cmp(&min).is_none() || value < min || value > max {
        return Err(RiskError::ValidationError {
            message: format!("{} must be between {} and {} (got {})", field_name, min, max, value),
        });
    }
    Ok(())
}

/// Norwegian municipality numbers are exactly four ASCII digits.
pub fn validate_municipality_code(field_name: &str, code: &str) -> Result<()> {
    if code.len() != 4 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RiskError::ValidationError {
            message: format!("{} must be four digits (got '{}')", field_name, code),
        });
    }
    Ok(())
}

/// Cut to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

impl Validate for Address {
    fn validate(&self) -> Result<()> {
        validate_range("latitude", self.latitude, MIN_LATITUDE, MAX_LATITUDE)?;
        validate_range("longitude", self.longitude, MIN_LONGITUDE, MAX_LONGITUDE)?;
        validate_municipality_code("kommunenummer", &self.kommunenummer)
    }
}
