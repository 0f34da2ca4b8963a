use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk band derived from a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
    /// The source could not be queried; says nothing about the hazard itself.
    Unknown,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=15 => RiskLevel::Low,
            16..=40 => RiskLevel::Medium,
            41..=70 => RiskLevel::High,
            _ => RiskLevel::VeryHigh,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very_high",
            RiskLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp any intermediate score into the 0-100 range.
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub text: String,
    pub latitude: f64,
    pub longitude: f64,
    pub kommunenummer: String,
    pub kommunenavn: String,
    #[serde(default)]
    pub postnummer: String,
    #[serde(default)]
    pub poststed: String,
}

impl Address {
    pub fn new(latitude: f64, longitude: f64, kommunenummer: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            latitude,
            longitude,
            kommunenummer: kommunenummer.into(),
            kommunenavn: String::new(),
            postnummer: String::new(),
            poststed: String::new(),
        }
    }
}

/// Outcome of a single hazard check.
///
/// Build it through [`HazardResult::scored`] or [`HazardResult::unavailable`] so the
/// score stays in range and the level always matches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardResult {
    pub id: String,
    pub name: String,
    pub description: String,
    pub score: u8,
    pub level: RiskLevel,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub const DATA_UNAVAILABLE: &str = "data unavailable";

impl HazardResult {
    pub fn scored(
        id: impl Into<String>,
        name: impl Into<String>,
        score: i64,
        description: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        let score = clamp_score(score);
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            score,
            level: RiskLevel::from_score(score),
            details: details.into(),
            error: None,
        }
    }

    pub fn unavailable(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            score: 0,
            level: RiskLevel::Unknown,
            details: String::new(),
            error: Some(DATA_UNAVAILABLE.to_string()),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.error.is_some()
    }
}

/// A past landslide event near the query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub location: String,
    pub building_damage: bool,
    pub road_damage: bool,
    pub fatalities: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "distance_m")]
    pub distance_meters: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub event: String,
    pub severity: String,
    pub description: String,
    pub instruction: String,
    pub area: String,
}

/// Full answer for one address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub address: Address,
    pub overall_score: u8,
    pub overall_level: RiskLevel,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    pub hazards: Vec<HazardResult>,
    pub weather_alerts: Vec<WeatherAlert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_events: Option<Vec<HistoricalEvent>>,
}

impl RiskAssessment {
    pub fn hazard(&self, id: &str) -> Option<&HazardResult> {
        self.hazards.iter().find(|h| h.id == id)
    }
}
