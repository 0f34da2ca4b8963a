use crate::domain::model::{clamp_score, HazardResult, RiskLevel};

const COASTAL_ELEVATION_LIMIT_M: f64 = 5.0;
const COASTAL_BOOST: i64 = 10;

/// County prefixes (first two digits of the municipality code) with coastline.
const COASTAL_COUNTIES: [&str; 16] = [
    "03", "11", "15", "18", "30", "32", "33", "34", "38", "39", "40", "42", "46", "50", "55", "56",
];

#[derive(Debug, Clone, PartialEq)]
pub struct OverallRisk {
    pub score: u8,
    pub level: RiskLevel,
    pub summary: String,
}

pub fn is_coastal_municipality(kommunenummer: &str) -> bool {
    kommunenummer
        .get(..2)
        .is_some_and(|county| COASTAL_COUNTIES.contains(&county))
}

/// Worst single hazard, plus a flat boost for low-lying coastal addresses.
pub fn compose(hazards: &[HazardResult], elevation: Option<f64>, kommunenummer: &str) -> OverallRisk {
    let mut score = hazards.iter().map(|h| i64::from(h.score)).max().unwrap_or(0);

    let low_lying = elevation.is_some_and(|m| m < COASTAL_ELEVATION_LIMIT_M);
    if low_lying && is_coastal_municipality(kommunenummer) {
        score += COASTAL_BOOST;
    }

    let score = clamp_score(score);
    let level = RiskLevel::from_score(score);
    OverallRisk {
        score,
        level,
        summary: summary(score, level),
    }
}

pub fn summary(score: u8, level: RiskLevel) -> String {
    match level {
        RiskLevel::Low => {
            "The address has a low natural hazard risk. No known hazard zones are registered here."
                .to_string()
        }
        RiskLevel::Medium => {
            "The address has a moderate risk. Some awareness areas are registered nearby.".to_string()
        }
        RiskLevel::High => format!(
            "The address has a high risk (score {}/100). One or more natural hazard zones are registered at this point.",
            score
        ),
        RiskLevel::VeryHigh => format!(
            "The address has a very high risk (score {}/100). Several serious natural hazard zones are registered. Consider getting a professional assessment.",
            score
        ),
        RiskLevel::Unknown => String::new(),
    }
}
