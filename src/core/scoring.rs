//! Per-source scoring rules. Everything here is pure: the adapters do the I/O and
//! hand over an already-classified outcome.

use crate::core::attributes::{string_attr_ci, Attributes};
use crate::domain::model::HazardResult;
use crate::domain::registry::SourceId;

/// What a single point-intersect layer query produced.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerOutcome {
    /// The point lies in at least one feature; carries the first feature's attributes.
    Hit(Attributes),
    Miss,
    Failed,
}

impl LayerOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, LayerOutcome::Hit(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FloodPeriod {
    pub source: SourceId,
    pub label: &'static str,
    pub score: u8,
}

/// Shorter return period, higher severity.
pub const FLOOD_PERIODS: [FloodPeriod; 5] = [
    FloodPeriod { source: SourceId::Flood10, label: "10-year flood", score: 90 },
    FloodPeriod { source: SourceId::Flood20, label: "20-year flood", score: 75 },
    FloodPeriod { source: SourceId::Flood50, label: "50-year flood", score: 55 },
    FloodPeriod { source: SourceId::Flood100, label: "100-year flood", score: 40 },
    FloodPeriod { source: SourceId::Flood200, label: "200-year flood", score: 25 },
];

/// A hazard scored purely on whether the point intersects one layer.
#[derive(Debug, Clone, Copy)]
pub struct PresenceHazard {
    pub id: &'static str,
    pub name: &'static str,
    pub zone: &'static str,
    pub source: SourceId,
    pub present_score: u8,
}

pub const PRESENCE_HAZARDS: [PresenceHazard; 5] = [
    PresenceHazard {
        id: "flood_awareness",
        name: "Flood awareness",
        zone: "Flood awareness area",
        source: SourceId::FloodAwareness,
        present_score: 35,
    },
    PresenceHazard {
        id: "landslide",
        name: "Debris and soil slides",
        zone: "Awareness area for debris and soil slides",
        source: SourceId::Landslide,
        present_score: 60,
    },
    PresenceHazard {
        id: "avalanche",
        name: "Snow avalanche",
        zone: "Awareness area for snow avalanches",
        source: SourceId::Avalanche,
        present_score: 70,
    },
    PresenceHazard {
        id: "rock_fall",
        name: "Rock fall",
        zone: "Awareness area for rock fall",
        source: SourceId::RockFall,
        present_score: 65,
    },
    PresenceHazard {
        id: "combined_hazard",
        name: "Landslide hazard zones",
        zone: "Landslide hazard zone",
        source: SourceId::CombinedHazard,
        present_score: 75,
    },
];

pub const FLOOD_ZONES_ID: &str = "flood_zones";
pub const FLOOD_ZONES_NAME: &str = "Flood zones";
pub const QUICK_CLAY_ID: &str = "quick_clay";
pub const QUICK_CLAY_NAME: &str = "Quick clay";
pub const STORM_SURGE_ID: &str = "storm_surge";
pub const STORM_SURGE_NAME: &str = "Storm surge";

const QUICK_CLAY_GRADE_KEYS: [&str; 4] = ["faregrad", "Faregrad", "FAREGRAD", "faregradTekst"];
const UNKNOWN_GRADE: &str = "Unknown";

/// Worst matching return period wins. Failed periods count as no match, unless
/// every period failed, in which case nothing can be said.
pub fn score_flood_zones(outcomes: &[(FloodPeriod, LayerOutcome)]) -> HazardResult {
    if !outcomes.is_empty() && outcomes.iter().all(|(_, o)| *o == LayerOutcome::Failed) {
        return HazardResult::unavailable(FLOOD_ZONES_ID, FLOOD_ZONES_NAME);
    }

    let worst = outcomes
        .iter()
        .filter(|(_, outcome)| outcome.is_hit())
        .map(|(period, _)| period)
        .max_by_key(|period| period.score);

    match worst {
        Some(period) => HazardResult::scored(
            FLOOD_ZONES_ID,
            FLOOD_ZONES_NAME,
            period.score.into(),
            format!("Inside {} zone", period.label),
            format!(
                "The address lies in a mapped flood zone ({}). Flooding is possible in extreme weather.",
                period.label
            ),
        ),
        None => HazardResult::scored(
            FLOOD_ZONES_ID,
            FLOOD_ZONES_NAME,
            0,
            "Not in a mapped flood zone",
            "No mapped flood zones at this point.",
        ),
    }
}

pub fn score_presence(hazard: &PresenceHazard, outcome: &LayerOutcome) -> HazardResult {
    match outcome {
        LayerOutcome::Failed => HazardResult::unavailable(hazard.id, hazard.name),
        LayerOutcome::Hit(_) => HazardResult::scored(
            hazard.id,
            hazard.name,
            hazard.present_score.into(),
            hazard.zone,
            format!("The address lies in a mapped {}.", hazard.zone.to_lowercase()),
        ),
        LayerOutcome::Miss => HazardResult::scored(
            hazard.id,
            hazard.name,
            0,
            "Not in an awareness area",
            format!("No registered {} hazard at this point.", hazard.name.to_lowercase()),
        ),
    }
}

/// Read the hazard grade from a detailed quick-clay feature.
pub fn quick_clay_grade(attrs: &Attributes) -> String {
    string_attr_ci(attrs, &QUICK_CLAY_GRADE_KEYS).unwrap_or_else(|| UNKNOWN_GRADE.to_string())
}

fn quick_clay_grade_score(grade: &str) -> i64 {
    match grade.trim().to_lowercase().as_str() {
        "høy" | "hoy" | "high" => 80,
        "middels" | "medium" => 50,
        _ => 25,
    }
}

/// The detailed layer takes precedence; the overview layer is consulted only when
/// the detailed one had nothing to say.
pub fn score_quick_clay(detailed: &LayerOutcome, overview: Option<&LayerOutcome>) -> HazardResult {
    if let LayerOutcome::Hit(attrs) = detailed {
        let grade = quick_clay_grade(attrs);
        return HazardResult::scored(
            QUICK_CLAY_ID,
            QUICK_CLAY_NAME,
            quick_clay_grade_score(&grade),
            format!("Quick clay zone (hazard grade: {})", grade),
            "The address lies in an area with mapped quick clay hazard.",
        );
    }

    match overview {
        Some(LayerOutcome::Hit(_)) => HazardResult::scored(
            QUICK_CLAY_ID,
            QUICK_CLAY_NAME,
            40,
            "Quick clay awareness area",
            "The address lies in a general awareness area for quick clay.",
        ),
        Some(LayerOutcome::Miss) => HazardResult::scored(
            QUICK_CLAY_ID,
            QUICK_CLAY_NAME,
            0,
            "Not in a quick clay area",
            "No registered quick clay hazard at this point.",
        ),
        Some(LayerOutcome::Failed) | None => HazardResult::unavailable(QUICK_CLAY_ID, QUICK_CLAY_NAME),
    }
}

/// Storm-surge consequence data for a municipality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StormSurgeLookup {
    /// Number of consequence scenarios published for the municipality.
    Scenarios(usize),
    /// Upstream has no entry for the municipality (typically inland).
    NotCovered,
    Failed,
}

pub fn score_storm_surge(lookup: StormSurgeLookup, elevation: Option<f64>) -> HazardResult {
    let no_data = |details: &str| {
        HazardResult::scored(STORM_SURGE_ID, STORM_SURGE_NAME, 0, "No storm surge data", details)
    };

    match lookup {
        StormSurgeLookup::Scenarios(0) | StormSurgeLookup::NotCovered => {
            return no_data("No storm surge data is available for this municipality.")
        }
        StormSurgeLookup::Failed => {
            return no_data("Storm surge data could not be retrieved for this municipality.")
        }
        StormSurgeLookup::Scenarios(_) => {}
    }

    match elevation {
        Some(m) if m < 3.0 => HazardResult::scored(
            STORM_SURGE_ID,
            STORM_SURGE_NAME,
            50,
            format!("Low-lying coastal location ({:.1} m a.s.l.)", m),
            format!(
                "The address is only {:.1} m above sea level in a coastal municipality exposed to storm surge. It may be affected in extreme storm surge events.",
                m
            ),
        ),
        Some(m) if m < 10.0 => HazardResult::scored(
            STORM_SURGE_ID,
            STORM_SURGE_NAME,
            25,
            format!("Near-coast location ({:.1} m a.s.l.)", m),
            format!(
                "The address is {:.1} m above sea level in a coastal municipality. Moderate storm surge risk.",
                m
            ),
        ),
        Some(m) => HazardResult::scored(
            STORM_SURGE_ID,
            STORM_SURGE_NAME,
            0,
            format!("Above storm surge level ({:.1} m a.s.l.)", m),
            "The address lies high enough that storm surge is unlikely to be a threat.",
        ),
        None => HazardResult::scored(
            STORM_SURGE_ID,
            STORM_SURGE_NAME,
            0,
            "Elevation unknown",
            "Storm surge could not be related to the terrain because the elevation is unknown.",
        ),
    }
}
