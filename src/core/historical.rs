//! Historical landslide events near a point: dedup, radius filter and a
//! distance/recency/severity weighted score with diminishing returns.

use crate::core::attributes::{count_attr, flag_attr, id_attr, string_attr, Attributes};
use crate::core::geo::haversine_meters;
use crate::domain::model::{HazardResult, HistoricalEvent};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::collections::HashSet;

pub const HISTORICAL_ID: &str = "historical_landslides";
pub const HISTORICAL_NAME: &str = "Historical landslide events";
pub const SEARCH_RADIUS_KM: f64 = 1.0;
pub const MAX_RESULTS: usize = 50;

const CLOSE_DISTANCE_M: u32 = 200;
const NEAR_DISTANCE_M: u32 = 500;
const AGGREGATE_CAP: i64 = 85;
const CLOSE_FATALITY_FLOOR: i64 = 75;
const UNKNOWN_TYPE: &str = "Landslide (unknown type)";

const ID_KEYS: [&str; 1] = ["skredID"];
const TYPE_KEYS: [&str; 3] = ["skredtype", "typeNavn", "skredtypeNavn"];
const LOCATION_KEYS: [&str; 2] = ["sted", "stedsnavn"];
const DESCRIPTION_KEYS: [&str; 2] = ["beskrivelse", "hendelseBeskrivelse"];
const FATALITY_KEYS: [&str; 3] = ["totAntPersOmkommet", "dodsfall", "antallOmkommet"];
const DATE_KEYS: [&str; 3] = ["skredTidspunkt", "dato", "skredDato"];

#[derive(Debug, Clone, Deserialize)]
pub struct EventFeatureCollection {
    #[serde(default)]
    pub features: Vec<EventFeature>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventFeature {
    #[serde(default)]
    pub attributes: Attributes,
    pub geometry: Option<PointGeometry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointGeometry {
    pub x: f64,
    pub y: f64,
}

/// Event date from epoch milliseconds, `YYYY-MM-DD` or RFC 3339. Anything else is dropped.
pub fn parse_event_date(attrs: &Attributes) -> Option<NaiveDate> {
    for key in DATE_KEYS {
        match attrs.get(key) {
            Some(serde_json::Value::Number(n)) => {
                if let Some(ms) = n.as_f64().filter(|ms| *ms > 0.0) {
                    return DateTime::from_timestamp_millis(ms as i64).map(|t| t.date_naive());
                }
            }
            Some(serde_json::Value::String(s)) if !s.is_empty() => {
                return NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|t| t.date_naive()));
            }
            _ => {}
        }
    }
    None
}

/// Turn raw features into distinct events within `radius_m`, nearest first.
///
/// The bounding-box query returns the same event once per overlapping geometry
/// fragment; records are collapsed on `skredID`, or on the coordinate rounded to
/// five decimals when no identifier is present.
pub fn collect_events(features: &[EventFeature], lat: f64, lon: f64, radius_m: f64) -> Vec<HistoricalEvent> {
    let mut seen_ids = HashSet::new();
    let mut seen_coords = HashSet::new();
    let mut events = Vec::new();

    for feature in features {
        let Some(point) = feature.geometry else {
            continue;
        };

        let fresh = match id_attr(&feature.attributes, &ID_KEYS) {
            Some(id) => seen_ids.insert(id),
            None => seen_coords.insert(format!("{:.5},{:.5}", point.x, point.y)),
        };
        if !fresh {
            continue;
        }

        let distance = haversine_meters(lat, lon, point.y, point.x);
        if distance > radius_m {
            continue;
        }

        let attrs = &feature.attributes;
        events.push(HistoricalEvent {
            event_type: string_attr(attrs, &TYPE_KEYS).unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            date: parse_event_date(attrs),
            location: string_attr(attrs, &LOCATION_KEYS).unwrap_or_default(),
            building_damage: flag_attr(attrs, &["bygnSkadet"]),
            road_damage: flag_attr(attrs, &["vegSkadet"]),
            fatalities: count_attr(attrs, &FATALITY_KEYS),
            description: string_attr(attrs, &DESCRIPTION_KEYS).unwrap_or_default(),
            latitude: point.y,
            longitude: point.x,
            distance_meters: distance as u32,
        });
    }

    events.sort_by_key(|e| e.distance_meters);
    events
}

/// Score of one event, and whether it is a fatal event close enough to set the floor.
pub fn score_event(event: &HistoricalEvent, today: NaiveDate) -> (i64, bool) {
    let mut score = 10;
    let mut close_fatality = false;

    if event.building_damage {
        score += 25;
    }
    if event.road_damage {
        score += 10;
    }
    if event.fatalities > 0 {
        score += 30;
        close_fatality = event.distance_meters < CLOSE_DISTANCE_M;
    }

    if let Some(date) = event.date {
        let years = (today - date).num_days() as f64 / 365.25;
        if years < 20.0 {
            score += 10;
        } else if years < 50.0 {
            score += 5;
        }
    }

    if event.distance_meters < CLOSE_DISTANCE_M {
        score += 15;
    } else if event.distance_meters < NEAR_DISTANCE_M {
        score += 5;
    }

    (score.min(100), close_fatality)
}

/// Strongest event counts fully, each following one half as much as the previous.
pub fn score_historical_events(events: &[HistoricalEvent], today: NaiveDate) -> u8 {
    let mut close_fatality = false;
    let mut scores: Vec<i64> = events
        .iter()
        .map(|e| {
            let (score, close) = score_event(e, today);
            close_fatality |= close;
            score
        })
        .collect();
    scores.sort_unstable_by(|a, b| b.cmp(a));

    let weighted: f64 = scores
        .iter()
        .enumerate()
        .map(|(i, s)| *s as f64 / 2f64.powi(i as i32))
        .sum();

    let mut total = (weighted as i64).min(AGGREGATE_CAP);
    if close_fatality {
        total = total.max(CLOSE_FATALITY_FLOOR);
    }
    total as u8
}

/// Hazard entry for the event list; `events` must be sorted nearest first.
pub fn historical_hazard(events: &[HistoricalEvent], today: NaiveDate) -> HazardResult {
    if events.is_empty() {
        return HazardResult::scored(
            HISTORICAL_ID,
            HISTORICAL_NAME,
            0,
            "No registered landslide events",
            "No historical landslide events are registered within 1 km.",
        );
    }

    let description = if events.len() == 1 {
        "1 historical landslide event within 1 km".to_string()
    } else {
        format!("{} historical landslide events within 1 km", events.len())
    };

    let mut parts: Vec<String> = events
        .iter()
        .take(3)
        .map(|e| match e.date {
            Some(date) => format!("{} ({}), {} m away", e.event_type, date, e.distance_meters),
            None => format!("{}, {} m away", e.event_type, e.distance_meters),
        })
        .collect();
    if events.len() > 3 {
        parts.push(format!("and {} more.", events.len() - 3));
    }

    HazardResult::scored(
        HISTORICAL_ID,
        HISTORICAL_NAME,
        score_historical_events(events, today).into(),
        description,
        parts.join(". "),
    )
}
