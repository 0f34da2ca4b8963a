//! Static description of the upstream services.
//!
//! The twelve hazard-map layers are point-intersect ArcGIS MapServer queries that
//! share one host; only the service path and layer differ.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_NVE_BASE_URL: &str = "https://nve.geodataonline.no/arcgis/rest/services";
pub const DEFAULT_HISTORICAL_EVENTS_URL: &str =
    "https://gis3.nve.no/map/rest/services/Mapservices/SkredHendelser/MapServer/0/query";
pub const DEFAULT_ELEVATION_URL: &str = "https://ws.geonorge.no/hoydedata/v1/punkt";
pub const DEFAULT_STORM_SURGE_URL: &str = "https://stormflo-konsekvens.kartverket.no/public/api/v1";
pub const DEFAULT_WEATHER_ALERTS_URL: &str = "https://api.met.no/weatherapi/metalerts/2.0/current.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    Flood10,
    Flood20,
    Flood50,
    Flood100,
    Flood200,
    FloodAwareness,
    Landslide,
    QuickClayDetailed,
    QuickClayOverview,
    Avalanche,
    RockFall,
    CombinedHazard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HazardSourceDescriptor {
    pub id: SourceId,
    pub name: &'static str,
    pub service: &'static str,
    pub layer: u32,
}

pub const HAZARD_SOURCES: [HazardSourceDescriptor; 12] = [
    HazardSourceDescriptor { id: SourceId::Flood10, name: "flood_10yr", service: "Flomsoner1", layer: 11 },
    HazardSourceDescriptor { id: SourceId::Flood20, name: "flood_20yr", service: "Flomsoner1", layer: 12 },
    HazardSourceDescriptor { id: SourceId::Flood50, name: "flood_50yr", service: "Flomsoner1", layer: 13 },
    HazardSourceDescriptor { id: SourceId::Flood100, name: "flood_100yr", service: "Flomsoner1", layer: 14 },
    HazardSourceDescriptor { id: SourceId::Flood200, name: "flood_200yr", service: "Flomsoner1", layer: 15 },
    HazardSourceDescriptor { id: SourceId::FloodAwareness, name: "flood_awareness", service: "FlomAktsomhet", layer: 1 },
    HazardSourceDescriptor { id: SourceId::Landslide, name: "landslide", service: "SkredSnoSteinAkt", layer: 0 },
    HazardSourceDescriptor { id: SourceId::QuickClayDetailed, name: "quick_clay_detailed", service: "SkredKvikkleire2", layer: 0 },
    HazardSourceDescriptor { id: SourceId::QuickClayOverview, name: "quick_clay_overview", service: "KvikkleireskredAktsomhet", layer: 0 },
    HazardSourceDescriptor { id: SourceId::Avalanche, name: "avalanche", service: "SnoskredAktsomhet", layer: 1 },
    HazardSourceDescriptor { id: SourceId::RockFall, name: "rock_fall", service: "SkredSteinAktR", layer: 2 },
    HazardSourceDescriptor { id: SourceId::CombinedHazard, name: "combined_hazard", service: "Skredfaresoner2", layer: 2 },
];

impl SourceId {
    pub fn descriptor(self) -> &'static HazardSourceDescriptor {
        // table order follows the enum declaration
        &HAZARD_SOURCES[self as usize]
    }
}

impl HazardSourceDescriptor {
    /// Layer endpoint below the given MapServer root, without query string.
    pub fn layer_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/MapServer/{}/query",
            base_url.trim_end_matches('/'),
            self.service,
            self.layer
        )
    }
}

/// Base URLs for every upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub nve_base_url: String,
    pub historical_events_url: String,
    pub elevation_url: String,
    pub storm_surge_url: String,
    pub weather_alerts_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            nve_base_url: DEFAULT_NVE_BASE_URL.to_string(),
            historical_events_url: DEFAULT_HISTORICAL_EVENTS_URL.to_string(),
            elevation_url: DEFAULT_ELEVATION_URL.to_string(),
            storm_surge_url: DEFAULT_STORM_SURGE_URL.to_string(),
            weather_alerts_url: DEFAULT_WEATHER_ALERTS_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every upstream at one host, keeping the default paths. Handy for mock servers.
    pub fn all_at(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            nve_base_url: format!("{}/arcgis/rest/services", base),
            historical_events_url: format!("{}/SkredHendelser/MapServer/0/query", base),
            elevation_url: format!("{}/hoydedata/v1/punkt", base),
            storm_surge_url: format!("{}/stormflo/api/v1", base),
            weather_alerts_url: format!("{}/metalerts/2.0/current.json", base),
        }
    }
}

/// How long each class of upstream data stays cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub elevation: Duration,
    pub storm_surge: Duration,
    pub hazard_maps: Duration,
    pub weather_alerts: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            elevation: Duration::from_secs(24 * 60 * 60),
            storm_surge: Duration::from_secs(24 * 60 * 60),
            hazard_maps: Duration::from_secs(60 * 60),
            weather_alerts: Duration::from_secs(5 * 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_has_one_entry_per_source() {
        let ids: HashSet<SourceId> = HAZARD_SOURCES.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), HAZARD_SOURCES.len());
        for d in &HAZARD_SOURCES {
            assert_eq!(d.id.descriptor(), d);
        }
        assert_eq!(SourceId::Avalanche.descriptor().service, "SnoskredAktsomhet");
    }

    #[test]
    fn test_layer_url() {
        let url = SourceId::Flood100
            .descriptor()
            .layer_url("https://nve.geodataonline.no/arcgis/rest/services/");
        assert_eq!(
            url,
            "https://nve.geodataonline.no/arcgis/rest/services/Flomsoner1/MapServer/14/query"
        );
    }
}
