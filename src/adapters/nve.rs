//! Point-intersect queries against the hazard-map MapServer layers.

use super::UpstreamClient;
use crate::core::attributes::Attributes;
use crate::core::fetcher::RequestContext;
use crate::core::scoring::LayerOutcome;
use crate::domain::registry::SourceId;
use crate::utils::error::{Result, RiskError};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ArcgisResponse {
    #[serde(default)]
    pub features: Vec<ArcgisFeature>,
    /// ArcGIS reports some failures as 200 with an error object.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArcgisFeature {
    #[serde(default)]
    pub attributes: Attributes,
}

pub fn point_query_url(base_url: &str, source: SourceId, lat: f64, lon: f64) -> String {
    format!(
        "{}?geometry={:.6},{:.6}&geometryType=esriGeometryPoint&inSR=4326&spatialRel=esriSpatialRelIntersects&outFields=*&returnGeometry=false&f=json",
        source.descriptor().layer_url(base_url),
        lon,
        lat
    )
}

impl UpstreamClient {
    pub async fn query_layer(
        &self,
        source: SourceId,
        lat: f64,
        lon: f64,
        ctx: RequestContext,
    ) -> Result<ArcgisResponse> {
        let url = point_query_url(&self.endpoints.nve_base_url, source, lat, lon);
        self.fetcher
            .get_json_checked(&url, self.ttls.hazard_maps, ctx, |response: &ArcgisResponse| {
                match &response.error {
                    Some(error) => Err(RiskError::UpstreamError {
                        service: source.descriptor().name.to_string(),
                        message: error.to_string(),
                    }),
                    None => Ok(()),
                }
            })
            .await
    }

    /// Classify one layer query. Failures are logged here and reported as [`LayerOutcome::Failed`].
    pub async fn layer_outcome(
        &self,
        source: SourceId,
        lat: f64,
        lon: f64,
        ctx: RequestContext,
    ) -> LayerOutcome {
        match self.query_layer(source, lat, lon, ctx).await {
            Ok(response) => match response.features.into_iter().next() {
                Some(feature) => LayerOutcome::Hit(feature.attributes),
                None => LayerOutcome::Miss,
            },
            Err(e) => {
                tracing::warn!("Hazard layer {} unavailable: {}", source.descriptor().name, e);
                LayerOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_query_url_puts_lon_first() {
        let url = point_query_url("https://host/arcgis/rest/services", SourceId::RockFall, 61.5, 7.25);
        assert!(url.starts_with("https://host/arcgis/rest/services/SkredSteinAktR/MapServer/2/query?"));
        assert!(url.contains("geometry=7.250000,61.500000"));
        assert!(url.contains("spatialRel=esriSpatialRelIntersects"));
    }

    #[test]
    fn test_distinct_points_and_layers_give_distinct_keys() {
        let base = "https://host";
        let a = point_query_url(base, SourceId::Avalanche, 60.0, 10.0);
        let b = point_query_url(base, SourceId::Avalanche, 60.0, 10.000001);
        let c = point_query_url(base, SourceId::Landslide, 60.0, 10.0);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_decode_tolerates_missing_features() {
        let response: ArcgisResponse = serde_json::from_str(r#"{"error": {"code": 400}}"#).unwrap();
        assert!(response.features.is_empty());
        assert!(response.error.is_some());
    }
}
