use super::UpstreamClient;
use crate::core::fetcher::RequestContext;
use crate::core::geo::BoundingBox;
use crate::core::historical::{collect_events, EventFeatureCollection, MAX_RESULTS, SEARCH_RADIUS_KM};
use crate::domain::model::HistoricalEvent;
use crate::utils::error::{Result, RiskError};
use url::Url;

pub fn events_query_url(base_url: &str, lat: f64, lon: f64) -> Result<String> {
    let envelope = BoundingBox::around(lat, lon, SEARCH_RADIUS_KM).to_envelope();
    let max_results = MAX_RESULTS.to_string();
    let url = Url::parse_with_params(
        base_url,
        &[
            ("geometry", envelope.as_str()),
            ("geometryType", "esriGeometryEnvelope"),
            ("inSR", "4326"),
            ("outSR", "4326"),
            ("spatialRel", "esriSpatialRelIntersects"),
            ("outFields", "*"),
            ("returnGeometry", "true"),
            ("resultRecordCount", max_results.as_str()),
            ("f", "json"),
        ],
    )
    .map_err(|e| RiskError::ConfigError {
        message: format!("invalid historical events URL '{}': {}", base_url, e),
    })?;
    Ok(url.into())
}

impl UpstreamClient {
    /// Distinct recorded events within the search radius, nearest first.
    pub async fn historical_events(&self, lat: f64, lon: f64, ctx: RequestContext) -> Result<Vec<HistoricalEvent>> {
        let url = events_query_url(&self.endpoints.historical_events_url, lat, lon)?;
        let collection: EventFeatureCollection = self
            .fetcher
            .get_json_checked(&url, self.ttls.hazard_maps, ctx, |c: &EventFeatureCollection| {
                match &c.error {
                    Some(error) => Err(RiskError::UpstreamError {
                        service: "historical_events".to_string(),
                        message: error.to_string(),
                    }),
                    None => Ok(()),
                }
            })
            .await?;

        let events = collect_events(&collection.features, lat, lon, SEARCH_RADIUS_KM * 1000.0);
        tracing::debug!(
            "Historical events: {} features, {} within radius",
            collection.features.len(),
            events.len()
        );
        Ok(events)
    }
}
