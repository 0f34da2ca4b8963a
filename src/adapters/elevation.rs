use super::UpstreamClient;
use crate::core::fetcher::RequestContext;
use crate::utils::error::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    #[serde(default, rename = "punkter")]
    points: Vec<ElevationPoint>,
}

#[derive(Debug, Deserialize)]
struct ElevationPoint {
    z: Option<f64>,
}

pub fn elevation_url(base_url: &str, lat: f64, lon: f64) -> String {
    format!("{}?nord={:.6}&ost={:.6}&koordsys=4326", base_url, lat, lon)
}

impl UpstreamClient {
    /// Terrain height in meters; `None` when the service has no value for the point.
    pub async fn elevation(&self, lat: f64, lon: f64, ctx: RequestContext) -> Result<Option<f64>> {
        let url = elevation_url(&self.endpoints.elevation_url, lat, lon);
        let response: ElevationResponse = self
            .fetcher
            .get_json(&url, self.ttls.elevation, ctx)
            .await?;
        Ok(response.points.first().and_then(|p| p.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_first_point() {
        let r: ElevationResponse =
            serde_json::from_str(r#"{"punkter":[{"z":12.5,"datakilde":"dtm1"},{"z":3.0}]}"#).unwrap();
        assert_eq!(r.points.first().and_then(|p| p.z), Some(12.5));
    }

    #[test]
    fn test_decode_missing_height() {
        let r: ElevationResponse = serde_json::from_str(r#"{"punkter":[{"z":null}]}"#).unwrap();
        assert_eq!(r.points.first().and_then(|p| p.z), None);

        let empty: ElevationResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(empty.points.is_empty());
    }
}
