use super::UpstreamClient;
use crate::core::fetcher::RequestContext;
use crate::domain::model::WeatherAlert;
use crate::utils::error::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AlertCollection {
    #[serde(default)]
    features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    #[serde(default)]
    properties: AlertProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AlertProperties {
    event: String,
    severity: String,
    description: String,
    instruction: String,
    area: String,
}

impl From<AlertProperties> for WeatherAlert {
    fn from(p: AlertProperties) -> Self {
        WeatherAlert {
            event: p.event,
            severity: p.severity,
            description: p.description,
            instruction: p.instruction,
            area: p.area,
        }
    }
}

pub fn alerts_url(base_url: &str, lat: f64, lon: f64) -> String {
    format!("{}?lat={:.6}&lon={:.6}", base_url, lat, lon)
}

impl UpstreamClient {
    /// Active weather warnings covering the point.
    pub async fn weather_alerts(&self, lat: f64, lon: f64, ctx: RequestContext) -> Result<Vec<WeatherAlert>> {
        let url = alerts_url(&self.endpoints.weather_alerts_url, lat, lon);
        let collection: AlertCollection = self
            .fetcher
            .get_json(&url, self.ttls.weather_alerts, ctx)
            .await?;
        Ok(collection
            .features
            .into_iter()
            .map(|f| f.properties.into())
            .collect())
    }
}
