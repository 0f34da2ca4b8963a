use async_trait::async_trait;
use hazard_risk::domain::ports::Transport;
use hazard_risk::domain::registry::{SourceId, HAZARD_SOURCES};
use hazard_risk::{Address, AssessmentEngine, RiskError, RiskLevel, TomlConfig, TtlCache};
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

const LAT: f64 = 67.28;
const LON: f64 = 14.40;

fn layer_path(source: SourceId) -> String {
    let d = source.descriptor();
    format!("/arcgis/rest/services/{}/MapServer/{}/query", d.service, d.layer)
}

fn empty_features() -> Value {
    json!({"features": []})
}

/// One mock per hazard-map layer; layers not listed in `overrides` answer with no features.
fn mock_layers<'a>(server: &'a MockServer, overrides: &[(SourceId, Value)]) -> Vec<Mock<'a>> {
    HAZARD_SOURCES
        .iter()
        .map(|d| {
            let body = overrides
                .iter()
                .find(|(id, _)| *id == d.id)
                .map(|(_, body)| body.clone())
                .unwrap_or_else(empty_features);
            let path = layer_path(d.id);
            server.mock(|when, then| {
                when.method(GET).path(path).query_param("f", "json");
                then.status(200).json_body(body);
            })
        })
        .collect()
}

fn mock_elevation(server: &MockServer, z: f64) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/hoydedata/v1/punkt").query_param("koordsys", "4326");
        then.status(200).json_body(json!({"punkter": [{"z": z, "datakilde": "dtm1"}]}));
    })
}

fn mock_storm_surge<'a>(server: &'a MockServer, knr: &str, status: u16, body: Value) -> Mock<'a> {
    let path = format!("/stormflo/api/v1/{}.json", knr);
    server.mock(|when, then| {
        when.method(GET).path(path);
        then.status(status).json_body(body);
    })
}

fn mock_alerts(server: &MockServer, body: Value) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/metalerts/2.0/current.json");
        then.status(200).json_body(body);
    })
}

fn mock_historical(server: &MockServer, body: Value) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/SkredHendelser/MapServer/0/query")
            .query_param("geometryType", "esriGeometryEnvelope");
        then.status(200).json_body(body);
    })
}

fn engine_for(server: &MockServer) -> AssessmentEngine {
    AssessmentEngine::from_config(&TomlConfig::for_base_url(&server.base_url())).unwrap()
}

#[tokio::test]
async fn test_full_assessment_against_mock_upstreams() {
    let server = MockServer::start();
    let layers = mock_layers(
        &server,
        &[
            (SourceId::Flood100, json!({"features": [{"attributes": {"objectid": 1}}]})),
            (SourceId::Landslide, json!({"features": [{"attributes": {"objectid": 2}}]})),
        ],
    );
    let elevation = mock_elevation(&server, 2.5);
    let storm_surge = mock_storm_surge(
        &server,
        "1804",
        200,
        json!([{"kommunenummer": "1804", "code": "S20"}, {"kommunenummer": "1804", "code": "S200"}]),
    );
    let alerts = mock_alerts(
        &server,
        json!({"type": "FeatureCollection", "features": [{"properties": {
            "event": "gale", "severity": "Moderate", "description": "Strong wind",
            "instruction": "Secure loose objects", "area": "Salten"}}]}),
    );
    let historical = mock_historical(
        &server,
        json!({"features": [
            {"attributes": {"skredID": "H1", "skredtype": "Jordskred"}, "geometry": {"x": 14.401, "y": 67.28}},
            {"attributes": {"skredID": "H2", "skredtype": "Steinsprang"}, "geometry": {"x": 14.9, "y": 67.5}}
        ]}),
    );

    let engine = engine_for(&server);
    let mut address = Address::new(LAT, LON, "1804");
    address.text = "Storgata 1".to_string();
    let assessment = engine.assess(address).await;
    engine.close();

    for mock in &layers {
        mock.assert();
    }
    elevation.assert();
    storm_surge.assert();
    alerts.assert();
    historical.assert();

    assert_eq!(assessment.hazards.len(), 9);
    assert!(assessment.hazards.iter().all(|h| h.error.is_none()));
    assert_eq!(assessment.elevation, Some(2.5));

    let flood = assessment.hazard("flood_zones").unwrap();
    assert_eq!(flood.score, 40);
    assert!(flood.description.contains("100-year"));

    assert_eq!(assessment.hazard("landslide").unwrap().score, 60);
    assert_eq!(assessment.hazard("quick_clay").unwrap().score, 0);
    assert_eq!(assessment.hazard("storm_surge").unwrap().score, 50);

    let events = assessment.historical_events.as_ref().unwrap();
    assert_eq!(events.len(), 1, "event outside 1 km must be dropped");
    assert_eq!(events[0].event_type, "Jordskred");
    assert_eq!(assessment.hazard("historical_landslides").unwrap().score, 25);

    assert_eq!(assessment.weather_alerts.len(), 1);
    assert_eq!(assessment.weather_alerts[0].area, "Salten");

    // max 60, plus the low-lying coastal boost
    assert_eq!(assessment.overall_score, 70);
    assert_eq!(assessment.overall_level, RiskLevel::High);
    assert!(assessment.summary.contains("70/100"));

    let serialized = serde_json::to_value(&assessment).unwrap();
    assert_eq!(serialized["overall_level"], "high");
    assert_eq!(serialized["address"]["text"], "Storgata 1");
}

#[tokio::test]
async fn test_second_assessment_is_served_from_cache() {
    let server = MockServer::start();
    let layers = mock_layers(&server, &[]);
    let elevation = mock_elevation(&server, 120.0);
    let storm_surge = mock_storm_surge(&server, "3401", 404, json!({}));
    let alerts = mock_alerts(&server, json!({"features": []}));
    let historical = mock_historical(&server, json!({"features": []}));

    let engine = engine_for(&server);
    let first = engine.assess(Address::new(60.79, 11.07, "3401")).await;
    let second = engine.assess(Address::new(60.79, 11.07, "3401")).await;
    engine.close();

    assert_eq!(first.overall_score, second.overall_score);
    assert_eq!(second.overall_level, RiskLevel::Low);
    for mock in &layers {
        assert_eq!(mock.hits(), 1);
    }
    assert_eq!(elevation.hits(), 1);
    assert_eq!(alerts.hits(), 1);
    assert_eq!(historical.hits(), 1);
    // "not covered" is remembered for the storm-surge TTL as well
    assert_eq!(storm_surge.hits(), 1);
    assert_eq!(second.hazard("storm_surge").unwrap().description, "No storm surge data");
}

#[tokio::test]
async fn test_layer_error_payload_is_retried_after_recovery() {
    let server = MockServer::start();
    let mut layers = mock_layers(
        &server,
        &[(
            SourceId::Avalanche,
            json!({"error": {"code": 500, "message": "Service temporarily unavailable."}}),
        )],
    );
    let _elevation = mock_elevation(&server, 40.0);
    let _storm_surge = mock_storm_surge(&server, "5401", 404, json!({}));
    let _alerts = mock_alerts(&server, json!({"features": []}));
    let _historical = mock_historical(&server, json!({"features": []}));

    let engine = engine_for(&server);
    let first = engine.assess(Address::new(69.65, 18.96, "5401")).await;
    assert_eq!(first.hazard("avalanche").unwrap().error.as_deref(), Some("data unavailable"));

    layers[SourceId::Avalanche as usize].delete();
    let avalanche_path = layer_path(SourceId::Avalanche);
    let recovered = server.mock(|when, then| {
        when.method(GET).path(avalanche_path);
        then.status(200)
            .json_body(json!({"features": [{"attributes": {"objectid": 3}}]}));
    });

    let second = engine.assess(Address::new(69.65, 18.96, "5401")).await;
    engine.close();

    assert_eq!(recovered.hits(), 1);
    let avalanche = second.hazard("avalanche").unwrap();
    assert!(avalanche.error.is_none());
    assert_eq!(avalanche.score, 70);
    // healthy layers were cached by the first assessment
    assert_eq!(layers[SourceId::Landslide as usize].hits(), 1);
}

#[tokio::test]
async fn test_storm_surge_not_covered_and_layer_error_payload() {
    let server = MockServer::start();
    let _layers = mock_layers(
        &server,
        &[(
            SourceId::Avalanche,
            json!({"error": {"code": 400, "message": "Invalid or missing input parameters."}}),
        )],
    );
    let _elevation = mock_elevation(&server, 1.0);
    let _storm_surge = mock_storm_surge(&server, "0301", 404, json!({"detail": "not found"}));
    let _alerts = mock_alerts(&server, json!({"features": []}));
    let _historical = mock_historical(&server, json!({"features": []}));

    let engine = engine_for(&server);
    let assessment = engine.assess(Address::new(59.91, 10.75, "0301")).await;
    engine.close();

    let surge = assessment.hazard("storm_surge").unwrap();
    assert_eq!(surge.score, 0);
    assert_eq!(surge.description, "No storm surge data");
    assert!(surge.error.is_none());

    let avalanche = assessment.hazard("avalanche").unwrap();
    assert_eq!(avalanche.level, RiskLevel::Unknown);
    assert_eq!(avalanche.error.as_deref(), Some("data unavailable"));

    assert_eq!(assessment.hazard("historical_landslides").unwrap().score, 0);
    assert_eq!(assessment.historical_events.as_deref().map(|e| e.len()), Some(0));
    assert_eq!(assessment.overall_score, 0);
}

struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn get(&self, url: &str) -> hazard_risk::Result<Vec<u8>> {
        Err(RiskError::StatusError {
            url: url.to_string(),
            status: 503,
        })
    }
}

struct SlowTransport;

#[async_trait]
impl Transport for SlowTransport {
    async fn get(&self, _url: &str) -> hazard_risk::Result<Vec<u8>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(b"{}".to_vec())
    }
}

#[tokio::test]
async fn test_all_sources_failing_still_returns_assessment() {
    let config = TomlConfig::default();
    let engine = AssessmentEngine::with_transport(&config, Arc::new(TtlCache::new()), Arc::new(FailingTransport));

    let assessment = engine.assess(Address::new(59.91, 10.75, "0301")).await;
    engine.close();

    assert_eq!(assessment.hazards.len(), 9);
    let failed: Vec<&str> = assessment
        .hazards
        .iter()
        .filter(|h| h.error.is_some())
        .map(|h| h.id.as_str())
        .collect();
    assert_eq!(failed.len(), 8);
    assert!(!failed.contains(&"storm_surge"));

    let surge = assessment.hazard("storm_surge").unwrap();
    assert_eq!(surge.score, 0);
    assert_eq!(surge.description, "No storm surge data");

    assert!(assessment
        .hazards
        .iter()
        .filter(|h| h.error.is_some())
        .all(|h| h.score == 0 && h.level == RiskLevel::Unknown));
    assert_eq!(assessment.elevation, None);
    assert!(assessment.weather_alerts.is_empty());
    assert!(assessment.historical_events.is_none());
    assert_eq!(assessment.overall_score, 0);
    assert_eq!(assessment.overall_level, RiskLevel::Low);
}

#[tokio::test]
async fn test_deadline_bounds_the_assessment() {
    let config = TomlConfig::default();
    let engine = AssessmentEngine::with_transport(&config, Arc::new(TtlCache::new()), Arc::new(SlowTransport))
        .with_assessment_timeout(Some(Duration::from_millis(200)));

    let started = Instant::now();
    let assessment = engine.assess(Address::new(59.91, 10.75, "0301")).await;
    engine.close();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(assessment.hazards.len(), 9);
    assert_eq!(assessment.hazards.iter().filter(|h| h.error.is_some()).count(), 8);
    assert_eq!(assessment.overall_score, 0);
}

#[tokio::test]
async fn test_historical_lookup_can_be_disabled() {
    let config = TomlConfig::from_toml_str("[assessment]\ninclude_historical = false\n").unwrap();
    let engine = AssessmentEngine::with_transport(&config, Arc::new(TtlCache::new()), Arc::new(FailingTransport));

    let assessment = engine.assess(Address::new(59.91, 10.75, "0301")).await;
    engine.close();

    assert_eq!(assessment.hazards.len(), 8);
    assert!(assessment.hazard("historical_landslides").is_none());
    assert!(assessment.historical_events.is_none());
}

#[tokio::test]
async fn test_concurrent_assessments_share_one_engine() {
    let config = TomlConfig::default();
    let engine = Arc::new(AssessmentEngine::with_transport(
        &config,
        Arc::new(TtlCache::new()),
        Arc::new(FailingTransport),
    ));

    let mut handles = Vec::new();
    for knr in ["0301", "1804", "4601", "5001"] {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move { engine.assess(Address::new(63.0, 10.0, knr)).await }));
    }

    for handle in handles {
        let assessment = handle.await.unwrap();
        assert_eq!(assessment.hazards.len(), 9);
    }
    engine.close();
}
