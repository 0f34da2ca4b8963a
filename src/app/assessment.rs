//! Per-address hazard assessment.
//!
//! Elevation is fetched first because the storm-surge check needs it. Every other
//! source then runs as its own task; the tasks are joined in completion order and a
//! failing source only degrades its own entry.

use crate::adapters::http::ReqwestTransport;
use crate::adapters::UpstreamClient;
use crate::core::cache::TtlCache;
use crate::core::composer::compose;
use crate::core::fetcher::{CachedFetcher, RequestContext};
use crate::core::historical::{historical_hazard, HISTORICAL_ID, HISTORICAL_NAME};
use crate::core::scoring::{
    score_flood_zones, score_presence, score_quick_clay, score_storm_surge, LayerOutcome, FLOOD_PERIODS,
    PRESENCE_HAZARDS,
};
use crate::domain::model::{Address, HazardResult, HistoricalEvent, RiskAssessment, WeatherAlert};
use crate::domain::ports::{ConfigProvider, Transport};
use crate::domain::registry::SourceId;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Raw per-source results before the overall score is composed.
#[derive(Debug, Clone, Default)]
pub struct HazardFindings {
    /// Completion order; position carries no meaning.
    pub hazards: Vec<HazardResult>,
    pub elevation: Option<f64>,
    pub weather_alerts: Vec<WeatherAlert>,
    pub historical_events: Option<Vec<HistoricalEvent>>,
}

enum TaskOutput {
    Hazard(HazardResult),
    Historical(HazardResult, Option<Vec<HistoricalEvent>>),
    Alerts(Vec<WeatherAlert>),
}

pub struct AssessmentEngine {
    upstream: UpstreamClient,
    include_historical: bool,
    assessment_timeout: Option<Duration>,
}

impl AssessmentEngine {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self {
            upstream,
            include_historical: true,
            assessment_timeout: None,
        }
    }

    /// Production wiring: reqwest transport and a fresh cache. Needs a tokio runtime.
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::from_config(config)?);
        Ok(Self::with_transport(config, Arc::new(TtlCache::new()), transport))
    }

    pub fn with_transport<C: ConfigProvider + ?Sized>(
        config: &C,
        cache: Arc<TtlCache>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let fetcher = CachedFetcher::new(cache, transport);
        let upstream = UpstreamClient::new(fetcher, config.endpoints(), config.cache_ttls());
        Self::new(upstream)
            .with_historical(config.include_historical())
            .with_assessment_timeout(config.assessment_timeout())
    }

    pub fn with_historical(mut self, include: bool) -> Self {
        self.include_historical = include;
        self
    }

    pub fn with_assessment_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.assessment_timeout = timeout;
        self
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// Stop background work owned by the engine (cache compaction).
    pub fn close(&self) {
        self.upstream.fetcher().cache().close();
    }

    /// Always returns a complete, best-effort assessment.
    pub async fn assess(&self, address: Address) -> RiskAssessment {
        let ctx = match self.assessment_timeout {
            Some(timeout) => RequestContext::with_timeout(timeout),
            None => RequestContext::unbounded(),
        };
        self.assess_with_context(address, ctx).await
    }

    pub async fn assess_with_context(&self, address: Address, ctx: RequestContext) -> RiskAssessment {
        let started = Instant::now();
        tracing::info!(
            "Assessing {:.5},{:.5} (municipality {})",
            address.latitude,
            address.longitude,
            address.kommunenummer
        );

        let findings = self.gather(&address, ctx).await;
        let overall = compose(&findings.hazards, findings.elevation, &address.kommunenummer);

        let unavailable = findings.hazards.iter().filter(|h| h.is_unavailable()).count();
        tracing::info!(
            "Assessment done in {:?}: score {} ({}), {} hazards, {} unavailable",
            started.elapsed(),
            overall.score,
            overall.level,
            findings.hazards.len(),
            unavailable
        );

        RiskAssessment {
            address,
            overall_score: overall.score,
            overall_level: overall.level,
            summary: overall.summary,
            elevation: findings.elevation,
            hazards: findings.hazards,
            weather_alerts: findings.weather_alerts,
            historical_events: findings.historical_events,
        }
    }

    /// Elevation first, then fan out one task per source and join them all.
    pub async fn gather(&self, address: &Address, ctx: RequestContext) -> HazardFindings {
        let (lat, lon) = (address.latitude, address.longitude);

        let elevation = match self.upstream.elevation(lat, lon, ctx).await {
            Ok(elevation) => elevation,
            Err(e) => {
                tracing::warn!("Elevation unavailable, continuing without it: {}", e);
                None
            }
        };

        // dropping the set aborts whatever is still running
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();

        let upstream = self.upstream.clone();
        tasks.spawn(async move { TaskOutput::Hazard(flood_zones(&upstream, lat, lon, ctx).await) });

        for hazard in PRESENCE_HAZARDS {
            let upstream = self.upstream.clone();
            tasks.spawn(async move {
                let outcome = upstream.layer_outcome(hazard.source, lat, lon, ctx).await;
                TaskOutput::Hazard(score_presence(&hazard, &outcome))
            });
        }

        let upstream = self.upstream.clone();
        tasks.spawn(async move { TaskOutput::Hazard(quick_clay(&upstream, lat, lon, ctx).await) });

        let upstream = self.upstream.clone();
        let kommunenummer = address.kommunenummer.clone();
        tasks.spawn(async move {
            let lookup = upstream.storm_surge_lookup(&kommunenummer, ctx).await;
            TaskOutput::Hazard(score_storm_surge(lookup, elevation))
        });

        let upstream = self.upstream.clone();
        tasks.spawn(async move {
            match upstream.weather_alerts(lat, lon, ctx).await {
                Ok(alerts) => TaskOutput::Alerts(alerts),
                Err(e) => {
                    tracing::warn!("Weather alerts unavailable: {}", e);
                    TaskOutput::Alerts(Vec::new())
                }
            }
        });

        if self.include_historical {
            let upstream = self.upstream.clone();
            tasks.spawn(async move {
                match upstream.historical_events(lat, lon, ctx).await {
                    Ok(events) => {
                        let today = chrono::Utc::now().date_naive();
                        TaskOutput::Historical(historical_hazard(&events, today), Some(events))
                    }
                    Err(e) => {
                        tracing::warn!("Historical events unavailable: {}", e);
                        TaskOutput::Historical(HazardResult::unavailable(HISTORICAL_ID, HISTORICAL_NAME), None)
                    }
                }
            });
        }

        let mut findings = HazardFindings {
            hazards: Vec::with_capacity(tasks.len()),
            elevation,
            ..HazardFindings::default()
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(TaskOutput::Hazard(hazard)) => findings.hazards.push(hazard),
                Ok(TaskOutput::Historical(hazard, events)) => {
                    findings.hazards.push(hazard);
                    findings.historical_events = events;
                }
                Ok(TaskOutput::Alerts(alerts)) => findings.weather_alerts = alerts,
                Err(e) => tracing::error!("Hazard task did not complete: {}", e),
            }
        }

        findings
    }
}

/// All five return periods, queried concurrently and reduced to the worst match.
async fn flood_zones(upstream: &UpstreamClient, lat: f64, lon: f64, ctx: RequestContext) -> HazardResult {
    let mut queries = JoinSet::new();
    for period in FLOOD_PERIODS {
        let upstream = upstream.clone();
        queries.spawn(async move { (period, upstream.layer_outcome(period.source, lat, lon, ctx).await) });
    }

    let mut outcomes = Vec::with_capacity(FLOOD_PERIODS.len());
    while let Some(joined) = queries.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => tracing::error!("Flood period query did not complete: {}", e),
        }
    }
    score_flood_zones(&outcomes)
}

async fn quick_clay(upstream: &UpstreamClient, lat: f64, lon: f64, ctx: RequestContext) -> HazardResult {
    let detailed = upstream
        .layer_outcome(SourceId::QuickClayDetailed, lat, lon, ctx)
        .await;
    if let LayerOutcome::Hit(_) = detailed {
        return score_quick_clay(&detailed, None);
    }

    let overview = upstream
        .layer_outcome(SourceId::QuickClayOverview, lat, lon, ctx)
        .await;
    score_quick_clay(&detailed, Some(&overview))
}
