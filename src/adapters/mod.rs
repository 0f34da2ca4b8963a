// Adapters layer: one module per upstream service, all going through the cached fetcher.

pub mod elevation;
pub mod http;
pub mod landslide_events;
pub mod met_alerts;
pub mod nve;
pub mod storm_surge;

use crate::core::fetcher::CachedFetcher;
use crate::domain::registry::{CacheTtls, Endpoints};
use std::sync::Arc;

/// Everything needed to talk to the upstreams. Cheap to clone into tasks.
#[derive(Clone)]
pub struct UpstreamClient {
    fetcher: CachedFetcher,
    endpoints: Arc<Endpoints>,
    ttls: CacheTtls,
}

impl UpstreamClient {
    pub fn new(fetcher: CachedFetcher, endpoints: Endpoints, ttls: CacheTtls) -> Self {
        Self {
            fetcher,
            endpoints: Arc::new(endpoints),
            ttls,
        }
    }

    pub fn fetcher(&self) -> &CachedFetcher {
        &self.fetcher
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}
