use crate::domain::registry::{CacheTtls, Endpoints};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Plain HTTP GET. Implementations own timeouts, headers and size limits.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoints(&self) -> Endpoints;
    fn cache_ttls(&self) -> CacheTtls;
    fn user_agent(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn max_response_bytes(&self) -> usize;
    fn assessment_timeout(&self) -> Option<Duration>;
    fn include_historical(&self) -> bool;
}
