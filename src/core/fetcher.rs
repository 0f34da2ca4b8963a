use crate::core::cache::TtlCache;
use crate::domain::ports::Transport;
use crate::utils::error::{Result, RiskError};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Per-assessment cancellation scope. Every fetch made on behalf of one
/// assessment carries the same deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn unbounded() -> Self {
        Self { deadline: None }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Cache-first GET over any [`Transport`]. The cache key is the full query URL.
#[derive(Clone)]
pub struct CachedFetcher {
    cache: Arc<TtlCache>,
    transport: Arc<dyn Transport>,
}

impl CachedFetcher {
    pub fn new(cache: Arc<TtlCache>, transport: Arc<dyn Transport>) -> Self {
        Self { cache, transport }
    }

    pub fn cache(&self) -> &Arc<TtlCache> {
        &self.cache
    }

    /// Fetch and decode. A decode failure is reported like a transport failure.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        ttl: Duration,
        ctx: RequestContext,
    ) -> Result<T> {
        self.get_json_checked(url, ttl, ctx, |_| Ok(())).await
    }

    /// Fetch, decode and run `accept` on the payload. The body is cached only when
    /// both decoding and `accept` succeed, so a bad answer is retried next time.
    pub async fn get_json_checked<T, F>(
        &self,
        url: &str,
        ttl: Duration,
        ctx: RequestContext,
        accept: F,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&T) -> Result<()>,
    {
        if let Some(body) = self.cache.get(url) {
            tracing::debug!("Cache hit: {}", url);
            return Ok(serde_json::from_slice(&body)?);
        }

        let body = self.fetch(url, ctx).await?;
        let value: T = serde_json::from_slice(&body)?;
        accept(&value)?;

        self.cache.set(url, body, ttl);
        Ok(value)
    }

    /// Store a body for `url` that did not come from the transport.
    pub fn remember(&self, url: &str, body: Vec<u8>, ttl: Duration) {
        self.cache.set(url, body, ttl);
    }

    async fn fetch(&self, url: &str, ctx: RequestContext) -> Result<Vec<u8>> {
        tracing::debug!("Cache miss, fetching: {}", url);
        match ctx.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, self.transport.get(url))
                .await
                .map_err(|_| RiskError::DeadlineExceeded {
                    url: url.to_string(),
                })?,
            None => self.transport.get(url).await,
        }
    }
}
