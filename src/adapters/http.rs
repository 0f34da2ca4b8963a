use crate::domain::ports::{ConfigProvider, Transport};
use crate::utils::error::{Result, RiskError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!(
    "hazard-risk/",
    env!("CARGO_PKG_VERSION"),
    " (natural hazard lookup)"
);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 2 << 20;

/// reqwest-backed transport: fixed user agent, client-wide timeout and a hard cap on
/// response size. Anything but 200 is an error.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    max_response_bytes: usize,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str, timeout: Duration, max_response_bytes: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            max_response_bytes,
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(
            config.user_agent(),
            config.request_timeout(),
            config.max_response_bytes(),
        )
    }

    fn too_large(&self, url: &str) -> RiskError {
        RiskError::ResponseTooLarge {
            url: url.to_string(),
            limit: self.max_response_bytes,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::debug!("Response status {} from {}", status, url);
        if status != StatusCode::OK {
            return Err(RiskError::StatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(length) = response.content_length() {
            if length > self.max_response_bytes as u64 {
                return Err(self.too_large(url));
            }
        }

        // stream so a missing or lying Content-Length cannot blow the limit
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_response_bytes {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn transport(limit: usize) -> ReqwestTransport {
        ReqwestTransport::new(DEFAULT_USER_AGENT, DEFAULT_REQUEST_TIMEOUT, limit).unwrap()
    }

    #[tokio::test]
    async fn test_get_sends_user_agent_and_returns_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/data")
                .header("user-agent", DEFAULT_USER_AGENT);
            then.status(200).body("hello");
        });

        let body = transport(DEFAULT_MAX_RESPONSE_BYTES)
            .get(&server.url("/data"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(body, b"hello".to_vec());
    }

    #[tokio::test]
    async fn test_non_200_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET).path("/accepted");
            then.status(202).body("{}");
        });

        let t = transport(DEFAULT_MAX_RESPONSE_BYTES);

        let missing = t.get(&server.url("/missing")).await.unwrap_err();
        assert!(missing.is_not_found());

        let accepted = t.get(&server.url("/accepted")).await.unwrap_err();
        assert!(matches!(accepted, RiskError::StatusError { status: 202, .. }));
    }

    #[tokio::test]
    async fn test_oversized_response_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/big");
            then.status(200).body("x".repeat(2048));
        });

        let err = transport(1024).get(&server.url("/big")).await.unwrap_err();
        assert!(matches!(err, RiskError::ResponseTooLarge { limit: 1024, .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        // nothing listens on port 9 locally
        let err = transport(DEFAULT_MAX_RESPONSE_BYTES)
            .get("http://127.0.0.1:9/")
            .await
            .unwrap_err();
        assert!(matches!(err, RiskError::HttpError(_)));
    }
}
