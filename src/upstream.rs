//! Outbound leg of the gateway.
//!
//! The [`Upstream`] trait is the seam between request validation and the
//! network: the gateway only ever hands it a fully validated request, and
//! tests substitute an in-memory implementation.

use crate::constants::content_type;
use crate::credential::ApiKey;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// A validated, credential-bearing request ready to be sent upstream.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub url: Url,
    pub key_header: String,
    pub api_key: ApiKey,
    /// The caller's JSON payload, byte for byte.
    pub body: String,
}

/// What came back from the upstream service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
    #[error("upstream request cancelled")]
    Cancelled,
}

#[async_trait]
pub trait Upstream: Send + Sync {
    /// Sends one request. Implementations must return once `cancel` fires.
    async fn forward(
        &self,
        request: UpstreamRequest,
        cancel: CancellationToken,
    ) -> Result<UpstreamReply, UpstreamError>;
}

/// reqwest-backed [`Upstream`] with a fixed per-call deadline.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    deadline: Duration,
}

impl HttpUpstream {
    /// Redirects are not followed so the API key header is never replayed to
    /// another host.
    pub fn new(deadline: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self::with_client(client, deadline))
    }

    pub fn with_client(client: reqwest::Client, deadline: Duration) -> Self {
        Self { client, deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    async fn exchange(&self, request: UpstreamRequest) -> Result<UpstreamReply, UpstreamError> {
        let key_name = HeaderName::from_bytes(request.key_header.as_bytes())
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;
        let mut key_value = HeaderValue::from_str(request.api_key.expose()).map_err(|_| {
            UpstreamError::Transport("API key is not a valid header value".to_string())
        })?;
        key_value.set_sensitive(true);

        let response = self
            .client
            .post(request.url)
            .header(CONTENT_TYPE, content_type::JSON)
            .header(key_name, key_value)
            .body(request.body)
            .send()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let reply_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;

        debug!(status, bytes = body.len(), "upstream replied");

        Ok(UpstreamReply {
            status,
            content_type: reply_type,
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn forward(
        &self,
        request: UpstreamRequest,
        cancel: CancellationToken,
    ) -> Result<UpstreamReply, UpstreamError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(UpstreamError::Cancelled),
            outcome = tokio::time::timeout(self.deadline, self.exchange(request)) => {
                outcome.unwrap_or(Err(UpstreamError::Timeout(self.deadline)))
            }
        }
    }
}

#[cfg(test)]
#[path = "upstream_test.rs"]
mod upstream_test;
