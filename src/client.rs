//! Caller side of the gateway contract, as the chat widget uses it.

use crate::constants::defaults;
use async_trait::async_trait;
use reqwest::header::ORIGIN;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Failures surfaced to the user. `Display` is the text shown after `Error: `.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("request cancelled")]
    Cancelled,
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("{0}")]
    Backend(String),
    #[error("Unexpected backend response")]
    UnexpectedResponse,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
}

/// Anything that can answer a chat query.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn ask(&self, query: &str, cancel: &CancellationToken) -> Result<String, ClientError>;
}

/// HTTP client for the gateway endpoint, with a fixed per-call timeout.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: Url,
    origin: Option<String>,
    timeout: Duration,
}

impl ChatClient {
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            endpoint,
            origin: None,
            timeout: defaults::CLIENT_TIMEOUT,
        })
    }

    /// Sends an `Origin` header, as a browser on that site would.
    pub fn with_origin<S: Into<String>>(mut self, origin: S) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn exchange(&self, query: &str) -> Result<String, ClientError> {
        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .json(&ChatRequest { query });

        if let Some(origin) = &self.origin {
            builder = builder.header(ORIGIN, origin.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;

        interpret_response(status, &text)
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn ask(&self, query: &str, cancel: &CancellationToken) -> Result<String, ClientError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            outcome = tokio::time::timeout(self.timeout, self.exchange(query)) => {
                outcome.unwrap_or(Err(ClientError::Timeout(self.timeout)))
            }
        }
    }
}

/// Turns a gateway response into an answer or a user-facing error.
///
/// Errors prefer the body's `error` field, then `message`, then the raw text,
/// then `HTTP <status>`. Success requires a string `response` field.
pub fn interpret_response(status: u16, text: &str) -> Result<String, ClientError> {
    let data: Option<Value> = serde_json::from_str(text).ok();
    let field = |name: &str| {
        data.as_ref()
            .and_then(|value| value.get(name))
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    if !(200..300).contains(&status) {
        let message = field("error")
            .or_else(|| field("message"))
            .or_else(|| (!text.is_empty()).then(|| text.to_string()))
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(ClientError::Http { status, message });
    }

    if let Some(answer) = data
        .as_ref()
        .and_then(|value| value.get("response"))
        .and_then(Value::as_str)
    {
        return Ok(answer.to_string());
    }

    match field("error") {
        Some(message) => Err(ClientError::Backend(message)),
        None => Err(ClientError::UnexpectedResponse),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;
