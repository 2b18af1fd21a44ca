use crate::constants::{body, content_type, header};
use crate::headers::{HeaderCollection, Headers};
use thiserror::Error;

/// A complete gateway response. Every instance carries the request's CORS headers.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl ProxyResponse {
    pub(crate) fn new(status: u16, cors: Headers) -> Self {
        Self {
            status,
            headers: cors,
            body: Vec::new(),
        }
    }

    pub(crate) fn with_content_type(mut self, value: &str) -> Self {
        let mut headers = HeaderCollection::with_estimate(self.headers.len() + 1);
        for (name, existing) in std::mem::take(&mut self.headers) {
            headers.push(name, existing);
        }
        headers.push(header::CONTENT_TYPE.to_string(), value.to_string());
        self.headers = headers.into_headers();
        self
    }

    pub(crate) fn with_body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Every way a request can be turned away. Each maps to a fixed status and a
/// generic body; nothing about the caller's input or the upstream's error
/// detail is reflected back.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("origin not allowed")]
    Forbidden,
    #[error("upstream URL or API key not configured")]
    Misconfigured,
    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,
    #[error("request body is not valid JSON")]
    InvalidJson,
    #[error("request body lacks a non-empty string `query`")]
    InvalidPayload,
    #[error("upstream responded with status {status}")]
    Upstream { status: u16 },
    #[error("upstream unreachable")]
    BadGateway,
}

impl Rejection {
    pub fn status(&self) -> u16 {
        match self {
            Rejection::MethodNotAllowed => 405,
            Rejection::Forbidden => 403,
            Rejection::Misconfigured => 500,
            Rejection::PayloadTooLarge => 413,
            Rejection::InvalidJson | Rejection::InvalidPayload => 400,
            Rejection::Upstream { status } => *status,
            Rejection::BadGateway => 502,
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Rejection::MethodNotAllowed => body::METHOD_NOT_ALLOWED,
            Rejection::Forbidden => body::FORBIDDEN,
            Rejection::Misconfigured => body::SERVER_MISCONFIGURED,
            Rejection::PayloadTooLarge => body::PAYLOAD_TOO_LARGE,
            Rejection::InvalidJson => body::INVALID_JSON,
            Rejection::InvalidPayload => body::INVALID_PAYLOAD,
            Rejection::Upstream { .. } => body::UPSTREAM_ERROR,
            Rejection::BadGateway => body::BAD_GATEWAY,
        }
    }

    /// Server-side faults, as opposed to problems with the caller's request.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Rejection::Misconfigured | Rejection::Upstream { .. } | Rejection::BadGateway
        )
    }

    pub fn into_response(self, cors: Headers) -> ProxyResponse {
        ProxyResponse::new(self.status(), cors)
            .with_content_type(content_type::PLAIN_TEXT)
            .with_body(self.body())
    }
}

#[cfg(test)]
#[path = "result_test.rs"]
mod result_test;
