#![allow(dead_code)]

use async_trait::async_trait;
use chat_proxy_rs::constants::{defaults, method};
use chat_proxy_rs::{
    AllowedOriginSet, ApiKey, InboundRequest, OriginMatcher, ProxyGateway, ProxyOptions,
    ProxyResponse, Upstream, UpstreamError, UpstreamReply, UpstreamRequest,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

pub const LOCAL_ORIGIN: &str = "http://localhost:5173";
pub const BACKEND_URL: &str = "https://backend.test/chat";
pub const API_KEY: &str = "sk-test-secret";

/// In-memory upstream that records every forwarded request.
pub struct RecordingUpstream {
    outcome: Result<UpstreamReply, UpstreamError>,
    seen: Mutex<Vec<UpstreamRequest>>,
}

impl RecordingUpstream {
    pub fn replying(status: u16, content_type: Option<&str>, body: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(UpstreamReply {
                status,
                content_type: content_type.map(str::to_string),
                body: body.as_bytes().to_vec(),
            }),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn answering(answer: &str) -> Arc<Self> {
        let body = serde_json::json!({ "response": answer }).to_string();
        Self::replying(200, Some("application/json"), &body)
    }

    pub fn failing(error: UpstreamError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(error),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<UpstreamRequest> {
        self.seen.lock().expect("recording upstream lock").clone()
    }
}

#[async_trait]
impl Upstream for RecordingUpstream {
    async fn forward(
        &self,
        request: UpstreamRequest,
        cancel: CancellationToken,
    ) -> Result<UpstreamReply, UpstreamError> {
        self.seen
            .lock()
            .expect("recording upstream lock")
            .push(request);
        if cancel.is_cancelled() {
            return Err(UpstreamError::Cancelled);
        }
        self.outcome.clone()
    }
}

pub struct GatewayBuilder {
    origins: Vec<String>,
    site_host: Option<String>,
    patterns: Vec<String>,
    upstream_url: Option<String>,
    api_key: Option<String>,
    api_key_header: Option<String>,
    upstream_timeout: Option<Duration>,
    max_body_bytes: Option<usize>,
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self {
            origins: defaults::LOCAL_ORIGINS.iter().map(|o| o.to_string()).collect(),
            site_host: None,
            patterns: Vec::new(),
            upstream_url: Some(BACKEND_URL.to_string()),
            api_key: Some(API_KEY.to_string()),
            api_key_header: None,
            upstream_timeout: None,
            max_body_bytes: None,
        }
    }
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.origins = origins.into_iter().map(Into::into).collect();
        self
    }

    pub fn site_host(mut self, host: &str) -> Self {
        self.site_host = Some(host.to_string());
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(pattern.to_string());
        self
    }

    pub fn upstream_url(mut self, url: &str) -> Self {
        self.upstream_url = Some(url.to_string());
        self
    }

    pub fn without_upstream_url(mut self) -> Self {
        self.upstream_url = None;
        self
    }

    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    pub fn api_key_header(mut self, name: &str) -> Self {
        self.api_key_header = Some(name.to_string());
        self
    }

    pub fn upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = Some(timeout);
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }

    pub fn options(&self) -> ProxyOptions {
        let mut origins = AllowedOriginSet::list(self.origins.clone());
        if let Some(host) = &self.site_host {
            origins = origins.with_site_host(host);
        }
        for pattern in &self.patterns {
            origins = origins.with(OriginMatcher::pattern_str(pattern).expect("valid pattern"));
        }

        let mut options = ProxyOptions {
            upstream_url: self
                .upstream_url
                .as_deref()
                .map(|url| Url::parse(url).expect("valid upstream url")),
            api_key: self.api_key.clone().map(ApiKey::new),
            origins,
            ..ProxyOptions::default()
        };
        if let Some(name) = &self.api_key_header {
            options.api_key_header = name.clone();
        }
        if let Some(timeout) = self.upstream_timeout {
            options.upstream_timeout = timeout;
        }
        if let Some(limit) = self.max_body_bytes {
            options.max_body_bytes = limit;
        }
        options
    }

    pub fn build(self, upstream: Arc<dyn Upstream>) -> ProxyGateway {
        ProxyGateway::new(self.options(), upstream).expect("valid options")
    }
}

pub fn gateway() -> GatewayBuilder {
    GatewayBuilder::new()
}

#[derive(Default)]
pub struct RequestBuilder {
    request: InboundRequest,
}

impl RequestBuilder {
    pub fn method(method: &str) -> Self {
        Self {
            request: InboundRequest::new(method),
        }
    }

    pub fn origin(self, origin: &str) -> Self {
        self.header("Origin", origin)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.request = self.request.with_header(name, value);
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.request = self.request.with_body(body);
        self
    }

    pub fn query(self, query: &str) -> Self {
        let body = serde_json::json!({ "query": query }).to_string();
        self.header("Content-Type", "application/json").body(&body)
    }

    pub fn too_large(mut self) -> Self {
        self.request = self.request.with_body_too_large();
        self
    }

    pub fn build(self) -> InboundRequest {
        self.request
    }

    pub async fn send(self, gateway: &ProxyGateway) -> ProxyResponse {
        gateway.handle(&self.request).await
    }
}

pub fn preflight_request() -> RequestBuilder {
    RequestBuilder::method(method::OPTIONS)
}

pub fn chat_request() -> RequestBuilder {
    RequestBuilder::method(method::POST)
}
