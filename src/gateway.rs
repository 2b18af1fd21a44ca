use crate::constants::content_type;
use crate::context::InboundRequest;
use crate::cors::CorsEvaluation;
use crate::normalized_request::NormalizedRequest;
use crate::options::{ProxyOptions, ValidationError};
use crate::result::{ProxyResponse, Rejection};
use crate::upstream::{Upstream, UpstreamRequest};
use serde::Deserialize;
use serde_json::value::RawValue;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Stateless request handler between the browser widget and the upstream service.
///
/// Each call to [`ProxyGateway::handle`] is evaluated independently; the only
/// shared state is the immutable [`ProxyOptions`] and the upstream client.
pub struct ProxyGateway {
    options: ProxyOptions,
    upstream: Arc<dyn Upstream>,
    shutdown: CancellationToken,
}

impl ProxyGateway {
    pub fn new(
        options: ProxyOptions,
        upstream: Arc<dyn Upstream>,
    ) -> Result<Self, ValidationError> {
        options.validate()?;
        Ok(Self {
            options,
            upstream,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn options(&self) -> &ProxyOptions {
        &self.options
    }

    /// Cancels every in-flight upstream call; they resolve to `502 Bad Gateway`.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn handle(&self, request: &InboundRequest) -> ProxyResponse {
        let normalized = NormalizedRequest::new(request);
        let cors = CorsEvaluation::evaluate(&normalized, &self.options.origins);

        debug!(
            method = normalized.method(),
            origin_allowed = cors.is_allowed(),
            "gateway request"
        );

        match self.process(&normalized, &cors).await {
            Ok(response) => response,
            Err(rejection) => {
                if rejection.is_server_fault() {
                    warn!(status = rejection.status(), reason = %rejection, "request failed");
                } else {
                    info!(status = rejection.status(), reason = %rejection, "request rejected");
                }
                rejection.into_response(cors.headers())
            }
        }
    }

    async fn process(
        &self,
        request: &NormalizedRequest<'_>,
        cors: &CorsEvaluation,
    ) -> Result<ProxyResponse, Rejection> {
        if request.is_options() {
            return Ok(ProxyResponse::new(204, cors.headers()));
        }

        if !request.is_post() {
            return Err(Rejection::MethodNotAllowed);
        }

        if !cors.is_allowed() {
            return Err(Rejection::Forbidden);
        }

        let (url, api_key) = self
            .options
            .upstream_target()
            .ok_or(Rejection::Misconfigured)?;

        if request.body_too_large() {
            return Err(Rejection::PayloadTooLarge);
        }

        validate_payload(request.body())?;

        let upstream_request = UpstreamRequest {
            url: url.clone(),
            key_header: self.options.api_key_header.clone(),
            api_key: api_key.clone(),
            body: request.body().to_string(),
        };

        let reply = self
            .upstream
            .forward(upstream_request, self.shutdown.child_token())
            .await
            .map_err(|err| {
                warn!(error = %err, "upstream unreachable");
                Rejection::BadGateway
            })?;

        if !reply.is_success() {
            return Err(Rejection::Upstream {
                status: reply.status,
            });
        }

        let reply_type = reply
            .content_type
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(content_type::JSON);

        Ok(ProxyResponse::new(reply.status, cors.headers())
            .with_content_type(reply_type)
            .with_body(reply.body))
    }
}

#[derive(Deserialize)]
struct ChatPayload<'a> {
    #[serde(borrow)]
    query: Option<&'a RawValue>,
}

/// Checks that `body` is a JSON object carrying a non-empty string `query`.
///
/// Validation goes through [`RawValue`] so no value tree is built: nesting
/// depth is unbounded and `\u` escapes are checked for shape only, so a lone
/// surrogate is accepted and forwarded as sent.
pub fn validate_payload(body: &str) -> Result<(), Rejection> {
    let document: &RawValue = serde_json::from_str(body).map_err(|_| Rejection::InvalidJson)?;
    if !document.get().starts_with('{') {
        return Err(Rejection::InvalidPayload);
    }

    let payload: ChatPayload<'_> =
        serde_json::from_str(document.get()).map_err(|_| Rejection::InvalidPayload)?;

    match payload.query.map(RawValue::get) {
        Some(query) if query.starts_with('"') && query != "\"\"" => Ok(()),
        _ => Err(Rejection::InvalidPayload),
    }
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;
