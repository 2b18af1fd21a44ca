//! axum adapter around [`ProxyGateway`].

use crate::context::{InboundRequest, RequestHeaders};
use crate::gateway::ProxyGateway;
use crate::result::ProxyResponse;
use axum::{
    Router,
    body::{Body, Bytes},
    extract::{MatchedPath, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::any,
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ProxyGateway>,
}

/// Mounts the gateway on `path` for every HTTP method.
pub fn router(gateway: Arc<ProxyGateway>, path: &str) -> Router {
    Router::new()
        .route(&route_path(path), any(proxy))
        .layer(middleware::from_fn(log_requests))
        .with_state(AppState { gateway })
}

fn route_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

async fn proxy(State(state): State<AppState>, request: Request) -> Response {
    let limit = state.gateway.options().max_body_bytes;
    let (parts, body) = request.into_parts();

    let inbound = InboundRequest {
        method: parts.method.as_str().to_string(),
        headers: collect_headers(&parts.headers),
        ..InboundRequest::default()
    };

    // Oversized bodies are flagged rather than refused here, so the gateway
    // still answers with its own status ordering and CORS headers.
    let inbound = match read_body(body, limit).await {
        // Non-UTF-8 input cannot be JSON; an empty body fails validation as such.
        BodyRead::Complete(bytes) => {
            inbound.with_body(String::from_utf8(bytes.to_vec()).unwrap_or_default())
        }
        BodyRead::TooLarge => inbound.with_body_too_large(),
        BodyRead::Failed => inbound,
    };

    into_http_response(state.gateway.handle(&inbound).await)
}

enum BodyRead {
    Complete(Bytes),
    TooLarge,
    Failed,
}

/// Reads at most `limit` bytes. Only the length limit counts as too large; any
/// other read error leaves the body empty.
async fn read_body(body: Body, limit: usize) -> BodyRead {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => BodyRead::Complete(collected.to_bytes()),
        Err(err) if err.is::<LengthLimitError>() => {
            debug!(limit, "request body exceeds limit");
            BodyRead::TooLarge
        }
        Err(err) => {
            debug!(error = %err, "request body not read");
            BodyRead::Failed
        }
    }
}

/// Copies request headers, joining repeated names with `, `.
fn collect_headers(headers: &HeaderMap) -> RequestHeaders {
    let mut collected = RequestHeaders::with_capacity(headers.keys_len());
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    collected
}

fn into_http_response(proxy_response: ProxyResponse) -> Response {
    let status = StatusCode::from_u16(proxy_response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = Response::new(Body::from(proxy_response.body));
    *response.status_mut() = status;

    for (name, value) in &proxy_response.headers {
        if let (Ok(header_name), Ok(header_value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::from_str(value),
        ) {
            response.headers_mut().insert(header_name, header_value);
        }
    }

    response
}

async fn log_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let latency_ms = start.elapsed().as_millis() as u64;

    match status {
        500..=599 => error!(%method, %path, status, latency_ms, "server error"),
        400..=499 => warn!(%method, %path, status, latency_ms, "client error"),
        _ => info!(%method, %path, status, latency_ms, "request completed"),
    }

    response
}

/// Serves until `signal` resolves, then cancels in-flight upstream calls and
/// drains open connections.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    gateway: Arc<ProxyGateway>,
    path: &str,
    signal: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(Arc::clone(&gateway), path);
    let on_shutdown = async move {
        signal.await;
        info!("shutdown requested; cancelling upstream calls");
        gateway.shutdown();
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(on_shutdown)
        .await
}

pub async fn serve(
    listener: TcpListener,
    gateway: Arc<ProxyGateway>,
    path: &str,
) -> std::io::Result<()> {
    serve_with_shutdown(listener, gateway, path, shutdown_signal()).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
#[path = "server_test.rs"]
mod server_test;
