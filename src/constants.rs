pub mod header {
    pub const ACCESS_CONTROL_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
    pub const ACCESS_CONTROL_ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
    pub const ACCESS_CONTROL_ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const ORIGIN: &str = "Origin";
    pub const VARY: &str = "Vary";
    pub const DEFAULT_API_KEY: &str = "X-API-Key";
}

pub mod method {
    pub const OPTIONS: &str = "OPTIONS";
    pub const POST: &str = "POST";
}

pub mod content_type {
    pub const JSON: &str = "application/json";
    pub const PLAIN_TEXT: &str = "text/plain; charset=utf-8";
}

/// Fixed response bodies. Callers never see anything more specific than these.
pub mod body {
    pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
    pub const FORBIDDEN: &str = "Forbidden";
    pub const SERVER_MISCONFIGURED: &str = "Server misconfigured";
    pub const PAYLOAD_TOO_LARGE: &str = "Payload Too Large";
    pub const INVALID_JSON: &str = "Invalid JSON";
    pub const INVALID_PAYLOAD: &str = "Invalid payload";
    pub const UPSTREAM_ERROR: &str = "Upstream error";
    pub const BAD_GATEWAY: &str = "Bad Gateway";
}

/// Values emitted on every response regardless of the origin decision.
pub mod cors {
    pub const ALLOWED_METHODS: &str = "POST,OPTIONS";
    pub const ALLOWED_HEADERS: &str = "Content-Type";
}

pub mod defaults {
    use std::time::Duration;

    pub const PROXY_PATH: &str = "/.netlify/functions/ai-proxy";
    pub const BIND_ADDR: &str = "127.0.0.1:8888";
    pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);
    pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const MAX_BODY_BYTES: usize = 64 * 1024;
    pub const LOCAL_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];
}
