pub mod client;
pub mod constants;
mod context;
mod cors;
mod credential;
mod gateway;
mod header_builder;
mod headers;
mod normalized_request;
mod options;
mod origin;
mod result;
pub mod server;
pub mod telemetry;
mod transcript;
pub mod upstream;
mod util;

pub use client::{ChatBackend, ChatClient, ClientError, interpret_response};
pub use context::{InboundRequest, RequestHeaders};
pub use cors::{CorsEvaluation, cors_headers};
pub use credential::ApiKey;
pub use gateway::{ProxyGateway, validate_payload};
pub use headers::Headers;
#[doc(hidden)]
pub use normalized_request::NormalizedRequest;
pub use options::{ProxyOptions, ValidationError, env};
pub use origin::{
    AllowedOriginSet, OriginDecision, OriginMatcher, PatternError, is_allowed_origin,
};
pub use result::{ProxyResponse, Rejection};
pub use transcript::{ChatSession, Entry, Role, Transcript};
pub use upstream::{HttpUpstream, Upstream, UpstreamError, UpstreamReply, UpstreamRequest};
pub use util::{equals_ignore_case, normalize_lower};
