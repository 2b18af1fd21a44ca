use crate::header_builder::HeaderBuilder;
use crate::headers::Headers;
use crate::normalized_request::NormalizedRequest;
use crate::origin::{AllowedOriginSet, OriginDecision};

/// The origin decision for one request. Authorization and the CORS headers of
/// every response branch are both derived from this single value.
#[derive(Debug, Clone)]
pub struct CorsEvaluation {
    decision: OriginDecision,
}

impl CorsEvaluation {
    pub fn new(decision: OriginDecision) -> Self {
        Self { decision }
    }

    #[doc(hidden)]
    pub fn evaluate(request: &NormalizedRequest<'_>, origins: &AllowedOriginSet) -> Self {
        Self::new(origins.resolve(request.origin()))
    }

    pub fn decision(&self) -> &OriginDecision {
        &self.decision
    }

    pub fn is_allowed(&self) -> bool {
        self.decision.is_allowed()
    }

    pub fn headers(&self) -> Headers {
        HeaderBuilder::new(&self.decision).build().into_headers()
    }
}

/// CORS headers for a response to a request carrying `origin`.
pub fn cors_headers(origin: Option<&str>, origins: &AllowedOriginSet) -> Headers {
    CorsEvaluation::new(origins.resolve(origin)).headers()
}

#[cfg(test)]
#[path = "cors_test.rs"]
mod cors_test;
