use crate::constants::{header, method};
use crate::context::InboundRequest;
use crate::util::normalize_lower;

/// Read-only view over an [`InboundRequest`] with case-insensitive header access.
#[doc(hidden)]
pub struct NormalizedRequest<'a> {
    request: &'a InboundRequest,
}

impl<'a> NormalizedRequest<'a> {
    #[doc(hidden)]
    pub fn new(request: &'a InboundRequest) -> Self {
        Self { request }
    }

    /// Looks a header up by its exact name, then its lower-cased name, then by
    /// an ASCII case-insensitive scan.
    #[doc(hidden)]
    pub fn header(&self, name: &str) -> Option<&'a str> {
        let headers = &self.request.headers;

        if let Some(value) = headers.get(name) {
            return Some(value.as_str());
        }

        if let Some(value) = headers.get(normalize_lower(name).as_str()) {
            return Some(value.as_str());
        }

        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The `Origin` header, treating an empty value as absent.
    #[doc(hidden)]
    pub fn origin(&self) -> Option<&'a str> {
        self.header(header::ORIGIN).filter(|value| !value.is_empty())
    }

    #[doc(hidden)]
    pub fn method(&self) -> &'a str {
        &self.request.method
    }

    /// Method names are case-sensitive; `options` is not a preflight.
    #[doc(hidden)]
    pub fn is_options(&self) -> bool {
        self.request.method == method::OPTIONS
    }

    #[doc(hidden)]
    pub fn is_post(&self) -> bool {
        self.request.method == method::POST
    }

    #[doc(hidden)]
    pub fn body(&self) -> &'a str {
        &self.request.body
    }

    #[doc(hidden)]
    pub fn body_too_large(&self) -> bool {
        self.request.body_too_large
    }
}

#[cfg(test)]
#[path = "normalized_request_test.rs"]
mod normalized_request_test;
