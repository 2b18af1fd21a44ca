use crate::constants::{cors, header};
use crate::headers::HeaderCollection;
use crate::origin::OriginDecision;

pub(crate) struct HeaderBuilder<'a> {
    decision: &'a OriginDecision,
}

impl<'a> HeaderBuilder<'a> {
    pub(crate) fn new(decision: &'a OriginDecision) -> Self {
        Self { decision }
    }

    /// The full CORS header set for one response.
    pub(crate) fn build(&self) -> HeaderCollection {
        let mut headers = HeaderCollection::with_estimate(4);
        headers.extend(self.build_methods_header());
        headers.extend(self.build_allowed_headers());
        headers.extend(self.build_vary_header());
        headers.extend(self.build_origin_header());
        headers
    }

    pub(crate) fn build_methods_header(&self) -> HeaderCollection {
        let mut headers = HeaderCollection::with_estimate(1);
        headers.push(
            header::ACCESS_CONTROL_ALLOW_METHODS.to_string(),
            cors::ALLOWED_METHODS.to_string(),
        );
        headers
    }

    pub(crate) fn build_allowed_headers(&self) -> HeaderCollection {
        let mut headers = HeaderCollection::with_estimate(1);
        headers.push(
            header::ACCESS_CONTROL_ALLOW_HEADERS.to_string(),
            cors::ALLOWED_HEADERS.to_string(),
        );
        headers
    }

    pub(crate) fn build_vary_header(&self) -> HeaderCollection {
        let mut headers = HeaderCollection::with_estimate(1);
        headers.push(header::VARY.to_string(), header::ORIGIN.to_string());
        headers
    }

    /// Echoes the origin only when it was allowed; a disallowed origin is never reflected.
    pub(crate) fn build_origin_header(&self) -> HeaderCollection {
        match self.decision {
            OriginDecision::Allowed(origin) => {
                let mut headers = HeaderCollection::with_estimate(1);
                headers.push(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN.to_string(),
                    origin.clone(),
                );
                headers
            }
            OriginDecision::Disallowed | OriginDecision::Missing => HeaderCollection::new(),
        }
    }
}

#[cfg(test)]
#[path = "header_builder_test.rs"]
mod header_builder_test;
