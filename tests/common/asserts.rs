#![allow(dead_code)]

use chat_proxy_rs::ProxyResponse;
use chat_proxy_rs::constants::{content_type, cors, header};

/// Asserts the headers every response carries, whatever its status.
pub fn assert_cors(response: &ProxyResponse, allowed_origin: Option<&str>) {
    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_METHODS),
        Some(cors::ALLOWED_METHODS)
    );
    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_HEADERS),
        Some(cors::ALLOWED_HEADERS)
    );
    assert_eq!(response.header(header::VARY), Some("Origin"));
    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        allowed_origin
    );
}

pub fn assert_rejected(response: &ProxyResponse, status: u16, body: &str) {
    assert_eq!(response.status, status, "body: {}", response.body_text());
    assert_eq!(response.body_text(), body);
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        Some(content_type::PLAIN_TEXT)
    );
}

pub fn assert_preflight(response: &ProxyResponse) {
    assert_eq!(response.status, 204);
    assert!(response.body.is_empty());
}
