use crate::constants::{defaults, header};
use crate::credential::ApiKey;
use crate::origin::{AllowedOriginSet, OriginMatcher, PatternError};
use crate::util::{is_http_token, split_list};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub mod env {
    pub const BACKEND_URL: &str = "BACKEND_URL";
    pub const API_KEY: &str = "API_KEY";
    pub const UPSTREAM_KEY_HEADER: &str = "UPSTREAM_KEY_HEADER";
    pub const UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
    pub const ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
    pub const ALLOWED_SITE_HOST: &str = "ALLOWED_SITE_HOST";
    pub const ALLOWED_ORIGIN_PATTERNS: &str = "ALLOWED_ORIGIN_PATTERNS";
    pub const MAX_BODY_BYTES: &str = "MAX_BODY_BYTES";
}

/// Process-wide gateway configuration, built once at startup and never mutated.
///
/// A missing upstream URL or API key is not a validation error: the gateway
/// starts and answers authorized requests with `500 Server misconfigured`.
#[derive(Clone, Debug)]
pub struct ProxyOptions {
    pub upstream_url: Option<Url>,
    pub api_key: Option<ApiKey>,
    /// Header carrying the API key on upstream requests.
    pub api_key_header: String,
    pub upstream_timeout: Duration,
    pub origins: AllowedOriginSet,
    pub max_body_bytes: usize,
}

impl Default for ProxyOptions {
    fn default() -> Self {
        Self {
            upstream_url: None,
            api_key: None,
            api_key_header: header::DEFAULT_API_KEY.to_string(),
            upstream_timeout: defaults::UPSTREAM_TIMEOUT,
            origins: AllowedOriginSet::list(defaults::LOCAL_ORIGINS),
            max_body_bytes: defaults::MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("upstream URL '{value}' is invalid: {source}")]
    InvalidUpstreamUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("upstream URL scheme '{0}' is not supported; use http or https")]
    UnsupportedUpstreamScheme(String),
    #[error("'{0}' is not a valid HTTP header name")]
    InvalidKeyHeader(String),
    #[error("API key contains characters that cannot be sent in an HTTP header")]
    InvalidApiKey,
    #[error("upstream timeout '{0}' is not a whole number of seconds")]
    InvalidTimeout(String),
    #[error("upstream timeout must be greater than zero")]
    ZeroTimeout,
    #[error("body limit '{0}' must be a positive number of bytes")]
    InvalidBodyLimit(String),
    #[error("allowed origin pattern '{pattern}' is invalid: {source}")]
    InvalidOriginPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },
}

impl ProxyOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.upstream_url
            && !matches!(url.scheme(), "http" | "https")
        {
            return Err(ValidationError::UnsupportedUpstreamScheme(
                url.scheme().to_string(),
            ));
        }

        if !is_http_token(&self.api_key_header) {
            return Err(ValidationError::InvalidKeyHeader(
                self.api_key_header.clone(),
            ));
        }

        if let Some(key) = &self.api_key
            && !key
                .expose()
                .bytes()
                .all(|byte| byte == b'\t' || (0x20..0x7f).contains(&byte))
        {
            return Err(ValidationError::InvalidApiKey);
        }

        if self.upstream_timeout.is_zero() {
            return Err(ValidationError::ZeroTimeout);
        }

        if self.max_body_bytes == 0 {
            return Err(ValidationError::InvalidBodyLimit("0".to_string()));
        }

        Ok(())
    }

    /// Both halves of the upstream target, or `None` when either is unset.
    pub fn upstream_target(&self) -> Option<(&Url, &ApiKey)> {
        match (&self.upstream_url, &self.api_key) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => None,
        }
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds options from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut options = Self::default();

        if let Some(value) = var(env::BACKEND_URL) {
            let url = Url::parse(&value).map_err(|source| ValidationError::InvalidUpstreamUrl {
                value: value.clone(),
                source,
            })?;
            options.upstream_url = Some(url);
        }

        options.api_key = lookup(env::API_KEY).and_then(ApiKey::non_empty);

        if let Some(value) = var(env::UPSTREAM_KEY_HEADER) {
            options.api_key_header = value;
        }

        if let Some(value) = var(env::UPSTREAM_TIMEOUT_SECS) {
            let secs = value
                .parse::<u64>()
                .map_err(|_| ValidationError::InvalidTimeout(value.clone()))?;
            options.upstream_timeout = Duration::from_secs(secs);
        }

        if let Some(value) = var(env::MAX_BODY_BYTES) {
            options.max_body_bytes = value
                .parse::<usize>()
                .map_err(|_| ValidationError::InvalidBodyLimit(value.clone()))?;
        }

        let mut origins = match var(env::ALLOWED_ORIGINS) {
            Some(value) => AllowedOriginSet::list(split_list(&value)),
            None => AllowedOriginSet::list(defaults::LOCAL_ORIGINS),
        };

        if let Some(host) = var(env::ALLOWED_SITE_HOST) {
            origins = origins.with_site_host(host);
        }

        if let Some(value) = var(env::ALLOWED_ORIGIN_PATTERNS) {
            // Whitespace-separated, since commas are meaningful inside regexes.
            for pattern in value.split_whitespace() {
                let matcher = OriginMatcher::pattern_str(pattern).map_err(|source| {
                    ValidationError::InvalidOriginPattern {
                        pattern: pattern.to_string(),
                        source,
                    }
                })?;
                origins = origins.with(matcher);
            }
        }

        options.origins = origins;
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
#[path = "options_test.rs"]
mod options_test;
