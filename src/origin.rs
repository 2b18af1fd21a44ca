use regex_automata::meta::{BuildError, Regex};
use thiserror::Error;
use url::Url;

const MAX_PATTERN_LENGTH: usize = 50_000;
const MAX_ORIGIN_LENGTH: usize = 4_096;

/// Separator between a branch or preview label and the site host, e.g.
/// `pr-12--site.example` for the site host `site.example`.
const PREVIEW_SEPARATOR: &str = "--";

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("failed to compile origin pattern")]
    Build(#[source] Box<BuildError>),
    #[error("origin pattern length {length} exceeds maximum allowed {max}")]
    TooLong { length: usize, max: usize },
}

/// A single rule of an [`AllowedOriginSet`].
#[derive(Clone, Debug)]
pub enum OriginMatcher {
    /// Byte-for-byte comparison with the full origin string.
    Exact(String),
    /// The origin's hostname equals the host, or ends with `--<host>`.
    SiteHost(String),
    /// Case-insensitive regular expression anchored to the whole origin.
    Pattern(Regex),
}

impl OriginMatcher {
    pub fn exact<S: Into<String>>(value: S) -> Self {
        Self::Exact(value.into())
    }

    pub fn site_host<S: AsRef<str>>(host: S) -> Self {
        Self::SiteHost(host.as_ref().trim().trim_end_matches('.').to_ascii_lowercase())
    }

    pub fn pattern_str(pattern: &str) -> Result<Self, PatternError> {
        if pattern.len() > MAX_PATTERN_LENGTH {
            return Err(PatternError::TooLong {
                length: pattern.len(),
                max: MAX_PATTERN_LENGTH,
            });
        }

        Regex::new(&format!("(?i:^(?:{pattern})$)"))
            .map(Self::Pattern)
            .map_err(|err| PatternError::Build(Box::new(err)))
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            OriginMatcher::Exact(value) => value == candidate,
            OriginMatcher::SiteHost(host) => hostname(candidate)
                .map(|candidate_host| host_matches(host, &candidate_host))
                .unwrap_or(false),
            OriginMatcher::Pattern(regex) => regex.is_match(candidate.as_bytes()),
        }
    }
}

impl From<String> for OriginMatcher {
    fn from(value: String) -> Self {
        OriginMatcher::Exact(value)
    }
}

impl From<&str> for OriginMatcher {
    fn from(value: &str) -> Self {
        OriginMatcher::Exact(value.to_owned())
    }
}

fn hostname(origin: &str) -> Option<String> {
    let url = Url::parse(origin).ok()?;
    url.host_str().map(str::to_string)
}

fn host_matches(site_host: &str, candidate: &str) -> bool {
    if site_host.is_empty() {
        return false;
    }

    candidate == site_host
        || candidate
            .strip_suffix(site_host)
            .is_some_and(|prefix| prefix.ends_with(PREVIEW_SEPARATOR))
}

/// Outcome of evaluating a request origin against an [`AllowedOriginSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginDecision {
    /// The origin is allowed; carries the value exactly as received.
    Allowed(String),
    Disallowed,
    Missing,
}

impl OriginDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, OriginDecision::Allowed(_))
    }

    pub fn allowed_origin(&self) -> Option<&str> {
        match self {
            OriginDecision::Allowed(origin) => Some(origin),
            _ => None,
        }
    }
}

/// Browser origins permitted to call the gateway. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct AllowedOriginSet {
    matchers: Vec<OriginMatcher>,
}

impl AllowedOriginSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OriginMatcher>,
    {
        Self {
            matchers: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with(mut self, matcher: OriginMatcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn with_site_host<S: AsRef<str>>(self, host: S) -> Self {
        self.with(OriginMatcher::site_host(host))
    }

    pub fn matchers(&self) -> &[OriginMatcher] {
        &self.matchers
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    pub fn contains(&self, origin: &str) -> bool {
        if origin.is_empty() || origin.len() > MAX_ORIGIN_LENGTH {
            return false;
        }

        self.matchers.iter().any(|matcher| matcher.matches(origin))
    }

    pub fn resolve(&self, request_origin: Option<&str>) -> OriginDecision {
        match request_origin {
            None | Some("") => OriginDecision::Missing,
            Some(origin) if self.contains(origin) => OriginDecision::Allowed(origin.to_string()),
            Some(_) => OriginDecision::Disallowed,
        }
    }
}

/// Pure membership predicate. Absent and empty origins are never allowed.
pub fn is_allowed_origin(origin: Option<&str>, origins: &AllowedOriginSet) -> bool {
    origins.resolve(origin).is_allowed()
}

#[cfg(test)]
#[path = "origin_test.rs"]
mod origin_test;
