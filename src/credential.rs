//! Server-held upstream secret.
//!
//! The key is kept in a `Zeroizing<String>` so it is wiped from memory on
//! drop, and its `Debug` output is redacted so it cannot leak through logs.

use std::fmt;
use zeroize::Zeroizing;

#[derive(Clone)]
pub struct ApiKey(Zeroizing<String>);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Returns `None` for an empty or whitespace-only value.
    pub fn non_empty<S: Into<String>>(value: S) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self::new(value))
        }
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

#[cfg(test)]
#[path = "credential_test.rs"]
mod credential_test;
