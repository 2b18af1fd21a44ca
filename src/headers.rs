use indexmap::IndexMap;

/// Response headers in insertion order.
pub type Headers = IndexMap<String, String>;

#[derive(Debug, Default, Clone)]
pub(crate) struct HeaderCollection {
    headers: Headers,
}

impl HeaderCollection {
    pub(crate) fn new() -> Self {
        Self::with_estimate(4)
    }

    pub(crate) fn with_estimate(estimate: usize) -> Self {
        Self {
            headers: IndexMap::with_capacity(estimate),
        }
    }

    /// Inserts or replaces a header. Names are matched case-insensitively so a
    /// later `content-type` replaces an earlier `Content-Type`.
    pub(crate) fn push(&mut self, name: String, value: String) {
        match self
            .headers
            .keys()
            .position(|key| key.eq_ignore_ascii_case(&name))
        {
            Some(index) => {
                if let Some((_, existing)) = self.headers.get_index_mut(index) {
                    *existing = value;
                }
            }
            None => {
                self.headers.insert(name, value);
            }
        }
    }

    pub(crate) fn extend(&mut self, other: HeaderCollection) {
        for (name, value) in other.headers {
            self.push(name, value);
        }
    }

    pub(crate) fn into_headers(self) -> Headers {
        self.headers
    }
}

#[cfg(test)]
#[path = "headers_test.rs"]
mod headers_test;
