use indexmap::IndexMap;

/// Header mapping as received from the HTTP layer. Keys keep their original casing.
pub type RequestHeaders = IndexMap<String, String>;

/// A single inbound call to the gateway, built per request and dropped after the response.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub method: String,
    pub headers: RequestHeaders,
    pub body: String,
    /// Set by the HTTP adapter when the body exceeded the configured limit and was not read.
    pub body_too_large: bool,
}

impl InboundRequest {
    pub fn new<S: Into<String>>(method: S) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    pub fn with_header<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body<S: Into<String>>(mut self, body: S) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_body_too_large(mut self) -> Self {
        self.body.clear();
        self.body_too_large = true;
        self
    }
}
