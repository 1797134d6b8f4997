use http::StatusCode;
use http::header::HeaderName;
use serde::Serialize;
use serde_json::{Map, Value};

/// Uniform JSON body: `{"status": "ok", ...}` or `{"status": "error", "message": ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    fields: Map<String, Value>,
}

impl Envelope {
    pub fn ok() -> Self {
        let mut fields = Map::new();
        fields.insert("status".into(), Value::from("ok"));
        Self { fields }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("status".into(), Value::from("error"));
        fields.insert("message".into(), Value::from(message.into()));
        Self { fields }
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::error!(key, error = %e, "failed to serialize response field");
            Value::Null
        });
        self.fields.insert(key.to_owned(), value);
        self
    }

    pub fn to_vec(&self) -> Vec<u8> {
        // A map of JSON values always serializes.
        serde_json::to_vec(&self.fields).unwrap_or_default()
    }
}

/// Transport-independent response produced by the registry handler.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: Vec<(HeaderName, String)>,
    pub envelope: Envelope,
}

impl ApiResponse {
    pub fn new(status: StatusCode, envelope: Envelope) -> Self {
        Self {
            status,
            headers: Vec::new(),
            envelope,
        }
    }

    pub fn ok(envelope: Envelope) -> Self {
        Self::new(StatusCode::OK, envelope)
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, Envelope::error(message))
    }

    pub fn with_header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn body(&self) -> Vec<u8> {
        self.envelope.to_vec()
    }
}
