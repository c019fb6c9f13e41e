//! Merged request record
//!
//! Controllers merge the HTTP body, route params, query string, headers and
//! cookies into one record before handing it to the payload pipeline. Body
//! fields sit at the top level; the other sources live under reserved
//! `__`-prefixed keys so they can never collide with body fields.

use serde_json::{Map, Value};

pub const PARAMS_KEY: &str = "__params";
pub const QS_KEY: &str = "__qs";
pub const HEADERS_KEY: &str = "__headers";
pub const COOKIES_KEY: &str = "__cookies";

/// The merged, namespaced record a request payload starts from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestRecord {
    body: Map<String, Value>,
    params: Map<String, Value>,
    qs: Map<String, Value>,
    headers: Map<String, Value>,
    cookies: Map<String, Value>,
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl RequestRecord {
    /// Start from a request body (non-object bodies are treated as empty).
    #[must_use]
    pub fn new(body: Value) -> Self {
        Self {
            body: as_object(body),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = as_object(params);
        self
    }

    #[must_use]
    pub fn with_qs(mut self, qs: Value) -> Self {
        self.qs = as_object(qs);
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: Value) -> Self {
        self.headers = as_object(headers);
        self
    }

    #[must_use]
    pub fn with_cookies(mut self, cookies: Value) -> Self {
        self.cookies = as_object(cookies);
        self
    }

    /// Body field lookup.
    #[must_use]
    pub fn body_field(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// Route param lookup.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Query-string lookup.
    #[must_use]
    pub fn query(&self, key: &str) -> Option<&Value> {
        self.qs.get(key)
    }

    /// Header lookup (names are matched case-insensitively, as merged
    /// headers are lowercased by the boundary).
    #[must_use]
    pub fn header(&self, key: &str) -> Option<&Value> {
        self.headers.get(&key.to_ascii_lowercase())
    }

    /// Cookie lookup.
    #[must_use]
    pub fn cookie(&self, key: &str) -> Option<&Value> {
        self.cookies.get(key)
    }

    /// The single namespaced record the validator runs against.
    #[must_use]
    pub fn merged(&self) -> Value {
        let mut merged = self.body.clone();
        merged.insert(PARAMS_KEY.into(), Value::Object(self.params.clone()));
        merged.insert(QS_KEY.into(), Value::Object(self.qs.clone()));
        merged.insert(HEADERS_KEY.into(), Value::Object(self.headers.clone()));
        merged.insert(COOKIES_KEY.into(), Value::Object(self.cookies.clone()));
        Value::Object(merged)
    }
}
