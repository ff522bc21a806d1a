//! Request specification type

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// Complete specification for an outbound HTTP call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// Identifier used to correlate log lines for one logical call
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL, or a path relative to the gateway base URL
    pub url: String,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// JSON request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Query parameters, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<(String, String)>,
}

impl RequestSpec {
    /// Creates a request with the given method and URL.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
            params: Vec::new(),
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, url)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Adds or replaces a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Returns the path portion of the URL, without scheme, host or query.
    #[must_use]
    pub fn path(&self) -> &str {
        let without_query = self.url.split(['?', '#']).next().unwrap_or_default();
        match without_query.split_once("://") {
            Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
            None => without_query,
        }
    }

    /// Checks the request is well-formed before it is dispatched.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty URL or an invalid header name.
    pub fn validate(&self) -> DomainResult<()> {
        if self.url.trim().is_empty() {
            return Err(DomainError::InvalidUrl("URL is required".to_string()));
        }
        self.headers.iter().try_for_each(super::Header::validate)
    }
}
