//! Response specification type

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::Headers;

/// HTTP response as seen by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body as text
    pub body: String,
    /// Response time
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    /// Response size in bytes
    pub size: usize,
}

impl ResponseSpec {
    /// Creates a response from raw transport output.
    ///
    /// Bodies that are not valid UTF-8 are decoded lossily.
    #[must_use]
    pub fn new(status: u16, headers: Headers, body: Vec<u8>, duration: Duration) -> Self {
        let size = body.len();
        Self {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
            duration,
            size,
        }
    }

    /// Creates a response with a JSON body, mostly useful for fakes.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        let mut headers = Headers::new();
        headers.set("Content-Type", "application/json");
        Self::new(status, headers, body.to_string().into_bytes(), Duration::ZERO)
    }

    /// Creates a response with a plain-text body.
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain");
        Self::new(status, headers, body.into().into_bytes(), Duration::ZERO)
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true for 401 Unauthorized.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Returns true if the status code indicates a client error (4xx).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Returns true if the status code indicates a server error (5xx).
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Returns the body as a JSON value.
    ///
    /// JSON bodies are parsed; anything else is returned as a JSON string
    /// holding the raw text. An empty body yields `None`.
    #[must_use]
    pub fn payload(&self) -> Option<Value> {
        if self.body.trim().is_empty() {
            return None;
        }
        Some(
            serde_json::from_str(&self.body)
                .unwrap_or_else(|_| Value::String(self.body.clone())),
        )
    }
}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self {
            status: 0,
            headers: Headers::new(),
            body: String::new(),
            duration: Duration::ZERO,
            size: 0,
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
