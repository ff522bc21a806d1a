//! User-facing notifications

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A mutating call went through
    Success,
    /// A call failed
    Error,
    /// Neutral information
    Info,
    /// Something needs attention but nothing failed
    Warning,
}

impl Severity {
    /// Returns the severity as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A toast message pushed from the HTTP layer to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Text shown to the user
    pub message: String,
    /// Presentation style
    pub severity: Severity,
    /// How long the toast stays up, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_hide_duration: Option<u64>,
}

impl Notification {
    /// Creates a notification without an explicit display duration.
    #[must_use]
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            auto_hide_duration: None,
        }
    }

    /// Creates a success notification.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    /// Creates an error notification.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    /// Sets how long the toast stays visible.
    #[must_use]
    pub const fn with_auto_hide(mut self, duration_ms: Option<u64>) -> Self {
        self.auto_hide_duration = duration_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let toast = Notification::error("Network error. Please check your connection.")
            .with_auto_hide(Some(6000));
        assert_eq!(
            serde_json::to_value(&toast).ok(),
            Some(json!({
                "message": "Network error. Please check your connection.",
                "severity": "error",
                "autoHideDuration": 6000
            }))
        );
    }

    #[test]
    fn test_auto_hide_is_omitted_when_unset() {
        let toast = Notification::success("Saved");
        assert_eq!(
            serde_json::to_value(&toast).ok(),
            Some(json!({ "message": "Saved", "severity": "success" }))
        );
    }
}
