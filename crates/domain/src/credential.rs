//! Session credential

use serde::{Deserialize, Serialize};

/// The credential every outgoing call is authenticated with.
///
/// Both fields are optional: a missing token means the call goes out
/// unauthenticated, a missing tenant means it goes out unscoped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token for the `Authorization` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Tenant the console is currently working in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_tenant_id: Option<String>,
}

impl Credential {
    /// Creates a credential for a signed-in session.
    #[must_use]
    pub fn new(access_token: impl Into<String>, active_tenant_id: Option<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            active_tenant_id,
        }
    }

    /// Returns true if a bearer token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Returns the `Authorization` header value for the current token.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.access_token
            .as_deref()
            .map(|token| format!("Bearer {token}"))
    }

    /// Short, log-safe preview of the token (first 8 chars + ...).
    #[must_use]
    pub fn token_preview(&self) -> Option<String> {
        self.access_token.as_deref().map(|token| {
            if token.chars().count() > 12 {
                format!("{}...", token.chars().take(8).collect::<String>())
            } else {
                "***".to_string()
            }
        })
    }
}
