//! Gateway configuration

use serde::{Deserialize, Serialize};

use lyceum_domain::RequestSpec;

/// Name of the header carrying the bearer token.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Settings for the gateway and the transport behind it.
///
/// Every field has a default, so a partial config file or a handful of
/// environment variables is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL relative request paths are joined onto.
    pub base_url: String,
    /// Header used to scope a call to a tenant.
    pub tenant_header: String,
    /// Sign-in endpoint path. Exempt from refresh and notifications.
    pub login_path: String,
    /// Token refresh endpoint path. Exempt from refresh and notifications.
    pub refresh_path: String,
    /// Field holding the bearer token in sign-in and refresh responses.
    pub token_field: String,
    /// Field holding the tenant id in sign-in responses.
    pub tenant_field: String,
    /// Per-request timeout applied by the transport, in milliseconds.
    pub timeout_ms: u64,
    /// How long toasts stay up, in milliseconds. `None` leaves it to the UI.
    pub toast_duration_ms: Option<u64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            tenant_header: "X-Tenant-ID".to_string(),
            login_path: "/auth/login".to_string(),
            refresh_path: "/auth/refresh".to_string(),
            token_field: "access_token".to_string(),
            tenant_field: "tenant_id".to_string(),
            timeout_ms: 30_000,
            toast_duration_ms: Some(6_000),
        }
    }
}

impl GatewayConfig {
    /// Returns true for calls to the sign-in or refresh endpoints.
    ///
    /// These never go through the refresh-and-replay path, so a 401 from
    /// them cannot start a refresh loop. Leading and trailing slashes are
    /// ignored on both sides, and a match must end on a segment boundary.
    #[must_use]
    pub fn is_auth_endpoint(&self, request: &RequestSpec) -> bool {
        let path = request.path().trim_matches('/');
        [&self.login_path, &self.refresh_path]
            .into_iter()
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty())
            .any(|p| {
                path.strip_suffix(p)
                    .is_some_and(|prefix| prefix.is_empty() || prefix.ends_with('/'))
            })
    }
}
