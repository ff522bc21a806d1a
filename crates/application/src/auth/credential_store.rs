//! Shared credential storage.
//!
//! The store is the one piece of mutable state the whole gateway shares.
//! Reads are synchronous so the interceptor can take a snapshot at the
//! exact moment a call is dispatched.

use std::sync::Arc;

use lyceum_domain::Credential;
use parking_lot::RwLock;

/// Thread-safe holder of the current session credential.
///
/// Cloning is cheap and every clone sees the same credential.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Credential>>,
}

impl CredentialStore {
    /// Creates a signed-out store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding an existing credential.
    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            inner: Arc::new(RwLock::new(credential)),
        }
    }

    /// Returns a copy of the current credential.
    #[must_use]
    pub fn snapshot(&self) -> Credential {
        self.inner.read().clone()
    }

    /// Returns the current access token.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.inner.read().access_token.clone()
    }

    /// Returns the active tenant.
    #[must_use]
    pub fn active_tenant(&self) -> Option<String> {
        self.inner.read().active_tenant_id.clone()
    }

    /// Returns true if a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_authenticated()
    }

    /// Records a successful sign-in.
    pub fn sign_in(&self, access_token: impl Into<String>, tenant: Option<String>) {
        *self.inner.write() = Credential::new(access_token, tenant);
        tracing::debug!("credential store: signed in");
    }

    /// Replaces the access token, keeping the active tenant.
    pub fn set_access_token(&self, access_token: impl Into<String>) {
        self.inner.write().access_token = Some(access_token.into());
        tracing::debug!("credential store: access token replaced");
    }

    /// Switches the active tenant, or clears it with `None`.
    pub fn set_active_tenant(&self, tenant: Option<String>) {
        tracing::debug!(tenant = ?tenant, "credential store: active tenant changed");
        self.inner.write().active_tenant_id = tenant;
    }

    /// Restores a saved credential as-is.
    pub fn restore(&self, credential: Credential) {
        *self.inner.write() = credential;
    }

    /// Clears the token and the tenant.
    pub fn sign_out(&self) {
        *self.inner.write() = Credential::default();
        tracing::debug!("credential store: signed out");
    }
}
