//! Outgoing-call header injection

use lyceum_domain::RequestSpec;

use super::CredentialStore;
use crate::config::AUTHORIZATION_HEADER;

/// Attaches authentication and tenant scope to every outgoing call.
///
/// Runs on every dispatch and every replay, reading the store at that
/// moment rather than when the call was built.
#[derive(Debug, Clone)]
pub struct RequestInterceptor {
    store: CredentialStore,
    tenant_header: String,
}

impl RequestInterceptor {
    /// Creates an interceptor reading from `store`.
    #[must_use]
    pub fn new(store: CredentialStore, tenant_header: impl Into<String>) -> Self {
        Self {
            store,
            tenant_header: tenant_header.into(),
        }
    }

    /// Adds the headers to `request`.
    ///
    /// `Authorization` is always overwritten when a token is present. The
    /// tenant header is only added when the caller did not set one, which
    /// lets a single call target another tenant.
    pub fn apply(&self, request: &mut RequestSpec) {
        let credential = self.store.snapshot();

        if let Some(bearer) = credential.bearer() {
            request.headers.set(AUTHORIZATION_HEADER, bearer);
        }

        if let Some(tenant) = credential.active_tenant_id {
            request.headers.set_if_absent(self.tenant_header.as_str(), tenant);
        }
    }
}
