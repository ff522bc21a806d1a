//! Session lifecycle: sign-in, tenant switch, sign-out, restore.

use std::sync::Arc;

use lyceum_domain::{Credential, RequestSpec};
use serde_json::{Value, json};
use thiserror::Error;

use crate::error::GatewayError;
use crate::gateway::ApiGateway;
use crate::ports::{HttpTransport, SessionRepository, SessionStorageError};

/// Why a session operation failed.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The sign-in call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The sign-in response had no token in the expected field.
    #[error("sign-in response has no `{0}` field")]
    MissingToken(String),

    /// The persisted session could not be read or written.
    #[error("session storage error: {0}")]
    Storage(#[from] SessionStorageError),
}

/// Drives the credential store through the session lifecycle and keeps
/// the persisted copy in step with it.
pub struct SessionService<C: ?Sized> {
    gateway: Arc<ApiGateway<C>>,
    repository: Arc<dyn SessionRepository>,
}

impl<C> SessionService<C>
where
    C: HttpTransport + ?Sized + 'static,
{
    /// Creates a service over `gateway`, persisting through `repository`.
    #[must_use]
    pub fn new(gateway: Arc<ApiGateway<C>>, repository: Arc<dyn SessionRepository>) -> Self {
        Self {
            gateway,
            repository,
        }
    }

    /// The gateway this service signs in through.
    #[must_use]
    pub const fn gateway(&self) -> &Arc<ApiGateway<C>> {
        &self.gateway
    }

    /// Signs in and makes the returned token current.
    ///
    /// The active tenant is the one named in the response, or `tenant` if
    /// the response names none. The new session is persisted.
    ///
    /// # Errors
    ///
    /// Returns `Gateway` if the call failed (bad credentials included),
    /// `MissingToken` if it succeeded without a token, and `Storage` if
    /// the session could not be saved.
    pub async fn sign_in(
        &self,
        username: &str,
        password: &str,
        tenant: Option<&str>,
    ) -> Result<Credential, SessionError> {
        let config = self.gateway.config();

        let mut body = json!({ "username": username, "password": password });
        let mut request = RequestSpec::post(config.login_path.as_str());
        if let Some(tenant) = tenant {
            body["tenant_id"] = Value::String(tenant.to_string());
            request = request.with_header(config.tenant_header.as_str(), tenant);
        }

        let response = self.gateway.execute(request.with_json(body)).await?;
        let payload = response.payload().unwrap_or(Value::Null);

        let token = payload
            .get(&config.token_field)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SessionError::MissingToken(config.token_field.clone()))?;
        let active_tenant = payload
            .get(&config.tenant_field)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .or(tenant)
            .map(str::to_string);

        self.gateway.credentials().sign_in(token, active_tenant);
        tracing::info!(username, "signed in");

        self.persist().await?;
        Ok(self.gateway.credentials().snapshot())
    }

    /// Makes `tenant` the scope of subsequent calls and persists it.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the session could not be saved.
    pub async fn switch_tenant(&self, tenant: &str) -> Result<(), SessionError> {
        self.gateway
            .credentials()
            .set_active_tenant(Some(tenant.to_string()));
        self.persist().await
    }

    /// Forgets the session, in memory and on disk.
    ///
    /// The in-memory store is cleared even if removing the persisted copy
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the persisted session could not be removed.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.gateway.credentials().sign_out();
        self.repository.clear().await?;
        tracing::info!("signed out");
        Ok(())
    }

    /// Loads the persisted session into the store.
    ///
    /// Returns true if a session with a token was found.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the persisted session exists but is unreadable.
    pub async fn restore(&self) -> Result<bool, SessionError> {
        let Some(credential) = self.repository.load().await? else {
            return Ok(false);
        };
        let authenticated = credential.is_authenticated();
        self.gateway.credentials().restore(credential);
        tracing::debug!(authenticated, "session restored");
        Ok(authenticated)
    }

    /// Saves the current credential, including tokens a refresh rotated in.
    ///
    /// A signed-out store removes the persisted copy instead.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the session could not be written.
    pub async fn persist(&self) -> Result<(), SessionError> {
        let credential = self.gateway.credentials().snapshot();
        if credential == Credential::default() {
            self.repository.clear().await?;
        } else {
            self.repository.save(&credential).await?;
        }
        Ok(())
    }
}
