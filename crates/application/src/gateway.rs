//! Authenticated gateway to the school-management REST API.
//!
//! Every call follows the same path:
//!
//! 1. the interceptor attaches bearer and tenant headers
//! 2. the transport sends the call
//! 3. the outcome is classified:
//!    - 2xx: returned; mutating calls publish a success toast
//!    - 401 on a call not yet replayed: refresh (single-flight), then
//!      replay once with the new token
//!    - anything else: one error toast and a `GatewayError`
//!
//! Calls to the sign-in and refresh endpoints skip the 401 handling and
//! never publish toasts; the screens that make them report on their own.

use std::sync::Arc;

use lyceum_domain::{Notification, PendingRequest, RequestSpec, ResponseSpec, success_message};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::{CredentialStore, RefreshCoordinator, RequestInterceptor};
use crate::config::{AUTHORIZATION_HEADER, GatewayConfig};
use crate::error::{GatewayError, GatewayResult};
use crate::notify::NotificationSink;
use crate::ports::HttpTransport;

/// HTTP client whose calls resolve after authentication is handled.
///
/// Cheap to share behind an `Arc`; all state lives in the credential
/// store, the refresh coordinator and the notification sink.
pub struct ApiGateway<C: ?Sized> {
    transport: Arc<C>,
    store: CredentialStore,
    interceptor: RequestInterceptor,
    coordinator: RefreshCoordinator<C>,
    notifications: Arc<NotificationSink>,
    config: GatewayConfig,
}

impl<C> ApiGateway<C>
where
    C: HttpTransport + ?Sized + 'static,
{
    /// Creates a gateway over `transport`.
    #[must_use]
    pub fn new(
        transport: Arc<C>,
        store: CredentialStore,
        notifications: Arc<NotificationSink>,
        config: GatewayConfig,
    ) -> Self {
        let interceptor = RequestInterceptor::new(store.clone(), config.tenant_header.as_str());
        let coordinator = RefreshCoordinator::new(Arc::clone(&transport), store.clone(), &config);
        Self {
            transport,
            store,
            interceptor,
            coordinator,
            notifications,
            config,
        }
    }

    /// The credential store calls are authenticated from.
    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        &self.store
    }

    /// The sink toasts are published into.
    #[must_use]
    pub const fn notifications(&self) -> &Arc<NotificationSink> {
        &self.notifications
    }

    /// The refresh coordinator, for inspection.
    #[must_use]
    pub const fn coordinator(&self) -> &RefreshCoordinator<C> {
        &self.coordinator
    }

    /// The gateway configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Sends a call and returns its final outcome.
    ///
    /// An expired token is refreshed and the call replayed once; if that
    /// works the caller never sees the 401.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the request is malformed (nothing is sent)
    /// - `Transport` if no response arrived
    /// - `RefreshFailed` if the token expired and could not be refreshed
    /// - `Status` for any other non-2xx response, including a second 401
    pub async fn execute(&self, request: RequestSpec) -> GatewayResult<ResponseSpec> {
        if let Err(error) = request.validate() {
            tracing::warn!(request_id = %request.id, %error, "request rejected before dispatch");
            return Err(error.into());
        }

        let exempt = self.config.is_auth_endpoint(&request);
        let mut pending = PendingRequest::new(request);

        let outcome = match self.dispatch(&mut pending).await {
            Ok(response) if response.is_unauthorized() && !pending.retried() && !exempt => {
                self.refresh_and_replay(&mut pending).await
            }
            other => other,
        };

        self.settle(&pending, outcome, exempt)
    }

    /// Sends a call and decodes the 2xx body.
    ///
    /// # Errors
    ///
    /// Everything [`execute`](Self::execute) returns, plus `Decode` when
    /// the body does not match `T`.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: RequestSpec) -> GatewayResult<T> {
        let response = self.execute(request).await?;
        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// GET `url`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn get(&self, url: &str) -> GatewayResult<ResponseSpec> {
        self.execute(RequestSpec::get(url)).await
    }

    /// POST `body` to `url`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn post(&self, url: &str, body: Value) -> GatewayResult<ResponseSpec> {
        self.execute(RequestSpec::post(url).with_json(body)).await
    }

    /// PUT `body` to `url`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn put(&self, url: &str, body: Value) -> GatewayResult<ResponseSpec> {
        self.execute(RequestSpec::put(url).with_json(body)).await
    }

    /// PATCH `url` with `body`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn patch(&self, url: &str, body: Value) -> GatewayResult<ResponseSpec> {
        self.execute(RequestSpec::patch(url).with_json(body)).await
    }

    /// DELETE `url`.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn delete(&self, url: &str) -> GatewayResult<ResponseSpec> {
        self.execute(RequestSpec::delete(url)).await
    }

    async fn dispatch(&self, pending: &mut PendingRequest) -> GatewayResult<ResponseSpec> {
        self.interceptor.apply(&mut pending.spec);

        let spec = &pending.spec;
        tracing::debug!(
            request_id = %spec.id,
            method = %spec.method,
            url = %spec.url,
            retried = pending.retried(),
            "dispatching"
        );

        match self.transport.execute(spec).await {
            Ok(response) => {
                tracing::debug!(
                    request_id = %spec.id,
                    status = response.status,
                    elapsed_ms = u64::try_from(response.duration.as_millis()).unwrap_or(u64::MAX),
                    "response received"
                );
                Ok(response)
            }
            Err(source) => {
                tracing::warn!(request_id = %spec.id, error = %source, "no response");
                Err(GatewayError::transport(source))
            }
        }
    }

    async fn refresh_and_replay(&self, pending: &mut PendingRequest) -> GatewayResult<ResponseSpec> {
        tracing::debug!(request_id = %pending.spec.id, "401 received, waiting for refresh");

        let token = self
            .coordinator
            .refresh()
            .await
            .map_err(|source| GatewayError::RefreshFailed { source })?;

        pending.mark_retried();
        pending
            .spec
            .headers
            .set(AUTHORIZATION_HEADER, format!("Bearer {token}"));
        self.dispatch(pending).await
    }

    fn settle(
        &self,
        pending: &PendingRequest,
        outcome: GatewayResult<ResponseSpec>,
        exempt: bool,
    ) -> GatewayResult<ResponseSpec> {
        let error = match outcome {
            Ok(response) if response.is_success() => {
                if pending.spec.method.is_mutating() && !exempt {
                    let message = success_message(response.payload().as_ref());
                    self.notify(Notification::success(message));
                }
                return Ok(response);
            }
            Ok(response) if response.is_unauthorized() && !exempt => {
                tracing::warn!(request_id = %pending.spec.id, "401 after replay, signing out");
                self.store.sign_out();
                GatewayError::session_expired(response)
            }
            Ok(response) => GatewayError::status(response),
            Err(error) => error,
        };

        if !exempt {
            self.notify(Notification::error(error.user_message()));
        }
        Err(error)
    }

    fn notify(&self, notification: Notification) {
        self.notifications
            .publish(notification.with_auto_hide(self.config.toast_duration_ms));
    }
}
