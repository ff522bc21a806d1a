//! Single-flight access-token refresh.
//!
//! When several calls fail with 401 at about the same time, only the first
//! one issues a refresh call. The others subscribe to the same outcome.
//!
//! The coordinator is a two-state machine:
//!
//! ```text
//!            first eligible 401
//!   Idle ───────────────────────────▶ InFlight(ticket)
//!    ▲                                   │  later 401s join the ticket
//!    └───────────────────────────────────┘
//!        refresh settles (ok or err); store updated first
//! ```
//!
//! The transition back to `Idle` happens inside the ticket itself, after
//! the credential store is updated and before any waiter sees the result,
//! so the next 401 after that point always starts a fresh attempt.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{BoxFuture, FutureExt, Shared};
use lyceum_domain::{RequestSpec, error_message};
use parking_lot::Mutex;
use serde_json::Value;

use super::CredentialStore;
use crate::config::GatewayConfig;
use crate::error::RefreshError;
use crate::ports::HttpTransport;

/// New access token, or why none could be obtained.
pub type RefreshOutcome = Result<String, RefreshError>;

type RefreshTicket = Shared<BoxFuture<'static, RefreshOutcome>>;

enum RefreshState {
    Idle,
    InFlight(RefreshTicket),
}

/// Collapses concurrent token refreshes into one network call.
///
/// On success the new token is written to the credential store. On any
/// failure the store is cleared: a session that cannot be refreshed is
/// treated as no session.
pub struct RefreshCoordinator<C: ?Sized> {
    transport: Arc<C>,
    store: CredentialStore,
    refresh_path: String,
    token_field: String,
    state: Arc<Mutex<RefreshState>>,
    issued: Arc<AtomicU64>,
}

impl<C> RefreshCoordinator<C>
where
    C: HttpTransport + ?Sized + 'static,
{
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new(transport: Arc<C>, store: CredentialStore, config: &GatewayConfig) -> Self {
        Self {
            transport,
            store,
            refresh_path: config.refresh_path.clone(),
            token_field: config.token_field.clone(),
            state: Arc::new(Mutex::new(RefreshState::Idle)),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Waits for a fresh access token.
    ///
    /// Starts a refresh if none is in flight, otherwise joins the one that
    /// is. Every caller waiting on the same attempt gets the same outcome.
    ///
    /// # Errors
    ///
    /// Returns the refresh error if the attempt failed; the credential
    /// store has been cleared by then.
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = {
            let mut state = self.state.lock();
            if let RefreshState::InFlight(ticket) = &*state {
                tracing::debug!("joining token refresh already in flight");
                ticket.clone()
            } else {
                let ticket = self.issue();
                *state = RefreshState::InFlight(ticket.clone());
                ticket
            }
        };
        ticket.await
    }

    /// Returns true while a refresh call is outstanding.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock(), RefreshState::InFlight(_))
    }

    /// Number of refresh calls issued since creation.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    fn issue(&self) -> RefreshTicket {
        let attempt = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(attempt, "access token rejected, refreshing");

        let transport = Arc::clone(&self.transport);
        let store = self.store.clone();
        let state = Arc::clone(&self.state);
        let request = RequestSpec::post(self.refresh_path.as_str());
        let token_field = self.token_field.clone();

        async move {
            let outcome = request_token(transport.as_ref(), &request, &token_field).await;
            match &outcome {
                Ok(token) => {
                    store.set_access_token(token.as_str());
                    tracing::info!(attempt, "access token refreshed");
                }
                Err(error) => {
                    tracing::warn!(attempt, %error, "token refresh failed, signing out");
                    store.sign_out();
                }
            }
            *state.lock() = RefreshState::Idle;
            outcome
        }
        .boxed()
        .shared()
    }
}

async fn request_token<C>(transport: &C, request: &RequestSpec, token_field: &str) -> RefreshOutcome
where
    C: HttpTransport + ?Sized,
{
    let response = transport.execute(request).await?;
    let payload = response.payload();

    if !response.is_success() {
        return Err(RefreshError::Rejected {
            status: response.status,
            message: error_message(Some(response.status), payload.as_ref()),
        });
    }

    payload
        .as_ref()
        .and_then(|body| body.get(token_field))
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| RefreshError::MissingToken(token_field.to_string()))
}
