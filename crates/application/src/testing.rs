//! In-memory backend used by the unit tests of this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lyceum_domain::{RequestSpec, ResponseSpec};
use parking_lot::Mutex;
use serde_json::json;

use crate::ports::{HttpClientError, HttpTransport};

/// What the fake refresh endpoint does when called.
#[derive(Debug, Clone)]
pub enum RefreshBehavior {
    /// Answers 200 with this token and makes it the valid one.
    Issue(String),
    /// Answers with this status.
    Reject(u16),
    /// Answers 200 without a token.
    Empty,
    /// Never answers.
    Unreachable,
}

/// A school API double: accepts exactly one bearer token at a time.
///
/// - `POST /auth/login`: password `secret` signs in to tenant `north`
/// - `POST /auth/refresh`: follows the configured [`RefreshBehavior`]
/// - `/offline`: transport failure
/// - `/always-401`: 401 regardless of the token
/// - `/broken`: 502 with an HTML page
/// - anything else: 200 with the valid token, 401 otherwise
pub struct FakeBackend {
    valid_token: Mutex<String>,
    refresh: Mutex<RefreshBehavior>,
    refresh_delay: Duration,
    refresh_calls: AtomicUsize,
    requests: Mutex<Vec<RequestSpec>>,
}

impl FakeBackend {
    pub fn new(valid_token: &str, refresh: RefreshBehavior) -> Self {
        Self {
            valid_token: Mutex::new(valid_token.to_string()),
            refresh: Mutex::new(refresh),
            refresh_delay: Duration::from_millis(50),
            refresh_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Invalidates every token handed out so far.
    pub fn rotate(&self, valid_token: &str) {
        *self.valid_token.lock() = valid_token.to_string();
    }

    pub fn set_refresh(&self, refresh: RefreshBehavior) {
        *self.refresh.lock() = refresh;
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Every request received, in arrival order.
    pub fn requests(&self) -> Vec<RequestSpec> {
        self.requests.lock().clone()
    }

    /// Requests received for one path.
    pub fn requests_to(&self, path: &str) -> Vec<RequestSpec> {
        self.requests()
            .into_iter()
            .filter(|r| route(r) == path)
            .collect()
    }

    async fn refresh(&self) -> Result<ResponseSpec, HttpClientError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.refresh_delay).await;

        let behavior = self.refresh.lock().clone();
        match behavior {
            RefreshBehavior::Issue(token) => {
                self.rotate(&token);
                Ok(ResponseSpec::json(200, &json!({ "access_token": token })))
            }
            RefreshBehavior::Reject(status) => Ok(ResponseSpec::json(
                status,
                &json!({ "detail": "Refresh token expired" }),
            )),
            RefreshBehavior::Empty => Ok(ResponseSpec::json(200, &json!({}))),
            RefreshBehavior::Unreachable => Err(HttpClientError::ConnectionFailed(
                "connection reset".to_string(),
            )),
        }
    }

    fn login(request: &RequestSpec) -> ResponseSpec {
        let password = request
            .body
            .as_ref()
            .and_then(|b| b.get("password"))
            .and_then(|p| p.as_str());
        if password == Some("secret") {
            ResponseSpec::json(
                200,
                &json!({ "access_token": "login-token", "tenant_id": "north" }),
            )
        } else {
            ResponseSpec::json(401, &json!({ "detail": "Invalid credentials" }))
        }
    }
}

/// Request path with a leading slash, however the caller wrote it.
fn route(request: &RequestSpec) -> String {
    format!("/{}", request.path().trim_start_matches('/'))
}

#[async_trait]
impl HttpTransport for FakeBackend {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        self.requests.lock().push(request.clone());
        tokio::task::yield_now().await;

        match route(request).as_str() {
            "/auth/refresh" => self.refresh().await,
            "/auth/login" => Ok(Self::login(request)),
            "/offline" => Err(HttpClientError::ConnectionRefused {
                host: "localhost".to_string(),
                port: 8000,
            }),
            "/always-401" => Ok(ResponseSpec::json(401, &json!({ "detail": "Nope" }))),
            "/broken" => Ok(ResponseSpec::text(
                502,
                "<html><body><h1>502 Bad Gateway</h1></body></html>",
            )),
            path => {
                let expected = format!("Bearer {}", self.valid_token.lock());
                if request.headers.get("Authorization") == Some(expected.as_str()) {
                    let message = format!("{} {path} done", request.method);
                    Ok(ResponseSpec::json(200, &json!({ "message": message })))
                } else {
                    Ok(ResponseSpec::json(401, &json!({ "detail": "Token expired" })))
                }
            }
        }
    }
}
