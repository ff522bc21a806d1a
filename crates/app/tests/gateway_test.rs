//! End-to-end tests: the reqwest transport and the gateway against a local
//! HTTP server that behaves like the school API.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{delete, get, post};
use futures::future::join_all;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

use lyceum_application::{
    ApiGateway, CredentialStore, GatewayConfig, GatewayError, NotificationHandler,
    NotificationSink, SessionError, SessionRepository, SessionService,
};
use lyceum_domain::{Notification, RequestSpec, Severity, UNEXPECTED_RESPONSE_MESSAGE};
use lyceum_infrastructure::{FileSessionRepository, ReqwestHttpClient};

const REFRESH_COOKIE: &str = "refresh_token=r1";

struct ServerState {
    valid_token: Mutex<String>,
    refresh_calls: AtomicUsize,
    seen_tenants: Mutex<Vec<Option<String>>>,
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn authorized(state: &ServerState, headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", state.valid_token.lock().unwrap());
    header(headers, AUTHORIZATION.as_str()).as_deref() == Some(expected.as_str())
}

fn expired() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Token expired" })),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != "secret" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid credentials" })),
        )
            .into_response();
    }
    let tenant = body
        .get("tenant_id")
        .cloned()
        .unwrap_or_else(|| json!("north"));
    (
        [(SET_COOKIE, format!("{REFRESH_COOKIE}; Path=/; HttpOnly"))],
        Json(json!({ "access_token": "login-token", "tenant_id": tenant })),
    )
        .into_response()
}

async fn refresh(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let has_cookie =
        header(&headers, COOKIE.as_str()).is_some_and(|c| c.contains(REFRESH_COOKIE));
    if !has_cookie {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Refresh token missing" })),
        )
            .into_response();
    }

    *state.valid_token.lock().unwrap() = "fresh".to_string();
    Json(json!({ "access_token": "fresh" })).into_response()
}

async fn list_students(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    let tenant = header(&headers, "x-tenant-id");
    state.seen_tenants.lock().unwrap().push(tenant.clone());
    if !authorized(&state, &headers) {
        return expired();
    }
    Json(json!({ "tenant": tenant, "students": ["Ada", "Grace"] })).into_response()
}

async fn create_student(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return expired();
    }
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": [{ "loc": ["body", "name"], "msg": "field required" }] })),
    )
        .into_response()
}

async fn remove_student(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return expired();
    }
    Json(json!({ "message": "Student removed" })).into_response()
}

async fn broken() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Html("<html><body><h1>502 Bad Gateway</h1></body></html>"),
    )
        .into_response()
}

struct TestServer {
    base_url: String,
    state: Arc<ServerState>,
}

impl TestServer {
    async fn spawn() -> Self {
        let state = Arc::new(ServerState {
            valid_token: Mutex::new("login-token".to_string()),
            refresh_calls: AtomicUsize::new(0),
            seen_tenants: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/refresh", post(refresh))
            .route("/api/v1/students", get(list_students).post(create_student))
            .route("/api/v1/students/{id}", delete(remove_student))
            .route("/api/v1/broken", get(broken))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api/v1"),
            state,
        }
    }

    fn expire_tokens(&self) {
        *self.state.valid_token.lock().unwrap() = "revoked".to_string();
    }

    fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }
}

struct Console {
    session: SessionService<ReqwestHttpClient>,
    gateway: Arc<ApiGateway<ReqwestHttpClient>>,
    repository: Arc<FileSessionRepository>,
    toasts: Arc<Mutex<Vec<Notification>>>,
    _dir: TempDir,
}

fn console(server: &TestServer) -> Console {
    let config = GatewayConfig {
        base_url: server.base_url.clone(),
        timeout_ms: 5_000,
        ..GatewayConfig::default()
    };
    let transport = Arc::new(ReqwestHttpClient::new(&config).unwrap());

    let toasts = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::new(NotificationSink::new());
    let recorded = Arc::clone(&toasts);
    let handler: NotificationHandler = Arc::new(move |n: Notification| {
        recorded.lock().unwrap().push(n);
    });
    sink.register(handler);

    let gateway = Arc::new(ApiGateway::new(
        transport,
        CredentialStore::new(),
        sink,
        config,
    ));

    let dir = tempfile::tempdir().unwrap();
    let repository = Arc::new(FileSessionRepository::new(dir.path().join("session.json")));
    let session = SessionService::new(Arc::clone(&gateway), repository.clone());

    Console {
        session,
        gateway,
        repository,
        toasts,
        _dir: dir,
    }
}

impl Console {
    fn toasts(&self) -> Vec<(Severity, String)> {
        self.toasts
            .lock()
            .unwrap()
            .iter()
            .map(|n| (n.severity, n.message.clone()))
            .collect()
    }
}

#[tokio::test]
async fn test_sign_in_persists_session() {
    let server = TestServer::spawn().await;
    let console = console(&server);

    let credential = console.session.sign_in("ada", "secret", None).await.unwrap();

    assert_eq!(credential.access_token.as_deref(), Some("login-token"));
    assert_eq!(credential.active_tenant_id.as_deref(), Some("north"));
    assert_eq!(console.repository.load().await.unwrap(), Some(credential));
    assert!(console.toasts().is_empty());
}

#[tokio::test]
async fn test_bad_credentials() {
    let server = TestServer::spawn().await;
    let console = console(&server);

    let error = console
        .session
        .sign_in("ada", "wrong", None)
        .await
        .unwrap_err();

    match error {
        SessionError::Gateway(e) => {
            assert_eq!(e.status_code(), Some(401));
            assert_eq!(e.user_message(), "Invalid credentials");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(server.refresh_calls(), 0);
    assert!(console.toasts().is_empty());
}

#[tokio::test]
async fn test_concurrent_expiry_refreshes_once_over_http() {
    let server = TestServer::spawn().await;
    let console = console(&server);
    console.session.sign_in("ada", "secret", None).await.unwrap();
    server.expire_tokens();

    let results = join_all((0..4).map(|_| console.gateway.get("/students"))).await;

    for result in results {
        let body: Value = serde_json::from_str(&result.unwrap().body).unwrap();
        assert_eq!(body["tenant"], "north");
    }
    assert_eq!(server.refresh_calls(), 1);
    assert_eq!(
        console.gateway.credentials().access_token().as_deref(),
        Some("fresh")
    );

    console.session.persist().await.unwrap();
    let stored = console.repository.load().await.unwrap().unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_refresh_without_cookie_signs_out() {
    let server = TestServer::spawn().await;
    let console = console(&server);
    console
        .gateway
        .credentials()
        .sign_in("stale", Some("north".to_string()));

    let error = console.gateway.get("/students").await.unwrap_err();

    assert!(matches!(error, GatewayError::RefreshFailed { .. }));
    assert!(!console.gateway.credentials().is_authenticated());
    assert_eq!(console.gateway.credentials().active_tenant(), None);
    assert_eq!(server.refresh_calls(), 1);
    assert_eq!(
        console.toasts(),
        vec![(
            Severity::Error,
            "Your session has expired. Please sign in again.".to_string()
        )]
    );
}

#[tokio::test]
async fn test_explicit_tenant_header_wins() {
    let server = TestServer::spawn().await;
    let console = console(&server);
    console.session.sign_in("ada", "secret", None).await.unwrap();

    console
        .gateway
        .execute(RequestSpec::get("/students").with_header("X-Tenant-ID", "south"))
        .await
        .unwrap();
    console.gateway.get("/students").await.unwrap();

    assert_eq!(
        *server.state.seen_tenants.lock().unwrap(),
        vec![Some("south".to_string()), Some("north".to_string())]
    );
}

#[tokio::test]
async fn test_validation_errors_are_summarized() {
    let server = TestServer::spawn().await;
    let console = console(&server);
    console.session.sign_in("ada", "secret", None).await.unwrap();

    let error = console
        .gateway
        .post("/students", json!({ "grade": 10 }))
        .await
        .unwrap_err();

    assert_eq!(error.status_code(), Some(422));
    assert_eq!(
        console.toasts(),
        vec![(
            Severity::Error,
            "Some fields are invalid: name: field required".to_string()
        )]
    );
}

#[tokio::test]
async fn test_delete_reports_server_message() {
    let server = TestServer::spawn().await;
    let console = console(&server);
    console.session.sign_in("ada", "secret", None).await.unwrap();

    console.gateway.delete("/students/7").await.unwrap();

    assert_eq!(
        console.toasts(),
        vec![(Severity::Success, "Student removed".to_string())]
    );
}

#[tokio::test]
async fn test_html_error_page_is_not_shown() {
    let server = TestServer::spawn().await;
    let console = console(&server);

    let error = console.gateway.get("/broken").await.unwrap_err();

    assert_eq!(error.status_code(), Some(502));
    assert_eq!(error.user_message(), UNEXPECTED_RESPONSE_MESSAGE);
}
