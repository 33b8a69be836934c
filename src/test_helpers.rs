//! In-process stub of the LinkVault backend for tests.
//!
//! Mirrors the real server's bodies: failures as `{"error": ...}`, an
//! HTTP-only `token` cookie on register/login, `201` on register.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::net::auth::AuthClient;
use crate::net::gateway::{Gateway, SESSION_COOKIE};
use crate::net::types::User;
use crate::state::nav::{Navigator, Route};

pub(crate) const STUB_PASSWORD: &str = "correct-horse";

/// Serve `router` on an ephemeral local port and return its origin.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Origin of a port nothing listens on.
pub(crate) fn unreachable_origin() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub(crate) fn gateway_for(origin: &str) -> Gateway {
    Gateway::new(&ClientConfig::new(origin, None).unwrap()).unwrap()
}

pub(crate) fn auth_client_for(origin: &str) -> AuthClient {
    AuthClient::new(gateway_for(origin))
}

// =============================================================================
// RECORDING NAVIGATOR
// =============================================================================

#[derive(Clone, Default)]
pub(crate) struct RecordingNavigator {
    routes: Arc<Mutex<Vec<Route>>>,
}

impl RecordingNavigator {
    pub(crate) fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

// =============================================================================
// STUB BACKEND
// =============================================================================

#[derive(Default)]
struct StubState {
    users: HashMap<String, (User, String)>,
    sessions: HashMap<String, String>,
    login_delay: Option<Duration>,
    me_delay: Option<Duration>,
    me_failure: Option<StatusCode>,
    logout_failure: Option<StatusCode>,
}

#[derive(Clone, Default)]
pub(crate) struct StubBackend {
    state: Arc<Mutex<StubState>>,
}

impl StubBackend {
    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap()
    }

    /// Insert an account directly and return it.
    pub(crate) fn seed_user(&self, email: &str, name: Option<&str>) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_owned(),
            name: name.map(str::to_owned),
            plan: "free".to_owned(),
            avatar_url: None,
            email_verified: Some(false),
        };
        self.lock().users.insert(email.to_owned(), (user.clone(), STUB_PASSWORD.to_owned()));
        user
    }

    /// Open a server-side session for `email` and return its token.
    pub(crate) fn open_session(&self, email: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.lock().sessions.insert(token.clone(), email.to_owned());
        token
    }

    pub(crate) fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    pub(crate) fn set_login_delay(&self, delay: Duration) {
        self.lock().login_delay = Some(delay);
    }

    pub(crate) fn set_me_delay(&self, delay: Duration) {
        self.lock().me_delay = Some(delay);
    }

    /// Make `/api/me` answer `status` with a plain-text body.
    pub(crate) fn fail_me_with(&self, status: StatusCode) {
        self.lock().me_failure = Some(status);
    }

    /// Make `/api/auth/logout` answer `status` with a JSON error body.
    pub(crate) fn fail_logout_with(&self, status: StatusCode) {
        self.lock().logout_failure = Some(status);
    }

    pub(crate) fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/api/auth/register", post(register))
            .route("/api/auth/login", post(login))
            .route("/api/auth/logout", post(logout))
            .route("/api/me", get(me))
            .with_state(self.clone())
    }

    /// Serve this backend and return its origin.
    pub(crate) async fn spawn(&self) -> String {
        serve(self.router()).await
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token)).path("/").http_only(true).build()
}

fn auth_body(message: &str, user: &User) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": message, "user": user }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "linkvault-api", "timestamp": 1_760_600_000 }))
}

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
    password: String,
    name: Option<String>,
}

async fn register(State(stub): State<StubBackend>, jar: CookieJar, Json(body): Json<RegisterBody>) -> Response {
    if body.password.len() < 8 {
        return error_body(StatusCode::BAD_REQUEST, "password must be at least 8 characters");
    }
    if stub.lock().users.contains_key(&body.email) {
        return error_body(StatusCode::BAD_REQUEST, "user with this email already exists");
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: body.email.clone(),
        name: body.name,
        plan: "free".to_owned(),
        avatar_url: None,
        email_verified: None,
    };
    stub.lock().users.insert(body.email.clone(), (user.clone(), body.password));
    let token = stub.open_session(&body.email);

    (StatusCode::CREATED, jar.add(session_cookie(token)), auth_body("User registered successfully", &user)).into_response()
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(stub): State<StubBackend>, jar: CookieJar, Json(body): Json<LoginBody>) -> Response {
    let delay = stub.lock().login_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let user = match stub.lock().users.get(&body.email) {
        Some((user, password)) if *password == body.password => user.clone(),
        _ => return error_body(StatusCode::UNAUTHORIZED, "invalid email or password"),
    };
    let token = stub.open_session(&body.email);

    (StatusCode::OK, jar.add(session_cookie(token)), auth_body("Logged in successfully", &user)).into_response()
}

async fn logout(State(stub): State<StubBackend>, jar: CookieJar) -> Response {
    let failure = stub.lock().logout_failure;
    if let Some(status) = failure {
        return error_body(status, "logout failed");
    }

    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        stub.lock().sessions.remove(cookie.value());
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (StatusCode::OK, jar, Json(serde_json::json!({ "message": "Logged out successfully" }))).into_response()
}

async fn me(State(stub): State<StubBackend>, jar: CookieJar) -> Response {
    let delay = stub.lock().me_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let failure = stub.lock().me_failure;
    if let Some(status) = failure {
        return (status, "upstream unavailable").into_response();
    }

    let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
        return error_body(StatusCode::UNAUTHORIZED, "Authorization required");
    };
    let state = stub.lock();
    let user = state
        .sessions
        .get(&token)
        .and_then(|email| state.users.get(email))
        .map(|(user, _)| user.clone());
    drop(state);

    match user {
        Some(user) => Json(serde_json::json!({ "user": user })).into_response(),
        None => error_body(StatusCode::UNAUTHORIZED, "Invalid or expired token"),
    }
}
