//! Shared fixtures for integration tests: a throwaway SQLite database,
//! seeded users and request helpers.
#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use shared::models::Role;
use tempfile::TempDir;
use tower::ServiceExt;

use helpdesk_server::db::{self, DbService};
use helpdesk_server::util::{hash_password, new_id};
use helpdesk_server::{AppState, Config, TicketStore, create_router};

pub const T0: i64 = 1_700_000_000_000;
pub const HOUR_MS: i64 = 60 * 60 * 1000;
pub const PASSWORD: &str = "correct horse battery";

/// Test database; the directory is removed on drop
pub struct TestDb {
    pub state: AppState,
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("helpdesk.db");
        let mut config = Config::for_database(path.to_string_lossy().to_string());
        adjust(&mut config);

        let db = DbService::new(&config.database_path).await.unwrap();
        Self {
            state: AppState::with_pool(db.pool, &config),
            _dir: dir,
        }
    }

    pub fn store(&self) -> &TicketStore {
        &self.state.tickets
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Insert a user and return its id
    pub async fn user(&self, email: &str, full_name: &str, role: Role) -> String {
        let id = new_id();
        let hash = hash_password(PASSWORD).unwrap();
        db::users::create(&self.state.pool, &id, email, full_name, role, &hash, T0)
            .await
            .unwrap();
        id
    }

    /// Bearer token for a seeded user
    pub fn token(&self, user_id: &str, role: Role) -> String {
        self.state.jwt.generate_token(user_id, role).unwrap()
    }
}

/// Response status, headers and raw body
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap()
    }

    pub fn error_code(&self) -> String {
        self.json()["error"]["code"].as_str().unwrap().to_string()
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    TestResponse {
        status,
        headers,
        bytes,
    }
}

/// Build a request with an optional bearer token and JSON body
pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
