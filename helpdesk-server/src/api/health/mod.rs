//! Liveness and service metadata

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/_meta", get(meta))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    /// Seconds since start
    uptime: f64,
}

#[derive(Serialize)]
pub struct MetaResponse {
    service: &'static str,
    version: &'static str,
    /// Milliseconds since start
    uptime: u128,
    environment: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

async fn meta(State(state): State<AppState>) -> Json<MetaResponse> {
    Json(MetaResponse {
        service: "helpdesk-server",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_millis(),
        environment: state.config.environment.clone(),
    })
}
