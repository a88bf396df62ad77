//! Ticket Routes
//!
//! All routes require a bearer token; per-ticket routes additionally pass
//! the access policy.

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tickets", get(handler::list).post(handler::create))
        .route("/api/tickets/support-team", get(handler::support_team))
        .route("/api/tickets/{id}", get(handler::get).patch(handler::update))
        .route("/api/tickets/{id}/comments", post(handler::add_comment))
}
