//! Authentication Routes

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::state::AppState;

/// Build authentication router
/// - /api/auth/register, /api/auth/login: public
/// - /api/auth/me: requires a bearer token (checked by the `CurrentUser` extractor)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(handler::register))
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/me", get(handler::me))
}
