//! User administration routes (admin only)

mod handler;

use axum::{Router, routing::put};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/users/{id}/role", put(handler::update_role))
}
