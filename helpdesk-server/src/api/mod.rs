//! HTTP API
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | GET | /api/health | none |
//! | GET | /api/_meta | none |
//! | POST | /api/auth/register | none |
//! | POST | /api/auth/login | none |
//! | GET | /api/auth/me | bearer |
//! | GET, POST | /api/tickets | bearer |
//! | GET | /api/tickets/support-team | staff |
//! | GET, PATCH | /api/tickets/{id} | bearer + ticket access |
//! | POST | /api/tickets/{id}/comments | bearer + ticket access |
//! | PUT | /api/admin/users/{id}/role | admin |

pub mod admin;
pub mod auth;
pub mod extract;
pub mod health;
pub mod tickets;

use axum::extract::DefaultBodyLimit;
use axum::{Json, Router, middleware};
use http::{HeaderName, HeaderValue, StatusCode};
use shared::error::{ApiResponse, AppError, ErrorCode};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::{authenticate, rate_limit};
use crate::idempotency::idempotency;
use crate::state::AppState;

pub use extract::ValidatedJson;

/// Handler result wrapped in the `{"data": ...}` envelope
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Like [`ApiResult`], answering `201 Created`
pub type CreatedResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

pub(crate) fn ok<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

pub(crate) fn created<T>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

const MAX_BODY_BYTES: usize = 1024 * 1024;
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Register every route (no middleware, no state)
pub fn build_router() -> Router<AppState> {
    Router::new()
        // Public
        .merge(health::router())
        .merge(auth::router())
        // Bearer token required
        .merge(tickets::router())
        // Admin only
        .merge(admin::router())
        .fallback(not_found)
}

/// Build the full application with middleware and state
///
/// Request path: request id, trace, authenticate, rate limit, idempotency, handler.
pub fn create_router(state: AppState) -> Router {
    build_router()
        // ========== Application Middleware ==========
        .layer(middleware::from_fn_with_state(state.clone(), idempotency))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        // Optional bearer auth, injects CurrentUser
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        // ========== Tower HTTP Middleware ==========
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::new(ErrorCode::NotFound)
}
