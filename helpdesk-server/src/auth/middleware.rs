//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};

use super::{CurrentUser, JwtService};
use crate::state::AppState;

/// Optional bearer authentication
///
/// No `Authorization` header: the request continues anonymously and
/// protected handlers reject it through the [`CurrentUser`] extractor.
/// A header that is not `Bearer <token>` fails with `INVALID_AUTH`; a token
/// that does not verify fails with `INVALID_TOKEN`. On success the caller is
/// inserted into request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(header) = req.headers().get(http::header::AUTHORIZATION) else {
        return Ok(next.run(req).await);
    };

    let token = header
        .to_str()
        .ok()
        .and_then(JwtService::extract_from_header)
        .ok_or_else(|| AppError::new(ErrorCode::InvalidAuth))?;

    let claims = state.jwt.validate_token(token).map_err(|e| {
        tracing::warn!(error = %e, uri = %req.uri(), "Token validation failed");
        AppError::invalid_token()
    })?;

    let user = CurrentUser::try_from(claims).map_err(|e| {
        tracing::warn!(error = %e, "Malformed token claims");
        AppError::invalid_token()
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
