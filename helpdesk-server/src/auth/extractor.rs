//! CurrentUser extractor
//!
//! The [`authenticate`](super::authenticate) middleware validates the bearer
//! token and stores the caller in request extensions; protected handlers take
//! `CurrentUser` as an argument to require it.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use super::CurrentUser;

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<CurrentUser>() {
            Some(user) => Ok(user.clone()),
            None => {
                tracing::debug!(uri = %parts.uri, "Request without credential");
                Err(AppError::unauthorized())
            }
        }
    }
}
