//! Authentication Handlers
//!
//! Registration, login and the current-user profile

use axum::extract::State;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{PublicUser, Role, user::normalize_email};
use validator::Validate;

use crate::api::{ApiResult, CreatedResult, ValidatedJson, created, ok};
use crate::auth::CurrentUser;
use crate::db::{self, is_unique_violation};
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::{hash_password, new_id, now_millis, verify_password};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "Full name must be at least 2 characters"))]
    pub full_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token plus the profile it was issued for
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: PublicUser,
}

fn email_taken() -> AppError {
    AppError::new(ErrorCode::EmailTaken).with_field("email")
}

fn issue_token(state: &AppState, user: &PublicUser) -> Result<String, AppError> {
    state
        .jwt
        .generate_token(&user.id, user.role)
        .map_err(|e| AppError::internal(format!("Failed to issue token: {e}")))
}

/// Register a requester account
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> CreatedResult<AuthResponse> {
    let email = normalize_email(&req.email);

    if db::users::find_by_email(&state.pool, &email)
        .await
        .map_err(ServiceError::from)?
        .is_some()
    {
        return Err(email_taken());
    }

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

    let row = db::users::create(
        &state.pool,
        &new_id(),
        &email,
        req.full_name.trim(),
        Role::Requester,
        &password_hash,
        now_millis(),
    )
    .await
    .map_err(|e| {
        // lost a race against a concurrent registration
        if is_unique_violation(&e) {
            email_taken()
        } else {
            ServiceError::from(e).into()
        }
    })?;

    let user = PublicUser::from(row);
    let token = issue_token(&state, &user)?;
    tracing::info!(user_id = %user.id, email = %user.email, "User registered");

    Ok(created(AuthResponse { token, user }))
}

/// Exchange email and password for a token
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let email = normalize_email(&req.email);

    let row = db::users::find_by_email(&state.pool, &email)
        .await
        .map_err(ServiceError::from)?;

    // Same error for unknown email and wrong password
    let row = match row {
        Some(row) if verify_password(&req.password, &row.password_hash) => row,
        _ => {
            tracing::warn!(email = %email, "Login failed - invalid credentials");
            return Err(AppError::new(ErrorCode::InvalidCredentials));
        }
    };

    let user = PublicUser::from(row);
    let token = issue_token(&state, &user)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(ok(AuthResponse { token, user }))
}

/// Profile of the authenticated caller
pub async fn me(State(state): State<AppState>, current: CurrentUser) -> ApiResult<MeResponse> {
    let row = db::users::find_by_id(&state.pool, &current.id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(ok(MeResponse {
        user: PublicUser::from(row),
    }))
}
