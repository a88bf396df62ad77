//! User administration handlers

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{PublicUser, Role};
use validator::Validate;

use crate::api::{ApiResult, ValidatedJson, ok};
use crate::auth::CurrentUser;
use crate::auth::policy::require_admin;
use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::util::now_millis;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

/// Change a user's role
pub async fn update_role(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateRoleRequest>,
) -> ApiResult<UserResponse> {
    require_admin(current.role)?;

    let row = db::users::update_role(&state.pool, &id, req.role, now_millis())
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    tracing::info!(
        admin_id = %current.id,
        user_id = %row.id,
        role = %row.role,
        "User role changed"
    );

    Ok(ok(UserResponse {
        user: PublicUser::from(row),
    }))
}
