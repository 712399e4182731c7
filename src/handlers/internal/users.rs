// handlers/internal/users.rs - /api/users

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use tracing::info;

use super::path_id;
use crate::database::models::{CreateUser, UserWithRoles};
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<UserWithRoles>> {
    Ok(ApiResponse::success(state.storage.users.list().await?))
}

/// GET /api/users/:id - includes role grants
pub async fn get_user(State(state): State<AppState>, id: Result<Path<i32>, PathRejection>) -> ApiResult<UserWithRoles> {
    let id = path_id(id)?;
    let user = state
        .storage
        .users
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;
    Ok(ApiResponse::success(user))
}

/// POST /api/users - admin only
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUser>, JsonRejection>,
) -> ApiResult<UserWithRoles> {
    let new = json_body(body)?.validate()?;
    let user = state.storage.users.create(new).await?;
    info!(user_id = user.user.id, roles = user.roles.len(), "Created user");
    Ok(ApiResponse::created(user))
}
