// handlers/protected/users.rs - Account management for the current user

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::database::models::{UserFull, UserPatch, UserView};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::UserService;
use crate::state::AppState;

/// GET /api/users/:id
pub async fn user_get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<UserFull> {
    let user = UserService::new(state.pool).get_full(id).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/users/:id
pub async fn user_put(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(patch): Json<UserPatch>,
) -> ApiResult<UserView> {
    let user = UserService::new(state.pool).update(current.id(), id, patch).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/users/:id
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    UserService::new(state.pool).delete(current.id(), id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

/// POST /api/users/logout - revokes the stored refresh token
pub async fn logout_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Value> {
    UserService::new(state.pool).logout(current.id()).await?;
    tracing::info!("User {} logged out", current.0.username);
    Ok(ApiResponse::success(json!({ "logged_out": true })))
}
