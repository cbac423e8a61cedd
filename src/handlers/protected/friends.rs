use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::{json, Value};

use crate::database::models::UserView;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::UserService;
use crate::state::AppState;

/// GET /api/friends
pub async fn friends_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<UserView>> {
    let friends = UserService::new(state.pool).friends(current.id()).await?;
    Ok(ApiResponse::success(friends))
}

/// POST /api/friends/:friend_id
pub async fn friend_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(friend_id): Path<i32>,
) -> ApiResult<UserView> {
    let friend = UserService::new(state.pool).add_friend(current.id(), friend_id).await?;
    Ok(ApiResponse::created(friend))
}

/// DELETE /api/friends/:friend_id
pub async fn friend_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(friend_id): Path<i32>,
) -> ApiResult<Value> {
    UserService::new(state.pool).remove_friend(current.id(), friend_id).await?;
    Ok(ApiResponse::success(json!({ "friend_id": friend_id, "deleted": true })))
}
