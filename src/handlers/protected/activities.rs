// handlers/protected/activities.rs - Activity CRUD and related-activity links

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{ActivityFull, ActivityPatch, ActivityView, NewActivity};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::ActivityService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<bool>,
}

/// GET /api/activities?status=
pub async fn activities_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<ActivityView>> {
    let activities = ActivityService::new(state.pool).list_own(current.id(), query.status).await?;
    Ok(ApiResponse::success(activities))
}

/// POST /api/activities
pub async fn activities_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(new): Json<NewActivity>,
) -> ApiResult<ActivityView> {
    let activity = ActivityService::new(state.pool).create(current.id(), new).await?;
    Ok(ApiResponse::created(activity))
}

/// GET /api/activities/:id
pub async fn activity_get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<ActivityFull> {
    let activity = ActivityService::new(state.pool).get_full(id).await?;
    Ok(ApiResponse::success(activity))
}

/// PUT /api/activities/:id
pub async fn activity_put(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(patch): Json<ActivityPatch>,
) -> ApiResult<ActivityView> {
    let activity = ActivityService::new(state.pool).update(current.id(), id, patch).await?;
    Ok(ApiResponse::success(activity))
}

/// DELETE /api/activities/:id
pub async fn activity_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    ActivityService::new(state.pool).delete(current.id(), id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

/// POST /api/activities/:id/related/:related_id
pub async fn related_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((id, related_id)): Path<(i32, i32)>,
) -> ApiResult<ActivityFull> {
    let activity = ActivityService::new(state.pool).link(current.id(), id, related_id).await?;
    Ok(ApiResponse::success(activity))
}

/// DELETE /api/activities/:id/related/:related_id
pub async fn related_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((id, related_id)): Path<(i32, i32)>,
) -> ApiResult<ActivityFull> {
    let activity = ActivityService::new(state.pool).unlink(current.id(), id, related_id).await?;
    Ok(ApiResponse::success(activity))
}
