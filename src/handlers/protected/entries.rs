// handlers/protected/entries.rs - Entry CRUD, single and bulk

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{EntryPatch, EntryView, NewEntry};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::{BulkEntryUpdate, EntryService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BulkEntryIds {
    pub entry_ids: Vec<i32>,
}

/// POST /api/entries
pub async fn entries_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(new): Json<NewEntry>,
) -> ApiResult<EntryView> {
    let entry = EntryService::new(state.pool).create(current.id(), new).await?;
    Ok(ApiResponse::created(entry))
}

/// POST /api/entries/bulk
pub async fn bulk_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(new): Json<Vec<NewEntry>>,
) -> ApiResult<Vec<EntryView>> {
    let entries = EntryService::new(state.pool).create_many(current.id(), new).await?;
    Ok(ApiResponse::created(entries))
}

/// PUT /api/entries/bulk
pub async fn bulk_put(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(bulk): Json<BulkEntryUpdate>,
) -> ApiResult<Vec<EntryView>> {
    let entries = EntryService::new(state.pool).update_many(current.id(), bulk).await?;
    Ok(ApiResponse::success(entries))
}

/// DELETE /api/entries/bulk
pub async fn bulk_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<BulkEntryIds>,
) -> ApiResult<Value> {
    let deleted = EntryService::new(state.pool)
        .delete_many(current.id(), &body.entry_ids)
        .await?;
    Ok(ApiResponse::success(json!({ "deleted": deleted })))
}

/// GET /api/entries/:id
pub async fn entry_get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<EntryView> {
    let entry = EntryService::new(state.pool).get(id).await?;
    Ok(ApiResponse::success(entry))
}

/// PUT /api/entries/:id
pub async fn entry_put(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(patch): Json<EntryPatch>,
) -> ApiResult<EntryView> {
    let entry = EntryService::new(state.pool).update(current.id(), id, patch).await?;
    Ok(ApiResponse::success(entry))
}

/// DELETE /api/entries/:id
pub async fn entry_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    EntryService::new(state.pool).delete(current.id(), id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
