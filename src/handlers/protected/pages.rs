use axum::Extension;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// GET /api/pages/Profile
pub async fn profile_get() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "redirect_url": "/profile" })))
}

/// GET /api/pages/get_username
pub async fn username_get(Extension(current): Extension<CurrentUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "userName": current.0.username })))
}
