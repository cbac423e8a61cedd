use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/pages/home_page
pub async fn home_page_get() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "redirect_url": "/", "status": 0 })))
}
