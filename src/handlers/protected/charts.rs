use axum::{extract::State, Json};
use serde::Deserialize;

use crate::chart::{Dataset, DateLabel};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{ChartService, ChartView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChartRequest {
    pub id: i32,
    /// `true` charts the activity together with its related activities
    #[serde(rename = "StatusView")]
    pub status_view: bool,
    /// Label the axis `YYYY-MM-DD` instead of `MM-DD`
    #[serde(default)]
    pub full_dates: bool,
}

/// POST /api/charts/data_for_chart
pub async fn data_for_chart_post(State(state): State<AppState>, Json(request): Json<ChartRequest>) -> ApiResult<Dataset> {
    let label = if request.full_dates { DateLabel::Iso } else { DateLabel::MonthDay };
    let dataset = ChartService::from_pool(state.pool)
        .with_max_days(state.config.api.chart_max_days)
        .dataset(request.id, ChartView::from_status_view(request.status_view), label)
        .await?;
    Ok(ApiResponse::success(dataset))
}
