//! Public platform statistics

use axum::{extract::State, Json};
use edu_service::dto::StatsResponse;
use edu_service::StatsService;

use crate::response::ApiResult;
use crate::state::AppState;

/// GET /stats
pub async fn platform_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let service = StatsService::new(state.service_context());
    Ok(Json(service.platform().await?))
}
