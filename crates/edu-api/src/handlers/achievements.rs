//! Achievement handlers

use axum::{extract::State, Json};
use edu_service::dto::{AchievementsResponse, LeaderboardEntry};
use edu_service::AchievementService;

use crate::extractors::{AuthUser, Pagination};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /achievements
pub async fn list_achievements(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<AchievementsResponse>> {
    let service = AchievementService::new(state.service_context());
    Ok(Json(service.list_for_user(auth.user_id).await?))
}

/// GET /achievements/leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    let service = AchievementService::new(state.service_context());
    Ok(Json(service.leaderboard(pagination.limit).await?))
}
