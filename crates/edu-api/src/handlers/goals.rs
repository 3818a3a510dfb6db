//! Learning goal handlers

use axum::{extract::State, Json};
use edu_service::dto::{CreateGoalRequest, GoalResponse, UpdateGoalRequest};
use edu_service::GoalService;

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// POST /goals
pub async fn create_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateGoalRequest>,
) -> ApiResult<Created<Json<GoalResponse>>> {
    let service = GoalService::new(state.service_context());
    Ok(Created(Json(service.create(auth.user_id, request).await?)))
}

/// GET /goals
pub async fn list_goals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<GoalResponse>>> {
    let service = GoalService::new(state.service_context());
    Ok(Json(service.list(auth.user_id).await?))
}

/// PATCH /goals/{id}
pub async fn update_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(goal_id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateGoalRequest>,
) -> ApiResult<Json<GoalResponse>> {
    let service = GoalService::new(state.service_context());
    Ok(Json(service.update(auth.user_id, goal_id, request).await?))
}

/// DELETE /goals/{id}
pub async fn delete_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(goal_id): IdPath,
) -> ApiResult<NoContent> {
    let service = GoalService::new(state.service_context());
    service.delete(auth.user_id, goal_id).await?;
    Ok(NoContent)
}
