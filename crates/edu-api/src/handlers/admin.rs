//! Admin handlers
//!
//! The services re-check the caller's role on every call, so these only
//! require authentication.

use axum::{extract::State, Json};
use edu_service::dto::{
    BackupResponse, DashboardResponse, PaginatedResponse, ProfileResponse, UpdateRoleRequest,
};
use edu_service::AdminService;

use crate::extractors::{AuthUser, IdPath, Pagination};
use crate::response::{Accepted, ApiResult, NoContent};
use crate::state::AppState;

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    pagination: Pagination,
) -> ApiResult<Json<PaginatedResponse<ProfileResponse>>> {
    let service = AdminService::new(state.service_context());
    Ok(Json(service.list_users(auth.user_id, pagination.into()).await?))
}

/// PATCH /admin/users/{user_id}/role
pub async fn set_role(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath,
    Json(request): Json<UpdateRoleRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let service = AdminService::new(state.service_context());
    Ok(Json(service.set_role(auth.user_id, user_id, request).await?))
}

/// DELETE /admin/users/{user_id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath,
) -> ApiResult<NoContent> {
    let service = AdminService::new(state.service_context());
    service.delete_user(auth.user_id, user_id).await?;
    Ok(NoContent)
}

/// GET /admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<DashboardResponse>> {
    let service = AdminService::new(state.service_context());
    Ok(Json(service.dashboard(auth.user_id).await?))
}

/// POST /admin/backup
pub async fn start_backup(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Accepted<Json<BackupResponse>>> {
    let service = AdminService::new(state.service_context());
    Ok(Accepted(Json(service.start_backup(auth.user_id).await?)))
}
