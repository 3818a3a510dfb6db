//! CMS handlers
//!
//! Reads are public; writes are admin only.

use axum::{
    extract::{Query, State},
    Json,
};
use edu_service::dto::{ContentFilter, ContentRequest, ContentResponse};
use edu_service::CmsService;

use crate::extractors::{AuthUser, IdPath, OptionalAuthUser, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /cms/content
pub async fn list_content(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Query(filter): Query<ContentFilter>,
) -> ApiResult<Json<Vec<ContentResponse>>> {
    let service = CmsService::new(state.service_context());
    Ok(Json(service.list(viewer.user_id(), filter).await?))
}

/// GET /cms/content/{id}
pub async fn get_content(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ContentResponse>> {
    let service = CmsService::new(state.service_context());
    Ok(Json(service.get(viewer.user_id(), id).await?))
}

/// POST /cms/content
pub async fn create_content(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<ContentRequest>,
) -> ApiResult<Created<Json<ContentResponse>>> {
    let service = CmsService::new(state.service_context());
    Ok(Created(Json(service.create(auth.user_id, request).await?)))
}

/// PUT /cms/content/{id}
pub async fn update_content(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<ContentRequest>,
) -> ApiResult<Json<ContentResponse>> {
    let service = CmsService::new(state.service_context());
    Ok(Json(service.update(auth.user_id, id, request).await?))
}

/// DELETE /cms/content/{id}
pub async fn delete_content(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<NoContent> {
    let service = CmsService::new(state.service_context());
    service.delete(auth.user_id, id).await?;
    Ok(NoContent)
}
