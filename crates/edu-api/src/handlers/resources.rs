//! Resource handlers
//!
//! Papers, notes and syllabus share one set of handlers. The router mounts
//! them once per kind and passes the kind as an extension.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use edu_core::entities::ResourceKind;
use edu_service::dto::{
    FileDownload, PaginatedResponse, ResourceFilter, ResourceResponse, UpdateResourceRequest,
};
use edu_service::ResourceService;

use crate::extractors::{AuthUser, IdPath, ResourceUpload, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created, NoContent};
use crate::state::AppState;

/// POST /{kind}/upload
pub async fn upload(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    auth: AuthUser,
    ResourceUpload { metadata, file }: ResourceUpload,
) -> ApiResult<Created<Json<ResourceResponse>>> {
    let service = ResourceService::new(state.service_context());
    let resource = service.upload(auth.user_id, kind, metadata, file).await?;
    Ok(Created(Json(resource)))
}

/// GET /{kind}
pub async fn list(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Query(filter): Query<ResourceFilter>,
) -> ApiResult<Json<PaginatedResponse<ResourceResponse>>> {
    let service = ResourceService::new(state.service_context());
    Ok(Json(service.list(kind, filter).await?))
}

/// GET /{kind}/{id}
pub async fn get(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    IdPath(id): IdPath,
) -> ApiResult<Json<ResourceResponse>> {
    let service = ResourceService::new(state.service_context());
    Ok(Json(service.get(kind, id).await?))
}

/// GET /{kind}/{id}/download
pub async fn download(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Response> {
    let service = ResourceService::new(state.service_context());
    let file = service.download(auth.user_id, kind, id).await?;
    attachment(file)
}

/// PATCH /{kind}/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateResourceRequest>,
) -> ApiResult<Json<ResourceResponse>> {
    let service = ResourceService::new(state.service_context());
    Ok(Json(service.update(auth.user_id, kind, id, request).await?))
}

/// DELETE /{kind}/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<NoContent> {
    let service = ResourceService::new(state.service_context());
    service.delete(auth.user_id, kind, id).await?;
    Ok(NoContent)
}

fn attachment(file: FileDownload) -> ApiResult<Response> {
    let content_type = HeaderValue::from_str(&file.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        file.file_name.replace('"', "")
    ))
    .map_err(ApiError::internal)?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
