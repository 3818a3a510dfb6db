//! Bookmark and download history handlers

use axum::{extract::State, Json};
use edu_service::dto::{BookmarkResponse, CreateBookmarkRequest, DownloadResponse};
use edu_service::BookmarkService;

use crate::extractors::{AuthUser, IdPath, Pagination};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// POST /bookmarks
pub async fn create_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateBookmarkRequest>,
) -> ApiResult<Created<Json<BookmarkResponse>>> {
    let service = BookmarkService::new(state.service_context());
    let bookmark = service.create(auth.user_id, request).await?;
    Ok(Created(Json(bookmark)))
}

/// GET /bookmarks
pub async fn list_bookmarks(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<BookmarkResponse>>> {
    let service = BookmarkService::new(state.service_context());
    Ok(Json(service.list(auth.user_id).await?))
}

/// DELETE /bookmarks/{resource_id}
pub async fn delete_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(resource_id): IdPath,
) -> ApiResult<NoContent> {
    let service = BookmarkService::new(state.service_context());
    service.delete(auth.user_id, resource_id).await?;
    Ok(NoContent)
}

/// GET /downloads
pub async fn list_downloads(
    State(state): State<AppState>,
    auth: AuthUser,
    pagination: Pagination,
) -> ApiResult<Json<Vec<DownloadResponse>>> {
    let service = BookmarkService::new(state.service_context());
    Ok(Json(service.downloads(auth.user_id, pagination.limit).await?))
}
