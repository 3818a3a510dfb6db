//! Forum handlers

use axum::{
    extract::{Query, State},
    Json,
};
use edu_service::dto::{
    CreatePostRequest, CreateReplyRequest, PaginatedResponse, PostDetailResponse, PostFilter,
    PostResponse, ReplyResponse, UpdatePostRequest,
};
use edu_service::ForumService;

use crate::extractors::{AuthUser, IdPath, OptionalAuthUser, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// POST /forum/posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreatePostRequest>,
) -> ApiResult<Created<Json<PostResponse>>> {
    let service = ForumService::new(state.service_context());
    let post = service.create_post(auth.user_id, request).await?;
    Ok(Created(Json(post)))
}

/// GET /forum/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(filter): Query<PostFilter>,
) -> ApiResult<Json<PaginatedResponse<PostResponse>>> {
    let service = ForumService::new(state.service_context());
    Ok(Json(service.list_posts(filter).await?))
}

/// GET /forum/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    IdPath(post_id): IdPath,
) -> ApiResult<Json<PostDetailResponse>> {
    let service = ForumService::new(state.service_context());
    Ok(Json(service.get_post(post_id, viewer.user_id()).await?))
}

/// PATCH /forum/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(post_id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdatePostRequest>,
) -> ApiResult<Json<PostResponse>> {
    let service = ForumService::new(state.service_context());
    Ok(Json(service.update_post(auth.user_id, post_id, request).await?))
}

/// DELETE /forum/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(post_id): IdPath,
) -> ApiResult<NoContent> {
    let service = ForumService::new(state.service_context());
    service.delete_post(auth.user_id, post_id).await?;
    Ok(NoContent)
}

/// POST /forum/posts/{id}/replies
pub async fn create_reply(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(post_id): IdPath,
    ValidatedJson(request): ValidatedJson<CreateReplyRequest>,
) -> ApiResult<Created<Json<ReplyResponse>>> {
    let service = ForumService::new(state.service_context());
    let reply = service.create_reply(auth.user_id, post_id, request).await?;
    Ok(Created(Json(reply)))
}

/// DELETE /forum/replies/{id}
pub async fn delete_reply(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(reply_id): IdPath,
) -> ApiResult<NoContent> {
    let service = ForumService::new(state.service_context());
    service.delete_reply(auth.user_id, reply_id).await?;
    Ok(NoContent)
}
