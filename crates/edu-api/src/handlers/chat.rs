//! AI study assistant handlers

use axum::{extract::State, Json};
use edu_service::dto::{ChatMessageResponse, ChatReplyResponse, ChatRequest, MessageResponse};
use edu_service::ChatService;

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// POST /chat
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<ChatRequest>,
) -> ApiResult<Json<ChatReplyResponse>> {
    let service = ChatService::new(state.service_context());
    Ok(Json(service.send(auth.user_id, request).await?))
}

/// GET /chat/history
pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ChatMessageResponse>>> {
    let service = ChatService::new(state.service_context());
    Ok(Json(service.history(auth.user_id).await?))
}

/// DELETE /chat/history
pub async fn clear_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    let service = ChatService::new(state.service_context());
    Ok(Json(service.clear(auth.user_id).await?))
}
