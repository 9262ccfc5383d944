use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::api::dto::{
    MessageDetailResponse, MessageResponse, SendMessageRequest, SessionResponse,
    UpdateMessagesRequest,
};
use crate::api::error::ApiError;
use crate::api::routes::SharedSession;

pub async fn get_main_messages(
    State(service): State<SharedSession>,
) -> Json<Vec<MessageResponse>> {
    let messages = service.main_flow().into_iter().map(Into::into).collect();
    Json(messages)
}

/// One main-flow message with its content resolved into render segments.
pub async fn get_message(
    State(service): State<SharedSession>,
    Path(message_id): Path<Uuid>,
) -> Result<Json<MessageDetailResponse>, ApiError> {
    let message = service
        .message(message_id)
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    Ok(Json(message.into()))
}

/// Wholesale main-flow replacement.
pub async fn update_main_messages(
    State(service): State<SharedSession>,
    Json(payload): Json<UpdateMessagesRequest>,
) -> Json<SessionResponse> {
    service.update_main_messages(payload.messages);
    Json(service.snapshot().into())
}

/// Send a user message and stream the simulated reply to completion. A send
/// attempted while another stream is in flight is declined; the response is
/// the unchanged snapshot either way.
pub async fn send_main_message(
    State(service): State<SharedSession>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Content must not be empty".to_string()));
    }

    service.send_main_message(&payload.content).await;

    Ok(Json(service.snapshot().into()))
}
