use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::api::dto::{
    BranchResponse, CreateBranchRequest, MergeResponse, SendMessageRequest, SessionResponse,
    UpdateMessagesRequest,
};
use crate::api::error::ApiError;
use crate::api::routes::SharedSession;

/// Create a branch from selected text in an assistant message and open it.
/// Declines (unchanged snapshot) while streaming or for a stale source id.
pub async fn create_branch(
    State(service): State<SharedSession>,
    Json(payload): Json<CreateBranchRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if payload.selected_text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Selected text must not be empty".to_string(),
        ));
    }

    service.create_branch(payload.source_node_id, &payload.selected_text);

    Ok(Json(service.snapshot().into()))
}

pub async fn get_branches(State(service): State<SharedSession>) -> Json<Vec<BranchResponse>> {
    let branches = service
        .saved_branches()
        .into_iter()
        .map(Into::into)
        .collect();
    Json(branches)
}

pub async fn get_branch(
    State(service): State<SharedSession>,
    Path(branch_id): Path<Uuid>,
) -> Result<Json<BranchResponse>, ApiError> {
    let branch = service
        .branch(branch_id)
        .ok_or_else(|| ApiError::NotFound("Branch not found".to_string()))?;

    Ok(Json(branch.into()))
}

/// Open a saved branch (a click on its highlight). Declined opens — a stale
/// id, or a stream in flight — leave the snapshot unchanged.
pub async fn open_branch(
    State(service): State<SharedSession>,
    Path(branch_id): Path<Uuid>,
) -> Json<SessionResponse> {
    service.open_branch(branch_id);
    Json(service.snapshot().into())
}

/// Close the branch drawer. Branch data stays saved.
pub async fn close_branch(State(service): State<SharedSession>) -> Json<SessionResponse> {
    service.close_branch();
    Json(service.snapshot().into())
}

/// Merge the active branch into the main flow. `align_to` names the message
/// the view should scroll to and is absent when the merge declined.
pub async fn merge_branch(State(service): State<SharedSession>) -> Json<MergeResponse> {
    let align_to = service.merge_branch();
    Json(MergeResponse {
        align_to,
        session: service.snapshot().into(),
    })
}

/// Wholesale replacement of the active branch's conversation.
pub async fn update_branch_messages(
    State(service): State<SharedSession>,
    Json(payload): Json<UpdateMessagesRequest>,
) -> Json<SessionResponse> {
    service.update_branch_messages(payload.messages);
    Json(service.snapshot().into())
}

/// Send a user message inside the active branch and stream the simulated
/// reply to completion.
pub async fn send_branch_message(
    State(service): State<SharedSession>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Content must not be empty".to_string()));
    }

    service.send_branch_message(&payload.content).await;

    Ok(Json(service.snapshot().into()))
}
