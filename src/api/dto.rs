use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ActiveBranch, BranchHighlight, Message, SavedBranch};
use crate::session::SessionState;
use crate::utils::Segment;

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBranchRequest {
    pub source_node_id: Uuid,
    pub selected_text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessagesRequest {
    pub messages: Vec<Message>,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_branch_merged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_source_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branch_highlights: Vec<BranchHighlight>,
}

impl From<Message> for MessageResponse {
    fn from(msg: Message) -> Self {
        MessageResponse {
            id: msg.id,
            role: msg.role.as_str().to_string(),
            content: msg.content,
            is_branch_merged: msg.is_branch_merged,
            branch_source_id: msg.branch_source_id,
            selected_text: msg.selected_text,
            branch_highlights: msg.branch_highlights,
        }
    }
}

/// A message plus its content resolved into render segments.
#[derive(Debug, Serialize)]
pub struct MessageDetailResponse {
    #[serde(flatten)]
    pub message: MessageResponse,
    pub segments: Vec<Segment>,
}

impl From<Message> for MessageDetailResponse {
    fn from(msg: Message) -> Self {
        let segments = crate::utils::split_segments(&msg.content, &msg.branch_highlights);
        MessageDetailResponse {
            message: msg.into(),
            segments,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BranchResponse {
    pub id: Uuid,
    pub source_node_id: Uuid,
    pub selected_text: String,
    pub created_at: DateTime<Utc>,
    pub history_context: Vec<MessageResponse>,
    pub branch_messages: Vec<MessageResponse>,
}

impl From<SavedBranch> for BranchResponse {
    fn from(branch: SavedBranch) -> Self {
        BranchResponse {
            id: branch.id,
            source_node_id: branch.source_node_id,
            selected_text: branch.selected_text,
            created_at: branch.created_at,
            history_context: branch.history_context.into_iter().map(Into::into).collect(),
            branch_messages: branch.branch_messages.into_iter().map(Into::into).collect(),
        }
    }
}

/// Full session snapshot: everything the view layer re-renders from.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub main_flow: Vec<MessageResponse>,
    pub saved_branches: Vec<BranchResponse>,
    pub active_branch: ActiveBranch,
    pub is_streaming: bool,
}

impl From<SessionState> for SessionResponse {
    fn from(state: SessionState) -> Self {
        SessionResponse {
            main_flow: state.main_flow().iter().cloned().map(Into::into).collect(),
            saved_branches: state
                .branches()
                .iter()
                .map(|(_, b)| b.clone().into())
                .collect(),
            active_branch: state.active_branch().clone(),
            is_streaming: state.is_streaming(),
        }
    }
}

/// Merge outcome: the new snapshot plus the message id the view should
/// align to the viewport, when the merge applied.
#[derive(Debug, Serialize)]
pub struct MergeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_to: Option<Uuid>,
    #[serde(flatten)]
    pub session: SessionResponse,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
