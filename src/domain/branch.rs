use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::Message;

/// A fully saved branch conversation, spawned from a highlighted excerpt of
/// one main-flow assistant message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedBranch {
    pub id: Uuid,
    /// The main-flow message this branch was spawned from.
    pub source_node_id: Uuid,
    /// The exact excerpt that spawned the branch.
    pub selected_text: String,
    /// Snapshot of the main flow up to and including the source node, taken
    /// at creation time. Read-only context; never mutated afterwards.
    pub history_context: Vec<Message>,
    /// The branch's own conversation, appended to by user/assistant turns.
    pub branch_messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl SavedBranch {
    pub fn new(source_node_id: Uuid, selected_text: String, history_context: &[Message]) -> Self {
        SavedBranch {
            id: Uuid::new_v4(),
            source_node_id,
            selected_text,
            history_context: history_context.to_vec(),
            branch_messages: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// At most one branch may be open at a time. `branch_id`, when present,
/// always references a live entry in the branch store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveBranch {
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<Uuid>,
}

impl ActiveBranch {
    pub fn closed() -> Self {
        ActiveBranch {
            is_active: false,
            branch_id: None,
        }
    }

    pub fn opened(branch_id: Uuid) -> Self {
        ActiveBranch {
            is_active: true,
            branch_id: Some(branch_id),
        }
    }
}

impl Default for ActiveBranch {
    fn default() -> Self {
        ActiveBranch::closed()
    }
}
