use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single turn in a conversation, either in the main flow or inside a
/// branch. `content` is mutated in place while a response streams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    /// True only for messages that originated in a branch and were spliced
    /// into the main flow at merge time.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_branch_merged: bool,
    /// Back-reference to the main-flow message the merged content was
    /// attached to; set together with `is_branch_merged`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_source_id: Option<Uuid>,
    /// Quoted excerpt shown as context on a merge source message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
    /// Spans of `content` that have been turned into branch origins.
    /// Insertion order, not text order. Only assistant messages carry these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branch_highlights: Vec<BranchHighlight>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            _ => None,
        }
    }
}

/// A saved highlight marking a branched text range inside an assistant
/// message. `text` is the exact selected substring; no offset is stored, so
/// rendering resolves it by first-occurrence scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchHighlight {
    pub branch_id: Uuid,
    pub text: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Message {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            is_branch_merged: false,
            branch_source_id: None,
            selected_text: None,
            branch_highlights: Vec::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message::new(MessageRole::Assistant, content)
    }

    /// Empty assistant message appended at response start and filled
    /// incrementally as tokens arrive.
    pub fn assistant_pending() -> Self {
        Message::new(MessageRole::Assistant, "")
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}
