use uuid::Uuid;

use crate::domain::{BranchHighlight, Message};

/// The main conversation flow: an ordered message sequence with highlight
/// annotations and merge splicing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    messages: Vec<Message>,
}

impl Timeline {
    pub fn new() -> Self {
        Timeline {
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, message_id: Uuid) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    pub fn position(&self, message_id: Uuid) -> Option<usize> {
        self.messages.iter().position(|m| m.id == message_id)
    }

    /// All messages up to and including the named one; the history snapshot
    /// a branch is created with. Empty when the message is unknown.
    pub fn history_up_to(&self, message_id: Uuid) -> Vec<Message> {
        match self.position(message_id) {
            Some(idx) => self.messages[..=idx].to_vec(),
            None => Vec::new(),
        }
    }

    /// Wholesale replacement, used for streaming updates and plain sends.
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Overwrite one message's content in place (streaming token updates).
    /// Returns false when the message is unknown.
    pub fn set_content(&mut self, message_id: Uuid, content: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == message_id) {
            Some(msg) => {
                msg.content = content.to_string();
                true
            }
            None => false,
        }
    }

    /// Append a highlight to the named message. Highlights keep insertion
    /// order; text position is resolved lazily at render time. Declines for
    /// unknown, non-assistant, or already-merged targets, since only live
    /// assistant messages may carry branch origins.
    pub fn add_highlight(&mut self, source_node_id: Uuid, branch_id: Uuid, text: String) -> bool {
        match self.messages.iter_mut().find(|m| m.id == source_node_id) {
            Some(msg) if msg.is_assistant() && !msg.is_branch_merged => {
                msg.branch_highlights.push(BranchHighlight { branch_id, text });
                true
            }
            _ => false,
        }
    }

    /// Drop the highlight referencing `branch_id` from the named message.
    pub fn remove_highlight(&mut self, source_node_id: Uuid, branch_id: Uuid) {
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == source_node_id) {
            msg.branch_highlights.retain(|h| h.branch_id != branch_id);
        }
    }

    /// Splice a merged branch conversation into the flow right after its
    /// source message and any content merged there earlier, so repeated
    /// merges at one source stack in merge order, most recent last. The
    /// source index is recomputed fresh on every call, never cached. Returns
    /// false, with the flow untouched, when the source message is gone.
    pub fn merge_branch_at(
        &mut self,
        source_node_id: Uuid,
        selected_text: &str,
        branch_messages: Vec<Message>,
    ) -> bool {
        let Some(source_index) = self.position(source_node_id) else {
            return false;
        };

        self.messages[source_index].selected_text = Some(selected_text.to_string());

        let mut insert_at = source_index + 1;
        while self
            .messages
            .get(insert_at)
            .is_some_and(|m| m.is_branch_merged && m.branch_source_id == Some(source_node_id))
        {
            insert_at += 1;
        }

        let merged = branch_messages.into_iter().map(|mut msg| {
            msg.is_branch_merged = true;
            msg.branch_source_id = Some(source_node_id);
            msg
        });
        self.messages.splice(insert_at..insert_at, merged);

        true
    }
}
