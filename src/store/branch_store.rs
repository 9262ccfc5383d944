use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{Message, SavedBranch};

/// In-memory mapping of branch id to saved branch. Key order carries no
/// meaning; ordering requirements live in the highlight lists and message
/// sequences, not here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchStore {
    branches: HashMap<Uuid, SavedBranch>,
}

impl BranchStore {
    pub fn new() -> Self {
        BranchStore {
            branches: HashMap::new(),
        }
    }

    /// Allocate a fresh branch with an empty conversation and a deep copy of
    /// the history snapshot. Returns the new branch id. Never fails.
    pub fn create(
        &mut self,
        source_node_id: Uuid,
        selected_text: String,
        history_context: &[Message],
    ) -> Uuid {
        let branch = SavedBranch::new(source_node_id, selected_text, history_context);
        let branch_id = branch.id;
        self.branches.insert(branch_id, branch);
        branch_id
    }

    pub fn get(&self, branch_id: Uuid) -> Option<&SavedBranch> {
        self.branches.get(&branch_id)
    }

    pub fn contains(&self, branch_id: Uuid) -> bool {
        self.branches.contains_key(&branch_id)
    }

    /// Replace a branch's conversation wholesale. The orchestrator always
    /// supplies the full new sequence, never a delta, so a streaming update
    /// cannot race a partial write. No-op when the branch is absent.
    pub fn set_messages(&mut self, branch_id: Uuid, messages: Vec<Message>) {
        if let Some(branch) = self.branches.get_mut(&branch_id) {
            branch.branch_messages = messages;
        }
    }

    /// Delete a branch and return the record, final message list included.
    pub fn remove(&mut self, branch_id: Uuid) -> Option<SavedBranch> {
        self.branches.remove(&branch_id)
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, &SavedBranch)> {
        self.branches.iter()
    }
}
