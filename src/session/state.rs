use uuid::Uuid;

use crate::domain::{ActiveBranch, Message, SavedBranch};
use crate::store::{BranchStore, Timeline};

/// The whole session: main flow, saved branches, the active-branch pointer
/// and the streaming flag. Single source of truth for the process lifetime;
/// every operation is a synchronous transition that either applies fully or
/// declines leaving the state untouched.
///
/// Declines are not errors. Stale references (a double-click on a removed
/// highlight, a merge racing a close) and streaming collisions are expected
/// UI races, so gated operations report `false`/`None` instead of failing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    timeline: Timeline,
    branches: BranchStore,
    active_branch: ActiveBranch,
    is_streaming: bool,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState {
            timeline: Timeline::new(),
            branches: BranchStore::new(),
            active_branch: ActiveBranch::closed(),
            is_streaming: false,
        }
    }

    // Read accessors

    pub fn main_flow(&self) -> &[Message] {
        self.timeline.messages()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn branches(&self) -> &BranchStore {
        &self.branches
    }

    pub fn active_branch(&self) -> &ActiveBranch {
        &self.active_branch
    }

    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    /// The record the active-branch pointer references, if any.
    pub fn active_branch_data(&self) -> Option<&SavedBranch> {
        self.active_branch
            .branch_id
            .and_then(|id| self.branches.get(id))
    }

    // Branch transitions

    /// Create a branch from selected text in an assistant message: store the
    /// record, annotate the source with a highlight, and open the branch.
    /// Declines while streaming or when the source message cannot carry a
    /// highlight. Returns the new branch id.
    pub fn create_branch(
        &mut self,
        source_node_id: Uuid,
        selected_text: &str,
        history_context: &[Message],
    ) -> Option<Uuid> {
        if self.is_streaming {
            return None;
        }
        if !self.timeline.get(source_node_id).is_some_and(|m| {
            m.is_assistant() && !m.is_branch_merged
        }) {
            return None;
        }

        let branch_id =
            self.branches
                .create(source_node_id, selected_text.to_string(), history_context);
        self.timeline
            .add_highlight(source_node_id, branch_id, selected_text.to_string());
        self.active_branch = ActiveBranch::opened(branch_id);

        Some(branch_id)
    }

    /// Open an existing saved branch (a click on its highlight). Declines
    /// while streaming or when the id no longer exists, so the active
    /// pointer can only ever name a live store entry.
    pub fn open_branch(&mut self, branch_id: Uuid) -> bool {
        if self.is_streaming || !self.branches.contains(branch_id) {
            return false;
        }
        self.active_branch = ActiveBranch::opened(branch_id);
        true
    }

    /// Close the active branch. Its data stays saved in the store.
    pub fn close_branch(&mut self) -> bool {
        if self.is_streaming {
            return false;
        }
        self.active_branch = ActiveBranch::closed();
        true
    }

    /// Replace the active branch's conversation wholesale. Not gated on
    /// streaming: this is the path streaming writes flow through. No-op
    /// without an active branch.
    pub fn update_branch_messages(&mut self, messages: Vec<Message>) {
        if let Some(branch_id) = self.active_branch.branch_id {
            self.branches.set_messages(branch_id, messages);
        }
    }

    /// Merge the active branch back into the main flow: tag and splice its
    /// messages after the source, drop the branch record and its highlight
    /// atomically, and close the pointer. Declines while streaming, without
    /// an active branch, when the branch has no messages, or when the source
    /// message has vanished. Returns the id the view should align to: the
    /// first merged message, else the source.
    pub fn merge_branch(&mut self) -> Option<Uuid> {
        if self.is_streaming {
            return None;
        }
        let branch_id = self.active_branch.branch_id?;
        let branch = self.branches.get(branch_id)?;
        if branch.branch_messages.is_empty() {
            return None;
        }

        let source_node_id = branch.source_node_id;
        let selected_text = branch.selected_text.clone();
        let align_to = branch
            .branch_messages
            .first()
            .map(|m| m.id)
            .unwrap_or(source_node_id);
        let branch_messages = branch.branch_messages.clone();

        // Splice first; only dismantle the branch once the source is known
        // to still exist, so a failed merge leaves every reference intact.
        if !self
            .timeline
            .merge_branch_at(source_node_id, &selected_text, branch_messages)
        {
            return None;
        }

        self.branches.remove(branch_id);
        self.timeline.remove_highlight(source_node_id, branch_id);
        self.active_branch = ActiveBranch::closed();

        Some(align_to)
    }

    // Main-flow transitions

    /// Wholesale main-flow replacement (streaming updates and plain sends).
    pub fn update_main_messages(&mut self, messages: Vec<Message>) {
        self.timeline.replace_all(messages);
    }

    /// Start a main-flow exchange: append the user turn plus an empty
    /// assistant message and flip the streaming flag. Declines while already
    /// streaming or on empty input. Returns the pending assistant id the
    /// stream will fill.
    pub fn begin_main_exchange(&mut self, content: &str) -> Option<Uuid> {
        let trimmed = content.trim();
        if self.is_streaming || trimmed.is_empty() {
            return None;
        }

        self.timeline.push(Message::user(trimmed));
        let assistant = Message::assistant_pending();
        let assistant_id = assistant.id;
        self.timeline.push(assistant);
        self.is_streaming = true;

        Some(assistant_id)
    }

    /// Start an exchange inside the active branch, same shape as
    /// [`Self::begin_main_exchange`] but appended to the branch conversation.
    pub fn begin_branch_exchange(&mut self, content: &str) -> Option<Uuid> {
        let trimmed = content.trim();
        if self.is_streaming || trimmed.is_empty() {
            return None;
        }
        let branch_id = self.active_branch.branch_id?;
        let branch = self.branches.get(branch_id)?;

        let mut messages = branch.branch_messages.clone();
        messages.push(Message::user(trimmed));
        let assistant = Message::assistant_pending();
        let assistant_id = assistant.id;
        messages.push(assistant);
        self.branches.set_messages(branch_id, messages);
        self.is_streaming = true;

        Some(assistant_id)
    }

    /// Streaming token update for a main-flow assistant message.
    pub fn set_assistant_content(&mut self, message_id: Uuid, content: &str) -> bool {
        self.timeline.set_content(message_id, content)
    }

    /// Streaming token update for an assistant message inside the active
    /// branch, routed through the same wholesale-replace path as any other
    /// branch mutation.
    pub fn set_branch_assistant_content(&mut self, message_id: Uuid, content: &str) -> bool {
        let Some(branch) = self.active_branch_data() else {
            return false;
        };
        if !branch.branch_messages.iter().any(|m| m.id == message_id) {
            return false;
        }

        let messages = branch
            .branch_messages
            .iter()
            .cloned()
            .map(|mut m| {
                if m.id == message_id {
                    m.content = content.to_string();
                }
                m
            })
            .collect();
        self.update_branch_messages(messages);
        true
    }

    pub fn stream_start(&mut self) {
        self.is_streaming = true;
    }

    /// Clear the streaming flag. Runs on both the completion and error paths
    /// of an emission so the UI is never left locked.
    pub fn stream_end(&mut self) {
        self.is_streaming = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageRole;

    fn state_with_assistant(content: &str) -> (SessionState, Uuid) {
        let mut state = SessionState::new();
        let msg = Message::assistant(content);
        let id = msg.id;
        state.update_main_messages(vec![msg]);
        (state, id)
    }

    #[test]
    fn test_create_branch_records_highlight_and_opens() {
        let (mut state, m1) = state_with_assistant("The sky is blue and vast.");
        let history = state.main_flow().to_vec();

        let b1 = state.create_branch(m1, "blue", &history).unwrap();

        let branch = state.branches().get(b1).unwrap();
        assert_eq!(branch.source_node_id, m1);
        assert_eq!(branch.selected_text, "blue");
        assert!(branch.branch_messages.is_empty());
        assert_eq!(branch.history_context, history);

        let source = state.timeline().get(m1).unwrap();
        assert_eq!(source.branch_highlights.len(), 1);
        assert_eq!(source.branch_highlights[0].branch_id, b1);
        assert_eq!(source.branch_highlights[0].text, "blue");

        assert_eq!(state.active_branch(), &ActiveBranch::opened(b1));
    }

    #[test]
    fn test_create_branch_declines_for_unknown_source() {
        let (mut state, _) = state_with_assistant("hello");
        let before = state.clone();

        assert!(state.create_branch(Uuid::new_v4(), "x", &[]).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_open_branch_with_dead_id_is_noop() {
        let (mut state, m1) = state_with_assistant("hello there");
        let history = state.main_flow().to_vec();
        state.create_branch(m1, "there", &history).unwrap();
        state.close_branch();
        let before = state.clone();

        assert!(!state.open_branch(Uuid::new_v4()));
        assert_eq!(state, before);
    }

    #[test]
    fn test_close_branch_retains_store_entry() {
        let (mut state, m1) = state_with_assistant("keep me");
        let history = state.main_flow().to_vec();
        let b1 = state.create_branch(m1, "keep", &history).unwrap();

        assert!(state.close_branch());
        assert_eq!(state.active_branch(), &ActiveBranch::closed());
        assert!(state.branches().contains(b1));

        assert!(state.open_branch(b1));
        assert_eq!(state.active_branch(), &ActiveBranch::opened(b1));
    }

    #[test]
    fn test_merge_round_trip() {
        let (mut state, m1) = state_with_assistant("The sky is blue and vast.");
        let history = state.main_flow().to_vec();
        let b1 = state.create_branch(m1, "blue", &history).unwrap();

        let reply = Message::assistant("Because of Rayleigh scattering.");
        let question = Message::user("why?");
        let question_id = question.id;
        state.update_branch_messages(vec![question, reply]);

        let align_to = state.merge_branch().unwrap();
        assert_eq!(align_to, question_id);

        let flow = state.main_flow();
        assert_eq!(flow.len(), 3);
        assert_eq!(flow[0].id, m1);
        assert_eq!(flow[0].selected_text.as_deref(), Some("blue"));
        assert!(flow[0].branch_highlights.is_empty());
        assert_eq!(flow[1].id, question_id);
        assert!(flow[1].is_branch_merged);
        assert_eq!(flow[1].branch_source_id, Some(m1));
        assert_eq!(flow[2].role, MessageRole::Assistant);
        assert!(flow[2].is_branch_merged);

        assert!(state.branches().is_empty());
        assert_eq!(state.active_branch(), &ActiveBranch::closed());
    }

    #[test]
    fn test_merge_with_empty_branch_is_noop() {
        let (mut state, m1) = state_with_assistant("nothing to merge");
        let history = state.main_flow().to_vec();
        state.create_branch(m1, "nothing", &history).unwrap();
        let before = state.clone();

        assert!(state.merge_branch().is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_merge_with_vanished_source_is_noop() {
        let (mut state, m1) = state_with_assistant("soon gone");
        let history = state.main_flow().to_vec();
        let b1 = state.create_branch(m1, "gone", &history).unwrap();
        state.update_branch_messages(vec![Message::user("still here?")]);

        // Source removed out from under the branch.
        state.update_main_messages(vec![Message::assistant("replacement")]);
        let before = state.clone();

        assert!(state.merge_branch().is_none());
        assert_eq!(state, before);
        assert!(state.branches().contains(b1));
    }

    #[test]
    fn test_two_branches_same_source_stack_in_merge_order() {
        let (mut state, m1) = state_with_assistant("The sky is blue and vast.");

        let history = state.main_flow().to_vec();
        state.create_branch(m1, "blue", &history).unwrap();
        let x1 = Message::assistant("about blue");
        let x1_id = x1.id;
        state.update_branch_messages(vec![x1]);
        state.merge_branch().unwrap();

        let history = state.main_flow().to_vec();
        state.create_branch(m1, "vast", &history).unwrap();
        let y1 = Message::assistant("about vast");
        let y1_id = y1.id;
        state.update_branch_messages(vec![y1]);
        state.merge_branch().unwrap();

        let ids: Vec<Uuid> = state.main_flow().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![m1, x1_id, y1_id]);
        assert_eq!(
            state.timeline().get(m1).unwrap().selected_text.as_deref(),
            Some("vast")
        );
    }

    #[test]
    fn test_streaming_gates_branch_operations() {
        let (mut state, m1) = state_with_assistant("gated while busy");
        let history = state.main_flow().to_vec();
        let b1 = state.create_branch(m1, "busy", &history).unwrap();
        state.update_branch_messages(vec![Message::user("pending")]);

        state.stream_start();
        let before = state.clone();

        assert!(state.create_branch(m1, "gated", &history).is_none());
        assert!(!state.open_branch(b1));
        assert!(!state.close_branch());
        assert!(state.merge_branch().is_none());
        assert_eq!(state, before);

        state.stream_end();
        assert!(state.close_branch());
    }

    #[test]
    fn test_begin_main_exchange_appends_pair_and_locks() {
        let (mut state, _) = state_with_assistant("seed");

        let assistant_id = state.begin_main_exchange("  a question  ").unwrap();
        assert!(state.is_streaming());

        let flow = state.main_flow();
        assert_eq!(flow.len(), 3);
        assert_eq!(flow[1].role, MessageRole::User);
        assert_eq!(flow[1].content, "a question");
        assert_eq!(flow[2].id, assistant_id);
        assert_eq!(flow[2].content, "");

        // Second send is refused until the stream ends.
        assert!(state.begin_main_exchange("too soon").is_none());

        assert!(state.set_assistant_content(assistant_id, "part"));
        assert!(state.set_assistant_content(assistant_id, "partial reply"));
        state.stream_end();
        assert_eq!(state.main_flow()[2].content, "partial reply");
    }

    #[test]
    fn test_begin_main_exchange_rejects_blank_input() {
        let (mut state, _) = state_with_assistant("seed");
        let before = state.clone();

        assert!(state.begin_main_exchange("   ").is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_begin_branch_exchange_streams_into_branch() {
        let (mut state, m1) = state_with_assistant("branch me");
        let history = state.main_flow().to_vec();
        let b1 = state.create_branch(m1, "branch", &history).unwrap();

        let assistant_id = state.begin_branch_exchange("tell me more").unwrap();
        assert!(state.is_streaming());

        assert!(state.set_branch_assistant_content(assistant_id, "expanding"));
        state.stream_end();

        let branch = state.branches().get(b1).unwrap();
        assert_eq!(branch.branch_messages.len(), 2);
        assert_eq!(branch.branch_messages[0].content, "tell me more");
        assert_eq!(branch.branch_messages[1].content, "expanding");
        // Main flow untouched by branch traffic.
        assert_eq!(state.main_flow().len(), 1);
    }

    #[test]
    fn test_begin_branch_exchange_requires_active_branch() {
        let (mut state, _) = state_with_assistant("no branch open");
        let before = state.clone();

        assert!(state.begin_branch_exchange("hello?").is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_highlight_references_always_resolve() {
        // Every branch id referenced by a highlight exists in the store, at
        // every step of a create/create/merge sequence.
        let check = |state: &SessionState| {
            for msg in state.main_flow() {
                for hl in &msg.branch_highlights {
                    assert!(state.branches().contains(hl.branch_id));
                }
            }
            if let Some(id) = state.active_branch().branch_id {
                assert!(state.branches().contains(id));
            }
        };

        let (mut state, m1) = state_with_assistant("The sky is blue and vast.");
        check(&state);

        let history = state.main_flow().to_vec();
        state.create_branch(m1, "blue", &history).unwrap();
        check(&state);

        state.close_branch();
        let history = state.main_flow().to_vec();
        state.create_branch(m1, "vast", &history).unwrap();
        check(&state);

        state.update_branch_messages(vec![Message::user("more on vast")]);
        state.merge_branch().unwrap();
        check(&state);
    }
}
