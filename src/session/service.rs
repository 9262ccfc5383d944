use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::domain::{ActiveBranch, Message, SavedBranch};
use crate::session::SessionState;
use crate::stream::{BRANCH_REPLY, DEFAULT_REPLY, ResponseEmitter};

enum StreamTarget {
    MainFlow,
    ActiveBranch,
}

/// Owns the session state behind a lock and fronts every mutating entry
/// point. All transitions run to completion under the write lock; the one
/// long-running operation, a streaming send, re-acquires the lock per token
/// so readers observe intermediate states and the streaming gate stays
/// checkable while a response is in flight.
pub struct SessionService<E: ResponseEmitter> {
    state: RwLock<SessionState>,
    emitter: E,
}

impl<E: ResponseEmitter> SessionService<E> {
    pub fn new(emitter: E) -> Self {
        SessionService {
            state: RwLock::new(SessionState::new()),
            emitter,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    // Read accessors

    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    pub fn main_flow(&self) -> Vec<Message> {
        self.read().main_flow().to_vec()
    }

    pub fn saved_branches(&self) -> Vec<SavedBranch> {
        self.read().branches().iter().map(|(_, b)| b.clone()).collect()
    }

    pub fn branch(&self, branch_id: Uuid) -> Option<SavedBranch> {
        self.read().branches().get(branch_id).cloned()
    }

    pub fn active_branch(&self) -> ActiveBranch {
        self.read().active_branch().clone()
    }

    pub fn active_branch_data(&self) -> Option<SavedBranch> {
        self.read().active_branch_data().cloned()
    }

    pub fn is_streaming(&self) -> bool {
        self.read().is_streaming()
    }

    pub fn message(&self, message_id: Uuid) -> Option<Message> {
        self.read().timeline().get(message_id).cloned()
    }

    // Branch operations

    /// Create a branch from selected text in a main-flow assistant message.
    /// The history snapshot is everything up to and including the source
    /// node, taken from the current flow.
    pub fn create_branch(&self, source_node_id: Uuid, selected_text: &str) -> Option<Uuid> {
        let mut state = self.write();
        let history = state.timeline().history_up_to(source_node_id);
        let created = state.create_branch(source_node_id, selected_text, &history);
        match created {
            Some(branch_id) => {
                tracing::info!(%branch_id, %source_node_id, "branch created");
            }
            None => tracing::debug!(%source_node_id, "branch creation declined"),
        }
        created
    }

    /// Open a saved branch by id (a click on its highlight).
    pub fn open_branch(&self, branch_id: Uuid) -> bool {
        let opened = self.write().open_branch(branch_id);
        if !opened {
            tracing::debug!(%branch_id, "branch open declined");
        }
        opened
    }

    /// Close the branch drawer; branch data stays saved.
    pub fn close_branch(&self) -> bool {
        self.write().close_branch()
    }

    /// Replace the active branch's conversation wholesale.
    pub fn update_branch_messages(&self, messages: Vec<Message>) {
        self.write().update_branch_messages(messages);
    }

    /// Merge the active branch into the main flow. Returns the message id
    /// the view should align to.
    pub fn merge_branch(&self) -> Option<Uuid> {
        let merged = self.write().merge_branch();
        match merged {
            Some(align_to) => tracing::info!(%align_to, "branch merged into main flow"),
            None => tracing::debug!("branch merge declined"),
        }
        merged
    }

    // Main-flow operations

    /// Wholesale main-flow replacement.
    pub fn update_main_messages(&self, messages: Vec<Message>) {
        self.write().update_main_messages(messages);
    }

    pub fn stream_start(&self) {
        self.write().stream_start();
    }

    pub fn stream_end(&self) {
        self.write().stream_end();
    }

    /// Send a user message on the main flow and stream the simulated reply
    /// into the appended assistant message. Returns false when the send is
    /// declined (already streaming, or blank input).
    pub async fn send_main_message(&self, content: &str) -> bool {
        let Some(assistant_id) = self.write().begin_main_exchange(content) else {
            tracing::debug!("main send declined");
            return false;
        };
        self.run_stream(assistant_id, DEFAULT_REPLY, StreamTarget::MainFlow)
            .await;
        true
    }

    /// Send a user message inside the active branch and stream the simulated
    /// reply into the branch conversation.
    pub async fn send_branch_message(&self, content: &str) -> bool {
        let Some(assistant_id) = self.write().begin_branch_exchange(content) else {
            tracing::debug!("branch send declined");
            return false;
        };
        self.run_stream(assistant_id, BRANCH_REPLY, StreamTarget::ActiveBranch)
            .await;
        true
    }

    /// Drive one emission to completion. Each token becomes a content
    /// transition under its own short lock scope. The streaming flag is
    /// cleared on the failure path too, so an emitter error never leaves the
    /// session locked.
    async fn run_stream(&self, assistant_id: Uuid, reply: &str, target: StreamTarget) {
        let mut accumulated = String::new();
        let result = self
            .emitter
            .emit(reply, |ch| {
                accumulated.push(ch);
                let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
                match target {
                    StreamTarget::MainFlow => {
                        state.set_assistant_content(assistant_id, &accumulated);
                    }
                    StreamTarget::ActiveBranch => {
                        state.set_branch_assistant_content(assistant_id, &accumulated);
                    }
                }
            })
            .await;

        if let Err(err) = result {
            tracing::error!(error = %err, %assistant_id, "response emission failed");
        }
        self.write().stream_end();
    }
}
