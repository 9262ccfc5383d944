use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Canned reply streamed for main-flow sends.
pub const DEFAULT_REPLY: &str = "That's a good question! Let me walk through it. \
In software development, understanding the core concept matters more than memorizing \
the mechanics. Every technical decision should be weighed against the concrete \
requirements of the situation at hand. Hope this helps!";

/// Canned reply streamed for sends inside a branch.
pub const BRANCH_REPLY: &str = "About the passage you selected: there is more to \
unpack here. The idea has several interesting extensions in practice, and the \
trade-offs only become clear once you apply it to a concrete scenario and weigh \
the alternatives against each other.";

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("response emission interrupted: {0}")]
    Interrupted(String),
}

/// A response-emission collaborator: delivers `source_text` to `on_token`
/// one token at a time, in order, then completes or fails. Stands in for a
/// real completion stream; the session only depends on this contract.
pub trait ResponseEmitter: Send + Sync {
    fn emit<F>(
        &self,
        source_text: &str,
        on_token: F,
    ) -> impl Future<Output = Result<(), EmitError>> + Send
    where
        F: FnMut(char) + Send;
}

/// Character-by-character emitter with a fixed per-token delay, suspending
/// between emissions so the rest of the process stays responsive.
#[derive(Debug, Clone)]
pub struct SimulatedEmitter {
    delay: Duration,
}

impl SimulatedEmitter {
    pub fn new(delay_ms: u64) -> Self {
        SimulatedEmitter {
            delay: Duration::from_millis(delay_ms),
        }
    }
}

impl Default for SimulatedEmitter {
    fn default() -> Self {
        SimulatedEmitter::new(30)
    }
}

impl ResponseEmitter for SimulatedEmitter {
    async fn emit<F>(&self, source_text: &str, mut on_token: F) -> Result<(), EmitError>
    where
        F: FnMut(char) + Send,
    {
        for ch in source_text.chars() {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            on_token(ch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_delivers_all_tokens_in_order() {
        let emitter = SimulatedEmitter::new(0);
        let mut collected = String::new();

        emitter
            .emit("abc def", |ch| collected.push(ch))
            .await
            .unwrap();

        assert_eq!(collected, "abc def");
    }
}
