//! Placeholder replies for when no agent is reachable.

use std::time::Duration;

/// The reply given for `prompt` when no agent is reachable.
pub fn placeholder_reply(prompt: &str) -> String {
    format!(
        "This is a placeholder response. You asked: '{prompt}'\n\n\
         No agent program is connected. Set `backend.command` in \
         .agentzero/config.yaml to route prompts to a real agent."
    )
}

/// Stand-in agent: pauses, then echoes the prompt back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderAgent {
    delay: Duration,
}

impl PlaceholderAgent {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Simulated thinking time, then the deterministic reply.
    pub async fn run(&self, prompt: &str) -> String {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        placeholder_reply(prompt)
    }
}
