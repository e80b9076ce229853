//! Turn handler: one prompt in, one reply out.
//!
//! ```text
//! prompt ──→ push (user, prompt)
//!              │
//!     ┌────────┴─────────┐
//!     ▼                  ▼
//! [Unavailable]      [Available]
//!  placeholder        build(snapshot, credentials) → run(prompt)
//!  + warning             │
//!     │            ok ───┴─── fault
//!     │            │            │
//!     │          reply    "Error: …" + error notice
//!     └────────────┴────────────┘
//!                  ▼
//!        push (assistant, reply)
//! ```
//!
//! Faults never escape: they become the reply text so the session stays
//! usable for the next prompt. Nothing is retried.

use tracing::{error, info, warn};

use crate::agent::{AgentBackend, AgentError, AgentFactory};
use crate::config::{AgentConfig, Credentials};
use crate::session::{Role, Transcript};

/// Warning shown when the placeholder answers.
pub const PLACEHOLDER_WARNING: &str = "Agent implementation not found. Displaying mock response.";

/// A banner-worthy notice produced by a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Warning(t) | Notice::Error(t) => t,
        }
    }
}

/// Result of a handled turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: String,
    pub notice: Option<Notice>,
}

/// Prompts the handler refuses before touching the transcript.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("prompt is empty")]
    EmptyPrompt,
}

/// Runs turns against the agent capability chosen at startup.
#[derive(Debug, Clone)]
pub struct TurnHandler {
    backend: AgentBackend,
}

impl TurnHandler {
    pub fn new(backend: AgentBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &AgentBackend {
        &self.backend
    }

    /// Handle one prompt. Appends exactly two turns on success.
    pub async fn handle(
        &self,
        transcript: &mut Transcript,
        prompt: &str,
        snapshot: &AgentConfig,
        credentials: &Credentials,
    ) -> Result<TurnOutcome, TurnError> {
        if prompt.trim().is_empty() {
            return Err(TurnError::EmptyPrompt);
        }
        let turn = transcript.len() / 2 + 1;
        transcript.push(Role::User, prompt);

        let outcome = match &self.backend {
            AgentBackend::Unavailable {
                reason,
                placeholder,
            } => {
                warn!(turn, %reason, "no agent available, answering with placeholder");
                TurnOutcome {
                    reply: placeholder.run(prompt).await,
                    notice: Some(Notice::Warning(PLACEHOLDER_WARNING.into())),
                }
            }
            AgentBackend::Available(factory) => {
                match invoke(factory.as_ref(), prompt, snapshot, credentials).await {
                    Ok(reply) => {
                        info!(turn, agent = factory.name(), reply_len = reply.len(), "agent replied");
                        TurnOutcome {
                            reply,
                            notice: None,
                        }
                    }
                    Err(e) => {
                        error!(turn, agent = factory.name(), error = %e, "agent turn failed");
                        TurnOutcome {
                            reply: format!("Error: {e}"),
                            notice: Some(Notice::Error(format!("An error occurred: {e}"))),
                        }
                    }
                }
            }
        };

        transcript.push(Role::Assistant, outcome.reply.as_str());
        Ok(outcome)
    }
}

async fn invoke(
    factory: &dyn AgentFactory,
    prompt: &str,
    snapshot: &AgentConfig,
    credentials: &Credentials,
) -> Result<String, AgentError> {
    let agent = factory.build(snapshot, credentials)?;
    agent.run(prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct EchoAgent(String);

    #[async_trait]
    impl Agent for EchoAgent {
        async fn run(&self, prompt: &str) -> Result<String, AgentError> {
            Ok(format!("[{}] {prompt}", self.0))
        }
    }

    /// Records the snapshot each build receives.
    #[derive(Default)]
    struct RecordingFactory {
        seen: Arc<Mutex<Vec<AgentConfig>>>,
    }

    impl AgentFactory for RecordingFactory {
        fn name(&self) -> &str {
            "recording"
        }

        fn build(
            &self,
            config: &AgentConfig,
            _credentials: &Credentials,
        ) -> Result<Box<dyn Agent>, AgentError> {
            self.seen.lock().unwrap().push(config.clone());
            Ok(Box::new(EchoAgent(config.chat_model.clone())))
        }
    }

    struct FailingBuild;

    impl AgentFactory for FailingBuild {
        fn name(&self) -> &str {
            "failing"
        }

        fn build(
            &self,
            _config: &AgentConfig,
            _credentials: &Credentials,
        ) -> Result<Box<dyn Agent>, AgentError> {
            Err(AgentError::Reported("missing OPENAI_API_KEY".into()))
        }
    }

    fn placeholder_handler() -> TurnHandler {
        TurnHandler::new(AgentBackend::unavailable("test", Duration::ZERO))
    }

    #[tokio::test]
    async fn empty_prompt_appends_nothing() {
        let handler = placeholder_handler();
        let mut transcript = Transcript::new();
        let err = handler
            .handle(&mut transcript, "   ", &AgentConfig::default(), &Credentials::default())
            .await
            .unwrap_err();
        assert_eq!(err, TurnError::EmptyPrompt);
        assert!(transcript.is_empty());
    }

    #[tokio::test]
    async fn placeholder_turn_warns_and_echoes() {
        let handler = placeholder_handler();
        let mut transcript = Transcript::new();
        let outcome = handler
            .handle(&mut transcript, "Hello", &AgentConfig::default(), &Credentials::default())
            .await
            .unwrap();

        assert!(outcome.reply.contains("Hello"));
        assert_eq!(outcome.notice, Some(Notice::Warning(PLACEHOLDER_WARNING.into())));
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[0].role, Role::User);
        assert_eq!(transcript.turns()[0].text, "Hello");
        assert_eq!(transcript.turns()[1].role, Role::Assistant);
        assert_eq!(transcript.turns()[1].text, outcome.reply);
    }

    #[tokio::test]
    async fn available_agent_gets_snapshot() {
        let factory = RecordingFactory::default();
        let seen = factory.seen.clone();
        let handler = TurnHandler::new(AgentBackend::available(factory));
        let mut snapshot = AgentConfig::default();
        snapshot.chat_model = "gpt-4".into();

        let mut transcript = Transcript::new();
        let outcome = handler
            .handle(&mut transcript, "hi", &snapshot, &Credentials::default())
            .await
            .unwrap();

        assert_eq!(outcome.reply, "[gpt-4] hi");
        assert!(outcome.notice.is_none());
        assert_eq!(seen.lock().unwrap().as_slice(), [snapshot]);
    }

    #[tokio::test]
    async fn build_fault_becomes_reply_and_session_continues() {
        let handler = TurnHandler::new(AgentBackend::available(FailingBuild));
        let mut transcript = Transcript::new();
        let snapshot = AgentConfig::default();
        let creds = Credentials::default();

        let first = handler.handle(&mut transcript, "one", &snapshot, &creds).await.unwrap();
        assert_eq!(first.reply, "Error: missing OPENAI_API_KEY");
        assert_eq!(
            first.notice,
            Some(Notice::Error("An error occurred: missing OPENAI_API_KEY".into()))
        );

        let second = handler.handle(&mut transcript, "two", &snapshot, &creds).await.unwrap();
        assert!(second.reply.contains("missing OPENAI_API_KEY"));
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript.turns()[2].text, "two");
    }
}
