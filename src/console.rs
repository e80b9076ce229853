//! Console: the state both surfaces drive.
//!
//! Holds the session, the live configuration the user is editing, the
//! credentials and the turn handler. Each submitted prompt gets a fresh
//! clone of the configuration as its snapshot.

use std::path::Path;

use tracing::{debug, info};

use crate::commands::{self, Command};
use crate::config::{AgentConfig, ConfigError, Credentials, EnvSink, ModelSlot, ProcessEnv, Provider, Temperature};
use crate::session::Session;
use crate::turn::{TurnError, TurnHandler, TurnOutcome};
use crate::uploads::UploadError;

/// About text, shown by `/about` and the F1 overlay.
pub const ABOUT_TEXT: &str = "\
# Agent Zero

This is an interactive console for Agent Zero, a language model-based assistant.

## Features
- Chat with the agent using natural language
- Configure model parameters
- Upload documents for analysis

## Usage
1. Configure the model in the sidebar (Tab, then arrow keys) or with /model
2. Enter your query in the chat input
3. Upload documents with /upload if needed for context

For more information, visit https://github.com/DeepFriedCyber/agent-zero";

/// Result of running a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Text to show the user (None = silent).
    pub feedback: Option<String>,
    /// The user asked to leave.
    pub quit: bool,
}

impl CommandOutput {
    fn say(text: impl Into<String>) -> Self {
        Self {
            feedback: Some(text.into()),
            quit: false,
        }
    }
}

/// What the user's input turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Turn(TurnOutcome),
    Command(CommandOutput),
    /// Blank input, nothing happened.
    Ignored,
}

/// Session state plus everything needed to run a turn.
pub struct Console {
    session: Session,
    config: AgentConfig,
    credentials: Credentials,
    handler: TurnHandler,
    export_env: bool,
}

impl Console {
    pub fn new(handler: TurnHandler, config: AgentConfig, credentials: Credentials) -> Self {
        let session = Session::new();
        info!(
            session = %session.id,
            backend = %handler.backend().describe(),
            "session started"
        );
        Self {
            session,
            config,
            credentials,
            handler,
            export_env: false,
        }
    }

    /// Also write credentials into the process environment when they are set.
    pub fn with_env_export(mut self, export: bool) -> Self {
        self.export_env = export;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn handler(&self) -> &TurnHandler {
        &self.handler
    }

    /// The configuration a prompt submitted now would run with.
    pub fn snapshot(&self) -> AgentConfig {
        self.config.clone()
    }

    /// Run one prompt through the turn handler.
    pub async fn submit_prompt(&mut self, prompt: &str) -> Result<TurnOutcome, TurnError> {
        let snapshot = self.snapshot();
        debug!(session = %self.session.id, chat_model = %snapshot.chat_model, "submitting prompt");
        self.handler
            .handle(
                &mut self.session.transcript,
                prompt,
                &snapshot,
                &self.credentials,
            )
            .await
    }

    /// Route a line of input: commands start with `/`, anything else is a prompt.
    pub async fn submit(&mut self, input: &str) -> Submission {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Submission::Ignored;
        }
        if trimmed.starts_with('/') {
            let output = match commands::parse(trimmed) {
                Ok(cmd) => self.execute(cmd).await,
                Err(e) => CommandOutput::say(e.to_string()),
            };
            return Submission::Command(output);
        }
        match self.submit_prompt(input).await {
            Ok(outcome) => Submission::Turn(outcome),
            Err(TurnError::EmptyPrompt) => Submission::Ignored,
        }
    }

    /// Execute a parsed command.
    pub async fn execute(&mut self, cmd: Command) -> CommandOutput {
        match cmd {
            Command::Help => CommandOutput::say(commands::help_text()),
            Command::Exit => CommandOutput {
                feedback: None,
                quit: true,
            },
            Command::Model { slot, model } => match self.set_model(slot, &model) {
                Ok(()) => CommandOutput::say(format!("{} set to {model}", slot.label())),
                Err(e) => CommandOutput::say(format!(
                    "{e}. Options: {}",
                    slot.options().join(", ")
                )),
            },
            Command::Temperature(t) => {
                self.set_temperature(t);
                CommandOutput::say(format!("Temperature set to {t}"))
            }
            Command::MaxTokens(n) => match self.set_max_tokens(n) {
                Ok(()) => CommandOutput::say(match n {
                    Some(n) => format!("Max tokens set to {n}"),
                    None => "Max tokens cleared".into(),
                }),
                Err(e) => CommandOutput::say(e.to_string()),
            },
            Command::Key { provider, value } => {
                if self.set_credential(provider, &value) {
                    CommandOutput::say(format!("{} stored", provider.label()))
                } else {
                    CommandOutput::say(format!("{} unchanged (empty value)", provider.label()))
                }
            }
            Command::Upload(path) => match self.upload(&path).await {
                Ok(()) => CommandOutput::say(self.session.uploads.report()),
                Err(e) => CommandOutput::say(e.to_string()),
            },
            Command::Files => CommandOutput::say(self.session.uploads.report()),
            Command::Config => CommandOutput::say(format!(
                "Configuration:\n{}\n  {:<17} {}\n  {:<17} {}",
                self.config.describe(),
                Provider::OpenAi.label(),
                key_state(&self.credentials, Provider::OpenAi),
                Provider::Anthropic.label(),
                key_state(&self.credentials, Provider::Anthropic),
            )),
            Command::About => CommandOutput::say(ABOUT_TEXT),
        }
    }

    pub fn set_model(&mut self, slot: ModelSlot, model: &str) -> Result<(), ConfigError> {
        self.config.set_model(slot, model)?;
        info!(slot = %slot, model, "model selected");
        Ok(())
    }

    pub fn cycle_model(&mut self, slot: ModelSlot, forward: bool) {
        self.config.cycle_model(slot, forward);
        debug!(slot = %slot, model = self.config.model(slot), "model cycled");
    }

    pub fn set_temperature(&mut self, temperature: Temperature) {
        self.config.temperature = temperature;
    }

    /// Move the temperature slider by whole steps.
    pub fn nudge_temperature(&mut self, steps: i8) {
        self.config.temperature = self.config.temperature.nudge(steps);
    }

    pub fn set_max_tokens(&mut self, max_tokens: Option<u32>) -> Result<(), ConfigError> {
        self.config.set_max_tokens(max_tokens)
    }

    /// Store a key; exports it to the process environment when enabled.
    /// An empty value is ignored. Returns true if the key was stored.
    pub fn set_credential(&mut self, provider: Provider, value: &str) -> bool {
        if self.export_env {
            self.set_credential_into(provider, value, &mut ProcessEnv)
        } else {
            self.store_credential(provider, value)
        }
    }

    /// Store a key and write it to `sink`. An empty value touches neither.
    pub fn set_credential_into(
        &mut self,
        provider: Provider,
        value: &str,
        sink: &mut impl EnvSink,
    ) -> bool {
        let stored = self.store_credential(provider, value);
        if stored {
            self.credentials.export_one(provider, sink);
            debug!(var = provider.env_var(), "credential exported");
        }
        stored
    }

    fn store_credential(&mut self, provider: Provider, value: &str) -> bool {
        let stored = self.credentials.set(provider, value);
        if stored {
            info!(provider = provider.key(), "credential stored");
        }
        stored
    }

    pub async fn upload(&mut self, path: &Path) -> Result<(), UploadError> {
        self.session.uploads.load(path).await.map(|_| ())
    }
}

fn key_state(credentials: &Credentials, provider: Provider) -> &'static str {
    if credentials.is_set(provider) {
        "set"
    } else {
        "not set"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentBackend;
    use crate::session::Role;
    use std::collections::HashMap;
    use std::time::Duration;

    fn console() -> Console {
        Console::new(
            TurnHandler::new(AgentBackend::unavailable("test", Duration::ZERO)),
            AgentConfig::default(),
            Credentials::default(),
        )
    }

    #[tokio::test]
    async fn prompt_appends_two_turns() {
        let mut c = console();
        let result = c.submit("Hello").await;
        assert!(matches!(result, Submission::Turn(_)));
        let turns = c.session().transcript.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
        assert!(turns[1].text.contains("Hello"));
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let mut c = console();
        assert_eq!(c.submit("   ").await, Submission::Ignored);
        assert!(c.session().transcript.is_empty());
    }

    #[tokio::test]
    async fn commands_do_not_touch_transcript() {
        let mut c = console();
        let out = c.submit("/model chat claude-2").await;
        assert_eq!(
            out,
            Submission::Command(CommandOutput::say("Chat Model set to claude-2"))
        );
        assert_eq!(c.config().chat_model, "claude-2");
        assert!(c.session().transcript.is_empty());
    }

    #[tokio::test]
    async fn bad_model_lists_options() {
        let mut c = console();
        let Submission::Command(out) = c.submit("/model browser claude-2").await else {
            panic!("expected command output");
        };
        let text = out.feedback.unwrap();
        assert!(text.contains("gpt-3.5-turbo, gpt-4"));
        assert_eq!(c.config().browser_model, "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn exit_requests_quit() {
        let mut c = console();
        let Submission::Command(out) = c.submit("/exit").await else {
            panic!("expected command output");
        };
        assert!(out.quit);
    }

    #[tokio::test]
    async fn snapshot_tracks_edits() {
        let mut c = console();
        c.nudge_temperature(-7);
        c.set_max_tokens(Some(256)).unwrap();
        let snap = c.snapshot();
        assert_eq!(snap.temperature, Temperature::MIN);
        assert_eq!(snap.max_tokens, Some(256));
    }

    #[test]
    fn credential_export_only_when_non_empty() {
        let mut c = console();
        let mut env: HashMap<String, String> = HashMap::new();

        assert!(!c.set_credential_into(Provider::OpenAi, "", &mut env));
        assert!(env.is_empty());

        assert!(c.set_credential_into(Provider::OpenAi, "sk-live", &mut env));
        assert_eq!(env["OPENAI_API_KEY"], "sk-live");

        assert!(!c.set_credential_into(Provider::OpenAi, "", &mut env));
        assert_eq!(env["OPENAI_API_KEY"], "sk-live");
        assert_eq!(c.credentials().get(Provider::OpenAi), Some("sk-live"));
    }

    #[tokio::test]
    async fn config_command_masks_keys() {
        let mut c = console();
        c.set_credential(Provider::Anthropic, "sk-ant-secret");
        let out = c.execute(Command::Config).await;
        let text = out.feedback.unwrap();
        assert!(text.contains("Chat Model"));
        assert!(!text.contains("sk-ant-secret"));
        assert!(text.contains("set"));
    }

    #[tokio::test]
    async fn upload_failure_is_feedback() {
        let mut c = console();
        let out = c.execute(Command::Upload("/no/such/file.txt".into())).await;
        assert!(out.feedback.unwrap().contains("failed to read"));
        assert!(c.session().uploads.is_empty());
    }
}
