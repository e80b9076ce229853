//! Agent capability: the external collaborator that answers prompts.
//!
//! The console never talks to a model directly. It holds an `AgentBackend`
//! chosen once at startup:
//!
//! - `Available`: a factory that builds an `Agent` client from the
//!   configuration snapshot and credentials of each turn.
//! - `Unavailable`: no agent is reachable; turns get a deterministic
//!   placeholder reply instead.

pub mod command;
pub mod placeholder;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{AgentConfig, BackendConfig, Credentials};

pub use command::CommandAgentFactory;
pub use placeholder::{placeholder_reply, PlaceholderAgent};

/// Faults raised while building or running an agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("invalid configuration: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("failed to start agent program '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("agent I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("agent exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("invalid agent reply: {0}")]
    InvalidReply(String),

    /// The agent ran and reported a failure of its own.
    #[error("{0}")]
    Reported(String),
}

/// A constructed agent client, good for one turn.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Run a prompt to completion and return the reply text.
    async fn run(&self, prompt: &str) -> Result<String, AgentError>;
}

/// Builds agent clients from a configuration snapshot.
pub trait AgentFactory: Send + Sync {
    /// Short name for logs and the status bar.
    fn name(&self) -> &str;

    /// Construct a client. Credentials are passed by value, never read from
    /// the process environment.
    fn build(
        &self,
        config: &AgentConfig,
        credentials: &Credentials,
    ) -> Result<Box<dyn Agent>, AgentError>;
}

/// The agent capability selected at startup.
#[derive(Clone)]
pub enum AgentBackend {
    Available(Arc<dyn AgentFactory>),
    Unavailable {
        reason: String,
        placeholder: PlaceholderAgent,
    },
}

impl std::fmt::Debug for AgentBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentBackend::Available(factory) => {
                f.debug_tuple("Available").field(&factory.name()).finish()
            }
            AgentBackend::Unavailable { reason, .. } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

impl AgentBackend {
    /// Wrap a factory as the available backend.
    pub fn available(factory: impl AgentFactory + 'static) -> Self {
        AgentBackend::Available(Arc::new(factory))
    }

    /// The degraded backend, answering with placeholders after `delay`.
    pub fn unavailable(reason: impl Into<String>, delay: Duration) -> Self {
        AgentBackend::Unavailable {
            reason: reason.into(),
            placeholder: PlaceholderAgent::new(delay),
        }
    }

    /// Pick the backend from config. A configured program that cannot be
    /// found degrades to the placeholder rather than failing startup.
    pub fn select(backend: &BackendConfig, placeholder_delay: Duration) -> Self {
        let Some((program, args)) = backend.program() else {
            let reason = "no agent program configured (set backend.command)";
            warn!(reason, "agent implementation not found");
            return Self::unavailable(reason, placeholder_delay);
        };

        match find_program(program) {
            Some(path) => {
                info!(program = %path.display(), "agent program found");
                Self::available(CommandAgentFactory::new(path, args.to_vec()))
            }
            None => {
                let reason = format!("agent program '{program}' not found");
                warn!(%reason, "agent implementation not found");
                Self::unavailable(reason, placeholder_delay)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, AgentBackend::Available(_))
    }

    /// One-line description for the status bar.
    pub fn describe(&self) -> String {
        match self {
            AgentBackend::Available(factory) => format!("agent: {}", factory.name()),
            AgentBackend::Unavailable { .. } => "agent: placeholder".into(),
        }
    }
}

/// Resolve a program name the way a shell would: paths with a separator are
/// checked directly, bare names are searched on `PATH`.
pub fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        let full = dir.join(program);
        if full.is_file() {
            return Some(full);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{program}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedFactory;

    impl AgentFactory for NamedFactory {
        fn name(&self) -> &str {
            "named"
        }

        fn build(
            &self,
            _config: &AgentConfig,
            _credentials: &Credentials,
        ) -> Result<Box<dyn Agent>, AgentError> {
            Err(AgentError::Reported("not used".into()))
        }
    }

    #[test]
    fn empty_backend_is_unavailable() {
        let backend = AgentBackend::select(&BackendConfig::default(), Duration::ZERO);
        assert!(!backend.is_available());
        assert_eq!(backend.describe(), "agent: placeholder");
    }

    #[test]
    fn missing_program_is_unavailable() {
        let config = BackendConfig {
            command: vec!["definitely-not-a-real-agent-binary-4821".into()],
        };
        let backend = AgentBackend::select(&config, Duration::ZERO);
        match backend {
            AgentBackend::Unavailable { reason, .. } => assert!(reason.contains("not found")),
            AgentBackend::Available(_) => panic!("expected unavailable backend"),
        }
    }

    #[test]
    fn existing_path_is_available() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("agent.sh");
        std::fs::write(&script, "#!/bin/sh\n").unwrap();
        let config = BackendConfig {
            command: vec![script.display().to_string(), "--flag".into()],
        };
        let backend = AgentBackend::select(&config, Duration::ZERO);
        assert!(backend.is_available());
        assert!(backend.describe().contains("agent.sh"));
    }

    #[test]
    fn available_describes_factory() {
        let backend = AgentBackend::available(NamedFactory);
        assert_eq!(backend.describe(), "agent: named");
        assert!(format!("{backend:?}").contains("named"));
    }

    #[test]
    fn error_display() {
        let err = AgentError::Exit {
            status: "exit status: 2".into(),
            stderr: "boom".into(),
        };
        assert!(err.to_string().contains("boom"));
        assert_eq!(AgentError::Reported("quota exceeded".into()).to_string(), "quota exceeded");
    }
}
