//! Console configuration: snapshot defaults, agent backend, placeholder delay.
//!
//! User-level config: `~/.agentzero/config.yaml`
//! Project-level config: `.agentzero/config.yaml` (fields present here win)
//!
//! Resolution: project config → user config → built-in defaults. CLI flags
//! are applied on top by the binary.

pub mod credentials;
pub mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use credentials::{Credentials, EnvSink, ProcessEnv, Provider};
pub use schema::{AgentConfig, ModelSlot, Temperature};

/// Errors from loading or editing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown {slot} model '{model}'")]
    UnknownModel { slot: ModelSlot, model: String },

    #[error("temperature {0} is outside 0.0..=1.0")]
    TemperatureOutOfRange(f32),

    #[error("max tokens must be greater than zero")]
    InvalidMaxTokens,

    #[error("backend command is empty")]
    EmptyCommand,
}

/// Default pause before a placeholder reply.
pub const DEFAULT_PLACEHOLDER_DELAY_MS: u64 = 2000;

/// How to reach the external agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Agent program and its arguments. Empty means no agent is configured.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
}

impl BackendConfig {
    /// Program name and arguments, if a command is configured.
    pub fn program(&self) -> Option<(&str, &[String])> {
        self.command
            .split_first()
            .map(|(program, args)| (program.as_str(), args))
    }
}

/// Effective console configuration after merging files.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    pub agent: AgentConfig,
    pub backend: BackendConfig,
    pub placeholder_delay: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            backend: BackendConfig::default(),
            placeholder_delay: Duration::from_millis(DEFAULT_PLACEHOLDER_DELAY_MS),
        }
    }
}

/// Snapshot defaults as written in a file. Every field is optional so a
/// project file can override a single value.
#[derive(Debug, Clone, Default, Deserialize)]
struct AgentFile {
    chat_model: Option<String>,
    utility_model: Option<String>,
    embeddings_model: Option<String>,
    browser_model: Option<String>,
    temperature: Option<Temperature>,
    max_tokens: Option<u32>,
}

/// On-disk layout of a config file.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    agent: Option<AgentFile>,
    #[serde(default)]
    backend: Option<BackendConfig>,
    #[serde(default)]
    placeholder_delay_ms: Option<u64>,
}

/// Path to `~/.agentzero/`.
pub fn dirs_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|p| PathBuf::from(p).join(".agentzero"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME")
            .ok()
            .map(|p| PathBuf::from(p).join(".agentzero"))
    }
}

/// Path to the user-level config file.
fn user_config_path() -> Option<PathBuf> {
    dirs_path().map(|p| p.join("config.yaml"))
}

/// Path to the project-level config file.
fn project_config_path() -> PathBuf {
    PathBuf::from(".agentzero").join("config.yaml")
}

impl ConsoleConfig {
    /// Load the user file, then the project file on top.
    pub fn load() -> Result<Self, ConfigError> {
        let mut paths = Vec::new();
        if let Some(user) = user_config_path() {
            paths.push(user);
        }
        paths.push(project_config_path());
        Self::load_layers(&paths)
    }

    /// Merge the given files in order. Missing files are skipped.
    pub fn load_layers(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for path in paths {
            if let Some(file) = read_file(path)? {
                config.merge(file, path)?;
            }
        }
        Ok(config)
    }

    /// Load exactly one file, which must exist.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::default();
        config.merge(parse(&content, path)?, path)?;
        Ok(config)
    }

    fn merge(&mut self, file: ConfigFile, path: &Path) -> Result<(), ConfigError> {
        if let Some(agent) = file.agent {
            let slots = [
                (ModelSlot::Chat, agent.chat_model),
                (ModelSlot::Utility, agent.utility_model),
                (ModelSlot::Embeddings, agent.embeddings_model),
                (ModelSlot::Browser, agent.browser_model),
            ];
            for (slot, model) in slots {
                if let Some(model) = model {
                    self.agent.set_model(slot, &model)?;
                }
            }
            if let Some(temperature) = agent.temperature {
                self.agent.temperature = temperature;
            }
            if agent.max_tokens.is_some() {
                self.agent.set_max_tokens(agent.max_tokens)?;
            }
        }
        if let Some(backend) = file.backend {
            if backend.command.iter().all(|part| part.trim().is_empty())
                && !backend.command.is_empty()
            {
                return Err(ConfigError::EmptyCommand);
            }
            self.backend = backend;
        }
        if let Some(ms) = file.placeholder_delay_ms {
            self.placeholder_delay = Duration::from_millis(ms);
        }
        tracing::debug!(path = %path.display(), "merged config file");
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse(&content, path).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse(content: &str, path: &Path) -> Result<ConfigFile, ConfigError> {
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_files_give_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConsoleConfig::load_layers(&[dir.path().join("nope.yaml")]).unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.placeholder_delay, Duration::from_millis(2000));
    }

    #[test]
    fn load_from_yaml_string() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "config.yaml",
            r#"
agent:
  chat_model: gpt-4
  temperature: 0.2
  max_tokens: 1024
backend:
  command: [python3, bridge.py]
placeholder_delay_ms: 10
"#,
        );
        let config = ConsoleConfig::load_file(&path).unwrap();
        assert_eq!(config.agent.chat_model, "gpt-4");
        assert_eq!(config.agent.temperature.to_string(), "0.2");
        assert_eq!(config.agent.max_tokens, Some(1024));
        assert_eq!(config.agent.utility_model, "gpt-3.5-turbo");
        let (program, args) = config.backend.program().unwrap();
        assert_eq!(program, "python3");
        assert_eq!(args, ["bridge.py".to_string()]);
        assert_eq!(config.placeholder_delay, Duration::from_millis(10));
    }

    #[test]
    fn project_layer_overrides_user_layer() {
        let dir = TempDir::new().unwrap();
        let user = write(
            &dir,
            "user.yaml",
            "agent:\n  chat_model: gpt-4\n  browser_model: gpt-4\nplaceholder_delay_ms: 50\n",
        );
        let project = write(&dir, "project.yaml", "agent:\n  chat_model: claude-2\n");
        let config = ConsoleConfig::load_layers(&[user, project]).unwrap();
        assert_eq!(config.agent.chat_model, "claude-2");
        assert_eq!(config.agent.browser_model, "gpt-4");
        assert_eq!(config.placeholder_delay, Duration::from_millis(50));
    }

    #[test]
    fn unknown_model_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.yaml", "agent:\n  embeddings_model: gpt-4\n");
        let err = ConsoleConfig::load_file(&path).unwrap_err();
        assert!(err.to_string().contains("embeddings"));
        assert!(err.to_string().contains("gpt-4"));
    }

    #[test]
    fn malformed_yaml_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.yaml", "agent: [not, a, map\n");
        let err = ConsoleConfig::load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn blank_command_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.yaml", "backend:\n  command: ['  ']\n");
        assert!(matches!(
            ConsoleConfig::load_file(&path),
            Err(ConfigError::EmptyCommand)
        ));
    }

    #[test]
    fn load_file_requires_existence() {
        let dir = TempDir::new().unwrap();
        let err = ConsoleConfig::load_file(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn empty_file_is_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.yaml", "\n");
        assert_eq!(ConsoleConfig::load_file(&path).unwrap(), ConsoleConfig::default());
    }
}
