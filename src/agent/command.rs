//! CommandAgent: runs an external agent program once per turn.
//!
//! ## Protocol
//!
//! stdin (one JSON object, then EOF):
//! ```json
//! {"prompt": "Hello", "config": {"chat_model": "gpt-4", "temperature": 0.7, ...}}
//! ```
//!
//! stdout (one JSON object):
//! ```json
//! {"reply": "Hi there"}      // success
//! {"error": "quota exceeded"} // agent-reported failure
//! ```
//!
//! Credentials reach the child only through its environment
//! (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`). The console's own environment
//! is not modified. There is no timeout.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::{AgentConfig, Credentials};

use super::{Agent, AgentError, AgentFactory};

/// Upper bound on stderr text carried into an error message.
const MAX_STDERR: usize = 2 * 1024;

#[derive(Debug, Serialize)]
struct AgentRequest<'a> {
    prompt: &'a str,
    config: &'a AgentConfig,
}

#[derive(Debug, Deserialize)]
struct AgentReply {
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Factory for agents backed by an external program.
#[derive(Debug, Clone)]
pub struct CommandAgentFactory {
    program: PathBuf,
    args: Vec<String>,
    name: String,
}

impl CommandAgentFactory {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        let program = program.into();
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        Self {
            program,
            args,
            name,
        }
    }
}

impl AgentFactory for CommandAgentFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(
        &self,
        config: &AgentConfig,
        credentials: &Credentials,
    ) -> Result<Box<dyn Agent>, AgentError> {
        Ok(Box::new(self.command_agent(config, credentials)?))
    }
}

impl CommandAgentFactory {
    fn command_agent(
        &self,
        config: &AgentConfig,
        credentials: &Credentials,
    ) -> Result<CommandAgent, AgentError> {
        config.validate()?;
        let env = credentials
            .env_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Ok(CommandAgent {
            program: self.program.clone(),
            args: self.args.clone(),
            config: config.clone(),
            env,
        })
    }
}

/// One turn's worth of agent program invocation.
#[derive(Debug)]
pub struct CommandAgent {
    program: PathBuf,
    args: Vec<String>,
    config: AgentConfig,
    env: Vec<(String, String)>,
}

impl CommandAgent {
    fn truncate_stderr(s: &str) -> String {
        let s = s.trim();
        if s.len() <= MAX_STDERR {
            return s.to_string();
        }
        let mut end = MAX_STDERR;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &s[..end])
    }
}

#[async_trait]
impl Agent for CommandAgent {
    async fn run(&self, prompt: &str) -> Result<String, AgentError> {
        let request = serde_json::to_vec(&AgentRequest {
            prompt,
            config: &self.config,
        })
        .map_err(|e| AgentError::InvalidReply(format!("failed to encode request: {e}")))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AgentError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        // Feed stdin while stdout and stderr drain, so neither pipe can fill
        // up and stall the other side.
        let stdin = child.stdin.take();
        let feed = async move {
            let Some(mut stdin) = stdin else {
                return Ok::<(), std::io::Error>(());
            };
            stdin.write_all(&request).await?;
            stdin.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        if let Err(e) = fed {
            // A program may answer without reading its input.
            if e.kind() != ErrorKind::BrokenPipe {
                return Err(AgentError::Io(e));
            }
            debug!(program = %self.program.display(), "agent program closed stdin early");
        }
        debug!(
            program = %self.program.display(),
            status = %output.status,
            stdout_bytes = output.stdout.len(),
            "agent program finished"
        );

        if !output.status.success() {
            return Err(AgentError::Exit {
                status: output.status.to_string(),
                stderr: Self::truncate_stderr(&String::from_utf8_lossy(&output.stderr)),
            });
        }

        let reply: AgentReply = serde_json::from_slice(&output.stdout)
            .map_err(|e| AgentError::InvalidReply(format!("expected JSON object on stdout: {e}")))?;

        match (reply.reply, reply.error) {
            (_, Some(error)) => Err(AgentError::Reported(error)),
            (Some(text), None) => Ok(text),
            (None, None) => Err(AgentError::InvalidReply(
                "reply object has neither 'reply' nor 'error'".into(),
            )),
        }
    }
}
