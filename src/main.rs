use std::fs::{self, OpenOptions};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use agentzero::agent::AgentBackend;
use agentzero::config::{self, ConsoleConfig, Credentials, ModelSlot, Temperature};
use agentzero::console::Console;
use agentzero::repl::run_repl;
use agentzero::tui::run_tui;
use agentzero::turn::TurnHandler;

#[derive(Parser)]
#[command(name = "agentzero", version, about = "Interactive console for Agent Zero.")]
struct Cli {
    /// Read configuration from this file instead of ~/.agentzero and .agentzero
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Line console instead of the full-screen interface
    #[arg(long)]
    plain: bool,

    /// Chat model for this run
    #[arg(long)]
    chat_model: Option<String>,

    /// Sampling temperature (0.0 to 1.0)
    #[arg(long)]
    temperature: Option<f32>,

    /// Upper bound on generated tokens
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Attach a file before the first prompt (repeatable)
    #[arg(long = "upload")]
    uploads: Vec<PathBuf>,

    /// Also write API keys into this process's environment when set
    #[arg(long)]
    export_credentials: bool,

    /// Log file for the full-screen interface
    #[arg(long)]
    log_file: Option<PathBuf>,
}

const DEFAULT_LOG_DIRECTIVE: &str = "agentzero=info";

/// `RUST_LOG` when set and valid, else the crate default.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

fn init_logging(cli: &Cli, plain: bool) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(rust_log.as_deref());
    if plain {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    // The terminal belongs to the interface; logs go to a file.
    let path = match &cli.log_file {
        Some(path) => path.clone(),
        None => config::dirs_path()
            .context("cannot locate home directory for the log file; pass --log-file")?
            .join("agentzero.log"),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ConsoleConfig> {
    let mut loaded = match &cli.config {
        Some(path) => ConsoleConfig::load_file(path)?,
        None => ConsoleConfig::load()?,
    };
    let agent = &mut loaded.agent;
    if let Some(model) = &cli.chat_model {
        agent.set_model(ModelSlot::Chat, model)?;
    }
    if let Some(t) = cli.temperature {
        agent.temperature = Temperature::new(t)?;
    }
    if cli.max_tokens.is_some() {
        agent.set_max_tokens(cli.max_tokens)?;
    }
    Ok(loaded)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
    let plain = cli.plain || !interactive;

    init_logging(&cli, plain)?;

    let loaded = load_config(&cli)?;
    let backend = AgentBackend::select(&loaded.backend, loaded.placeholder_delay);
    info!(backend = %backend.describe(), plain, "Agent Zero starting");

    let mut console = Console::new(
        TurnHandler::new(backend),
        loaded.agent,
        Credentials::from_env(),
    )
    .with_env_export(cli.export_credentials);

    for path in &cli.uploads {
        if let Err(e) = console.upload(path).await {
            warn!(path = %path.display(), error = %e, "upload failed");
            eprintln!("{e}");
        }
    }

    if plain {
        let reader = tokio::io::BufReader::new(tokio::io::stdin());
        let mut writer = tokio::io::stdout();
        run_repl(&mut console, reader, &mut writer, interactive).await
    } else {
        run_tui(console).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn rust_log_overrides_default_level() {
        let filter = log_filter(Some("agentzero=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn default_level_without_rust_log() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
    }
}
