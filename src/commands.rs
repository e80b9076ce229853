//! Slash commands for the chat input.
//!
//! Commands start with `/` and are intercepted before reaching the agent.
//! Both the terminal interface and the line console parse input through
//! here. Ghost-text autocomplete suggests commands as you type.

use std::path::PathBuf;

use crate::config::{ModelSlot, Provider, Temperature};

/// A slash command definition.
#[derive(Debug, PartialEq)]
pub struct SlashCommand {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub description: &'static str,
    pub has_arg: bool,
}

/// All known commands.
pub static COMMANDS: &[SlashCommand] = &[
    SlashCommand {
        name: "/help",
        aliases: &[],
        usage: "",
        description: "List available commands",
        has_arg: false,
    },
    SlashCommand {
        name: "/model",
        aliases: &[],
        usage: "<chat|utility|embeddings|browser> <model>",
        description: "Select the model for a slot",
        has_arg: true,
    },
    SlashCommand {
        name: "/temperature",
        aliases: &["/temp"],
        usage: "<0.0-1.0>",
        description: "Set sampling temperature",
        has_arg: true,
    },
    SlashCommand {
        name: "/max-tokens",
        aliases: &[],
        usage: "<n|off>",
        description: "Set or clear the max token bound",
        has_arg: true,
    },
    SlashCommand {
        name: "/key",
        aliases: &[],
        usage: "<openai|anthropic> <value>",
        description: "Store an API key (empty value keeps the current one)",
        has_arg: true,
    },
    SlashCommand {
        name: "/upload",
        aliases: &[],
        usage: "<path>",
        description: "Attach a file for the agent",
        has_arg: true,
    },
    SlashCommand {
        name: "/files",
        aliases: &[],
        usage: "",
        description: "List attached files",
        has_arg: false,
    },
    SlashCommand {
        name: "/config",
        aliases: &[],
        usage: "",
        description: "Show the current configuration",
        has_arg: false,
    },
    SlashCommand {
        name: "/about",
        aliases: &[],
        usage: "",
        description: "About Agent Zero",
        has_arg: false,
    },
    SlashCommand {
        name: "/exit",
        aliases: &["/quit"],
        usage: "",
        description: "Quit",
        has_arg: false,
    },
];

/// A parsed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Model { slot: ModelSlot, model: String },
    Temperature(Temperature),
    MaxTokens(Option<u32>),
    Key { provider: Provider, value: String },
    Upload(PathBuf),
    Files,
    Config,
    About,
    Exit,
}

/// Why a command line could not be parsed. Shown to the user as feedback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {name} {usage}")]
    Usage {
        name: &'static str,
        usage: &'static str,
    },

    #[error("{0}")]
    Invalid(String),
}

fn usage(name: &str) -> CommandError {
    let cmd = COMMANDS
        .iter()
        .find(|c| c.name == name)
        .unwrap_or(&COMMANDS[0]);
    CommandError::Usage {
        name: cmd.name,
        usage: cmd.usage,
    }
}

/// Find a command by exact name or alias.
fn lookup(name: &str) -> Option<&'static SlashCommand> {
    COMMANDS
        .iter()
        .find(|c| c.name == name || c.aliases.contains(&name))
}

/// Parse a line that starts with `/`.
pub fn parse(input: &str) -> Result<Command, CommandError> {
    let input = input.trim();
    let (head, rest) = match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    };
    let cmd = lookup(head).ok_or_else(|| CommandError::Unknown(head.to_string()))?;

    match cmd.name {
        "/help" => Ok(Command::Help),
        "/files" => Ok(Command::Files),
        "/config" => Ok(Command::Config),
        "/about" => Ok(Command::About),
        "/exit" => Ok(Command::Exit),
        "/model" => {
            let mut parts = rest.split_whitespace();
            let (Some(slot), Some(model), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(usage("/model"));
            };
            let slot = ModelSlot::from_key(slot)
                .ok_or_else(|| CommandError::Invalid(format!("Unknown model slot: {slot}")))?;
            Ok(Command::Model {
                slot,
                model: model.to_string(),
            })
        }
        "/temperature" => {
            if rest.is_empty() {
                return Err(usage("/temperature"));
            }
            let value: f32 = rest
                .parse()
                .map_err(|_| CommandError::Invalid(format!("Not a number: {rest}")))?;
            Temperature::new(value)
                .map(Command::Temperature)
                .map_err(|e| CommandError::Invalid(e.to_string()))
        }
        "/max-tokens" => match rest {
            "" => Err(usage("/max-tokens")),
            "off" | "none" => Ok(Command::MaxTokens(None)),
            n => match n.parse::<u32>() {
                Ok(0) | Err(_) => Err(CommandError::Invalid(format!(
                    "Max tokens must be a positive integer or 'off', got: {n}"
                ))),
                Ok(n) => Ok(Command::MaxTokens(Some(n))),
            },
        },
        "/key" => {
            let (provider, value) = match rest.split_once(char::is_whitespace) {
                Some((p, v)) => (p, v.trim()),
                None => (rest, ""),
            };
            if provider.is_empty() {
                return Err(usage("/key"));
            }
            let provider = Provider::from_key(provider)
                .ok_or_else(|| CommandError::Invalid(format!("Unknown provider: {provider}")))?;
            Ok(Command::Key {
                provider,
                value: value.to_string(),
            })
        }
        "/upload" => {
            if rest.is_empty() {
                return Err(usage("/upload"));
            }
            Ok(Command::Upload(PathBuf::from(rest)))
        }
        _ => Err(CommandError::Unknown(head.to_string())),
    }
}

/// Return all commands whose name or alias prefix-matches the input.
/// Used by the command popup to show filtered choices.
pub fn matching_commands(input: &str) -> Vec<&'static SlashCommand> {
    if !input.starts_with('/') {
        return Vec::new();
    }
    let cmd_part = input.split_whitespace().next().unwrap_or(input);
    COMMANDS
        .iter()
        .filter(|cmd| {
            cmd.name.starts_with(cmd_part) || cmd.aliases.iter().any(|a| a.starts_with(cmd_part))
        })
        .collect()
}

/// Find the best prefix-matching command for the given input.
/// Input must start with `/`. Returns None if no match.
pub fn suggest(input: &str) -> Option<&'static SlashCommand> {
    if !input.starts_with('/') {
        return None;
    }

    // Extract just the command part (before any space)
    let cmd_part = input.split_whitespace().next().unwrap_or(input);

    if let Some(cmd) = lookup(cmd_part) {
        return Some(cmd);
    }

    COMMANDS
        .iter()
        .find(|cmd| cmd.name.starts_with(cmd_part))
        .or_else(|| {
            COMMANDS
                .iter()
                .find(|cmd| cmd.aliases.iter().any(|a| a.starts_with(cmd_part)))
        })
}

/// Compute the ghost suffix to overlay after the cursor.
/// Returns the remaining characters of the matched command + trailing space if it takes args.
pub fn ghost_suffix(input: &str) -> Option<String> {
    if !input.starts_with('/') || input.contains(' ') {
        return None;
    }

    let cmd = suggest(input)?;

    let matched_name = if cmd.name.starts_with(input) {
        cmd.name
    } else {
        cmd.aliases
            .iter()
            .find(|a| a.starts_with(input))
            .copied()
            .unwrap_or(cmd.name)
    };

    if matched_name.len() <= input.len() {
        return cmd.has_arg.then(|| " ".to_string());
    }

    let suffix = &matched_name[input.len()..];
    if cmd.has_arg {
        Some(format!("{suffix} "))
    } else {
        Some(suffix.to_string())
    }
}

/// The `/help` text.
pub fn help_text() -> String {
    let mut lines = vec!["Commands:".to_string()];
    for cmd in COMMANDS {
        let aliases = if cmd.aliases.is_empty() {
            String::new()
        } else {
            format!(" ({})", cmd.aliases.join(", "))
        };
        let usage = if cmd.usage.is_empty() {
            String::new()
        } else {
            format!(" {}", cmd.usage)
        };
        lines.push(format!(
            "  {}{}{} : {}",
            cmd.name, usage, aliases, cmd.description
        ));
    }
    lines.join("\n")
}
