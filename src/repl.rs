//! Line console: the plain-text surface.
//!
//! Reads one line at a time, runs it through the console, and writes the
//! new turns. Works on any async reader/writer pair, so a pipe, a file or
//! a test buffer drives it the same way a terminal does.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::console::{Console, Submission};
use crate::session::Role;
use crate::turn::Notice;

/// Prompt shown before each line on interactive terminals.
const INPUT_PROMPT: &str = "> ";

/// Run until EOF or `/exit`.
pub async fn run_repl<R, W>(console: &mut Console, reader: R, writer: &mut W, interactive: bool) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let backend = console.handler().backend().describe();
    writer
        .write_all(format!("Agent Zero ({backend}). Type /help for commands.\n").as_bytes())
        .await?;

    let mut lines = reader.lines();
    loop {
        if interactive {
            writer.write_all(INPUT_PROMPT.as_bytes()).await?;
        }
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let before = console.session().transcript.len();
        match console.submit(&line).await {
            Submission::Ignored => {}
            Submission::Command(out) => {
                if let Some(text) = out.feedback {
                    writer.write_all(format!("{text}\n").as_bytes()).await?;
                }
                if out.quit {
                    break;
                }
            }
            Submission::Turn(outcome) => {
                let transcript = &console.session().transcript;
                if let Some(user) = transcript.turns().get(before) {
                    write_turn(writer, user.role, &user.text).await?;
                }
                match &outcome.notice {
                    Some(Notice::Warning(text)) => {
                        writer.write_all(format!("warning: {text}\n").as_bytes()).await?;
                    }
                    Some(Notice::Error(text)) => {
                        writer.write_all(format!("error: {text}\n").as_bytes()).await?;
                    }
                    None => {}
                }
                write_turn(writer, Role::Assistant, &outcome.reply).await?;
            }
        }
    }
    writer.flush().await?;
    Ok(())
}

async fn write_turn<W: AsyncWrite + Unpin>(writer: &mut W, role: Role, text: &str) -> std::io::Result<()> {
    writer.write_all(format!("{role}> {text}\n").as_bytes()).await
}
