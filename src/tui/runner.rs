//! TUI runner: main loop that wires everything together.
//!
//! Creates the terminal, then alternates between drawing, polling keys and
//! running queued submissions through the console.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{debug, info};

use crate::console::Console;

use super::app::TuiApp;
use super::event::TuiMessage;
use super::layout;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run the TUI main loop. Blocks until quit.
pub async fn run_tui(console: Console) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = TuiApp::new(console);
    let result = event_loop(&mut terminal, &mut app).await;

    // Restore terminal, even when the loop failed
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    info!(turns = app.console.session().transcript.len(), "console closed");
    result
}

async fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut TuiApp) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| layout::draw(f, app))?;

        if let Some(input) = app.pending_input.take() {
            // Redraw with the thinking indicator before awaiting the agent
            app.begin_submission(&input);
            terminal.draw(|f| layout::draw(f, app))?;
            run_submission(app, &input).await;
        } else {
            // Poll crossterm events (non-blocking via tokio::task::spawn_blocking)
            let polled = tokio::task::spawn_blocking(|| {
                if event::poll(POLL_INTERVAL).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            })
            .await?;
            match polled {
                Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    app.update(TuiMessage::Input(key));
                }
                Some(Event::Resize(_, _)) => app.update(TuiMessage::Resize),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Run the input through the console and fold the result back into the app.
async fn run_submission(app: &mut TuiApp, input: &str) {
    let result = app.console.submit(input).await;
    debug!(?result, "submission finished");
    app.finish_submission(result);
}
