//! Messages that drive the TUI update loop.
//!
//! The runner polls crossterm on a blocking task and forwards what it
//! reads here. Nothing is polled while a turn is running.

use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum TuiMessage {
    /// Keyboard input.
    Input(KeyEvent),
    /// Terminal resized: re-pin the chat pane to the bottom.
    Resize,
    /// Quit the TUI.
    Quit,
}
