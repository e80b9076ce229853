//! The full-screen console, a ratatui presentation layer.
//!
//! Sidebar for configuration, chat pane, input bar, upload list. Same
//! console state as the line REPL, different view.
//!
//! ## Architecture (TEA)
//!
//! Model (`TuiApp`) + Update (key handler) + View (`layout::draw`).
//! Immediate mode: every frame is drawn from the model, so redrawing
//! without input reproduces the same screen.

pub mod app;
pub mod event;
pub mod input;
pub mod layout;
pub mod runner;
pub mod transcript_view;

pub use runner::run_tui;
