//! Agent Zero: interactive console for a language-model agent.
//!
//! Chat with an external agent program through a turn handler that keeps
//! an append-only transcript, a per-turn configuration snapshot, API
//! credentials and uploaded files. Two surfaces drive the same console: a
//! full-screen terminal interface and a line console.

pub mod agent;
pub mod commands;
pub mod config;
pub mod console;
pub mod repl;
pub mod session;
pub mod tui;
pub mod turn;
pub mod uploads;
