//! TuiApp: the TEA model.
//!
//! All state lives here. Update receives TuiMessages, mutates state.
//! View reads state to produce ratatui widgets. No side effects in view.

use crate::config::{credentials, ModelSlot, Provider};
use crate::console::{Console, Submission, ABOUT_TEXT};
use crate::turn::Notice;

use super::event::TuiMessage;

/// Which area receives typed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Sidebar,
}

/// An editable row in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarField {
    Model(ModelSlot),
    Temperature,
    MaxTokens,
    Key(Provider),
}

impl SidebarField {
    /// Sidebar rows, top to bottom.
    pub const ALL: [SidebarField; 8] = [
        SidebarField::Model(ModelSlot::Chat),
        SidebarField::Model(ModelSlot::Utility),
        SidebarField::Model(ModelSlot::Embeddings),
        SidebarField::Model(ModelSlot::Browser),
        SidebarField::Temperature,
        SidebarField::MaxTokens,
        SidebarField::Key(Provider::OpenAi),
        SidebarField::Key(Provider::Anthropic),
    ];

    pub fn label(self) -> &'static str {
        match self {
            SidebarField::Model(slot) => slot.label(),
            SidebarField::Temperature => "Temperature",
            SidebarField::MaxTokens => "Max Tokens",
            SidebarField::Key(provider) => provider.label(),
        }
    }
}

/// Step used by Left/Right on the max tokens row.
pub const MAX_TOKENS_STEP: u32 = 256;
/// Largest value reachable with the arrow keys.
pub const MAX_TOKENS_CEILING: u32 = 32_768;

/// Agent processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    Idle,
    Thinking,
}

/// One-line notice under the chat pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Info(String),
    Warning(String),
    Error(String),
}

impl From<Notice> for Banner {
    fn from(notice: Notice) -> Self {
        match notice {
            Notice::Warning(text) => Banner::Warning(text),
            Notice::Error(text) => Banner::Error(text),
        }
    }
}

/// A popup over the main area (about text, command output).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub title: String,
    pub body: String,
}

/// Single-line text input with a char-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Cursor position in chars.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Take the text out, leaving the line empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

/// The main TUI application state (TEA model).
pub struct TuiApp {
    /// Session, configuration, credentials and the turn handler.
    pub console: Console,
    /// Which area receives typed keys.
    pub focus: Focus,
    /// Selected sidebar row (index into `SidebarField::ALL`).
    pub sidebar_index: usize,
    /// Chat input.
    pub input: InputLine,
    /// Typed but not yet committed key text, per provider.
    pub key_drafts: [String; 2],
    /// Current banner, cleared by Esc or the next submission.
    pub banner: Option<Banner>,
    /// Popup over the main area.
    pub overlay: Option<Overlay>,
    /// Current agent processing status.
    pub status: AgentStatus,
    /// Prompt being processed (rendered with a thinking indicator).
    pub thinking_prompt: Option<String>,
    /// Input pending submission (set by Enter, consumed by runner).
    pub pending_input: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Scroll offset for the chat pane (vertical).
    pub message_scroll: u16,
    /// When true, pin the chat pane to the bottom on next render.
    pub message_auto_scroll: bool,
    /// Viewport height of the chat pane (set by renderer, used by PageUp/PageDown).
    pub viewport_height: u16,
}

fn draft_index(provider: Provider) -> usize {
    match provider {
        Provider::OpenAi => 0,
        Provider::Anthropic => 1,
    }
}

impl TuiApp {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            focus: Focus::Input,
            sidebar_index: 0,
            input: InputLine::default(),
            key_drafts: [String::new(), String::new()],
            banner: None,
            overlay: None,
            status: AgentStatus::Idle,
            thinking_prompt: None,
            pending_input: None,
            should_quit: false,
            message_scroll: 0,
            message_auto_scroll: true,
            viewport_height: 20, // sensible default, updated by renderer
        }
    }

    /// Handle a TUI message (TEA update).
    pub fn update(&mut self, msg: TuiMessage) {
        match msg {
            TuiMessage::Input(key) => super::input::handle_key(self, key),
            TuiMessage::Resize => self.message_auto_scroll = true,
            TuiMessage::Quit => self.should_quit = true,
        }
    }

    pub fn selected_field(&self) -> SidebarField {
        SidebarField::ALL[self.sidebar_index.min(SidebarField::ALL.len() - 1)]
    }

    pub fn key_draft(&self, provider: Provider) -> &str {
        &self.key_drafts[draft_index(provider)]
    }

    pub fn key_draft_mut(&mut self, provider: Provider) -> &mut String {
        &mut self.key_drafts[draft_index(provider)]
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::Sidebar,
            Focus::Sidebar => Focus::Input,
        };
    }

    pub fn sidebar_up(&mut self) {
        self.sidebar_index = self.sidebar_index.saturating_sub(1);
    }

    pub fn sidebar_down(&mut self) {
        self.sidebar_index = (self.sidebar_index + 1).min(SidebarField::ALL.len() - 1);
    }

    /// Left/Right on the selected sidebar row.
    pub fn adjust_selected(&mut self, forward: bool) {
        match self.selected_field() {
            SidebarField::Model(slot) => self.console.cycle_model(slot, forward),
            SidebarField::Temperature => self.console.nudge_temperature(if forward { 1 } else { -1 }),
            SidebarField::MaxTokens => {
                let next = step_max_tokens(self.console.config().max_tokens, forward);
                if let Err(e) = self.console.set_max_tokens(next) {
                    self.banner = Some(Banner::Error(e.to_string()));
                }
            }
            SidebarField::Key(_) => {}
        }
    }

    /// Enter on a key row: store the draft. An empty draft keeps the old key.
    pub fn commit_key_draft(&mut self, provider: Provider) {
        let draft = std::mem::take(self.key_draft_mut(provider));
        let stored = self.console.set_credential(provider, &draft);
        self.banner = Some(Banner::Info(if stored {
            format!("{} stored", provider.label())
        } else {
            format!("{} unchanged", provider.label())
        }));
    }

    /// What a key row displays: the masked draft while typing, else the
    /// masked stored key.
    pub fn key_display(&self, provider: Provider) -> String {
        let draft = self.key_draft(provider);
        if !draft.is_empty() {
            return credentials::mask(draft);
        }
        match self.console.credentials().get(provider) {
            Some(key) => credentials::mask(key),
            None => "(not set)".into(),
        }
    }

    /// Enter on the chat input.
    pub fn submit_input(&mut self) {
        if self.input.as_str().trim().is_empty() {
            return;
        }
        self.pending_input = Some(self.input.take());
    }

    /// Called by the runner before awaiting the console.
    pub fn begin_submission(&mut self, input: &str) {
        self.banner = None;
        if !input.trim_start().starts_with('/') {
            self.status = AgentStatus::Thinking;
            self.thinking_prompt = Some(input.to_string());
            self.message_auto_scroll = true;
        }
    }

    /// Called by the runner with the console's result.
    pub fn finish_submission(&mut self, result: Submission) {
        self.status = AgentStatus::Idle;
        self.thinking_prompt = None;
        match result {
            Submission::Ignored => {}
            Submission::Turn(outcome) => {
                self.banner = outcome.notice.map(Banner::from);
                self.message_auto_scroll = true;
            }
            Submission::Command(out) => {
                if out.quit {
                    self.should_quit = true;
                }
                if let Some(text) = out.feedback {
                    if text.contains('\n') {
                        self.overlay = Some(Overlay {
                            title: overlay_title(&text),
                            body: text,
                        });
                    } else {
                        self.banner = Some(Banner::Info(text));
                    }
                }
            }
        }
    }

    /// F1: show or hide the about popup.
    pub fn toggle_about(&mut self) {
        if self.overlay.is_some() {
            self.overlay = None;
        } else {
            self.overlay = Some(Overlay {
                title: "About Agent Zero".into(),
                body: ABOUT_TEXT.into(),
            });
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.message_auto_scroll = false;
        self.message_scroll = self.message_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.message_scroll = self.message_scroll.saturating_add(lines);
    }
}

fn overlay_title(text: &str) -> String {
    if text.starts_with("# Agent Zero") {
        "About Agent Zero".into()
    } else {
        text.lines()
            .next()
            .map(|l| l.trim_end_matches(':').to_string())
            .unwrap_or_default()
    }
}

fn step_max_tokens(current: Option<u32>, forward: bool) -> Option<u32> {
    match (current, forward) {
        (None, true) => Some(MAX_TOKENS_STEP),
        (None, false) => None,
        (Some(n), true) => Some((n + MAX_TOKENS_STEP).min(MAX_TOKENS_CEILING)),
        (Some(n), false) if n <= MAX_TOKENS_STEP => None,
        (Some(n), false) => Some(n - MAX_TOKENS_STEP),
    }
}
