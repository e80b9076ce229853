//! Chat pane contents.
//!
//! Turns the transcript into styled lines. Assistant replies are markdown
//! and go through `tui-markdown`; user prompts are shown verbatim.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::session::{Role, Transcript};

/// Lines for the whole transcript, plus the pending prompt if a turn is
/// still running.
pub fn transcript_lines(transcript: &Transcript, thinking: Option<&str>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for turn in transcript {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(role_header(turn.role));
        match turn.role {
            Role::User => lines.extend(plain_lines(&turn.text)),
            Role::Assistant => lines.extend(render_markdown(&turn.text)),
        }
    }
    if let Some(prompt) = thinking {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(role_header(Role::User));
        lines.extend(plain_lines(prompt));
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Thinking...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )));
    }
    lines
}

fn role_header(role: Role) -> Line<'static> {
    let (label, color) = match role {
        Role::User => ("You", Color::Cyan),
        Role::Assistant => ("Agent Zero", Color::Green),
    };
    Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn plain_lines(text: &str) -> Vec<Line<'static>> {
    text.lines().map(|l| Line::from(l.to_string())).collect()
}

/// Parse markdown text and return styled lines suitable for a `Paragraph`.
pub fn render_markdown(text: &str) -> Vec<Line<'static>> {
    let rendered = tui_markdown::from_str(text);
    rendered
        .lines
        .into_iter()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .spans
                .into_iter()
                .map(|span| Span::styled(span.content.into_owned(), span.style))
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Rows the lines occupy once wrapped to `width` columns.
pub fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines
        .iter()
        .map(|l| l.width().div_ceil(width).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}
