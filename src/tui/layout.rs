//! Screen layout.
//!
//! ```text
//! ┌ Agent Zero ─────────────────────────────────────────────┐
//! │┌ Configuration ┐┌ Chat with Agent Zero ─────────────────┐│
//! ││ Chat Model    ││                                       ││
//! ││ ...           ││ (transcript)                          ││
//! ││ Temperature   │├ Upload Documents ─────────────────────┤│
//! ││ API keys      ││ Uploaded 2 file(s)                    ││
//! │└───────────────┘└───────────────────────────────────────┘│
//! │ banner                                                   │
//! │┌ Message ───────────────────────────────────────────────┐│
//! ││ > What can I help you with?                            ││
//! │└────────────────────────────────────────────────────────┘│
//! │ [idle] session 1a2b3c4d  agent: placeholder  Tab:Sidebar │
//! │       Agent Zero Interface - Developed by DeepFriedCyber │
//! └──────────────────────────────────────────────────────────┘
//! ```

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, Gauge, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};
use ratatui::Frame;

use crate::commands;

use super::app::{AgentStatus, Banner, Focus, SidebarField, TuiApp};
use super::transcript_view::{render_markdown, transcript_lines, wrapped_height};

const SIDEBAR_WIDTH: u16 = 34;
const INPUT_PLACEHOLDER: &str = "What can I help you with?";
const FOOTER: &str = "Agent Zero Interface - Developed by DeepFriedCyber";

/// Draw the full TUI layout.
pub fn draw(f: &mut Frame, app: &mut TuiApp) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Min(8),    // sidebar + main
            Constraint::Length(1), // banner
            Constraint::Length(3), // input
            Constraint::Length(1), // status bar
            Constraint::Length(1), // footer
        ])
        .split(f.area());

    draw_title(f, outer[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(outer[1]);
    draw_sidebar(f, app, body[0]);

    let upload_rows = upload_rows(app.console.session().uploads.len());
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(upload_rows)])
        .split(body[1]);
    draw_chat(f, app, main[0]);
    draw_uploads(f, app, main[1]);

    draw_banner(f, app, outer[2]);
    draw_input(f, app, outer[3]);
    draw_status(f, app, outer[4]);
    draw_footer(f, outer[5]);

    if app.overlay.is_some() {
        draw_overlay(f, app, body[1]);
    }
}

/// Uploads pane height: summary plus one line per file, within bounds.
fn upload_rows(files: usize) -> u16 {
    u16::try_from(files)
        .unwrap_or(u16::MAX)
        .saturating_add(3)
        .clamp(3, 8)
}

/// Terminal column of the input cursor, kept inside the input box.
fn cursor_column(inner: Rect, cursor: usize) -> u16 {
    inner
        .x
        .saturating_add(2)
        .saturating_add(u16::try_from(cursor).unwrap_or(u16::MAX))
        .min(inner.right().saturating_sub(1))
}

fn draw_title(f: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " Agent Zero ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " interactive console  F1:About",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(title), area);
}

fn draw_sidebar(f: &mut Frame, app: &TuiApp, area: Rect) {
    let focused = app.focus == Focus::Sidebar;
    let block = Block::default()
        .title(" Configuration ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Two rows per field: label, value.
    let mut constraints: Vec<Constraint> = SidebarField::ALL.iter().map(|_| Constraint::Length(2)).collect();
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let config = app.console.config();
    for (i, field) in SidebarField::ALL.iter().enumerate() {
        let selected = focused && i == app.sidebar_index;
        let label_style = if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if selected { "> " } else { "  " };
        let area = rows[i];
        let label_area = Rect { height: 1, ..area };
        let value_area = Rect {
            y: area.y.saturating_add(1),
            height: area.height.saturating_sub(1),
            ..area
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(marker, label_style),
                Span::styled(field.label(), label_style),
            ])),
            label_area,
        );

        match field {
            SidebarField::Temperature => {
                let gauge = Gauge::default()
                    .gauge_style(Style::default().fg(Color::Yellow).bg(Color::Black))
                    .ratio(config.temperature.ratio())
                    .label(config.temperature.to_string());
                let gauge_area = Rect {
                    x: value_area.x.saturating_add(2),
                    width: value_area.width.saturating_sub(2),
                    ..value_area
                };
                f.render_widget(gauge, gauge_area);
            }
            _ => {
                let value = match field {
                    SidebarField::Model(slot) => {
                        if selected {
                            format!("< {} >", config.model(*slot))
                        } else {
                            config.model(*slot).to_string()
                        }
                    }
                    SidebarField::MaxTokens => match config.max_tokens {
                        Some(n) => n.to_string(),
                        None => "(none)".into(),
                    },
                    SidebarField::Key(provider) => app.key_display(*provider),
                    SidebarField::Temperature => String::new(),
                };
                f.render_widget(
                    Paragraph::new(Line::from(vec![
                        Span::raw("  "),
                        Span::styled(value, Style::default().fg(Color::White)),
                    ])),
                    value_area,
                );
            }
        }
    }
}

fn draw_chat(f: &mut Frame, app: &mut TuiApp, area: Rect) {
    let block = Block::default()
        .title(" Chat with Agent Zero ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut lines = transcript_lines(
        &app.console.session().transcript,
        app.thinking_prompt.as_deref(),
    );
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No messages yet. Type a prompt and press Enter.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Clamp scroll so we never scroll past content.
    let inner_height = area.height.saturating_sub(2);
    let total = wrapped_height(&lines, area.width.saturating_sub(2));
    let max_scroll = total.saturating_sub(inner_height);
    let scroll = if app.message_auto_scroll {
        max_scroll
    } else {
        app.message_scroll.min(max_scroll)
    };
    // Write clamped value back so up/down keys work immediately
    app.message_scroll = scroll;
    if scroll == max_scroll {
        app.message_auto_scroll = true;
    }
    app.viewport_height = inner_height;

    let para = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(para, area);

    if total > inner_height {
        let mut scrollbar_state = ScrollbarState::new(max_scroll as usize).position(scroll as usize);
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            area,
            &mut scrollbar_state,
        );
    }
}

fn draw_uploads(f: &mut Frame, app: &TuiApp, area: Rect) {
    let block = Block::default()
        .title(" Upload Documents ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let uploads = &app.console.session().uploads;
    let lines: Vec<Line> = match uploads.summary() {
        Some(summary) => std::iter::once(Line::from(Span::styled(
            summary,
            Style::default().fg(Color::Green),
        )))
        .chain(uploads.listing().into_iter().map(Line::from))
        .collect(),
        None => vec![Line::from(Span::styled(
            "No files. Use /upload <path> to attach one.",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_banner(f: &mut Frame, app: &TuiApp, area: Rect) {
    let Some(banner) = &app.banner else {
        draw_command_hint(f, app, area);
        return;
    };
    let (text, style) = match banner {
        Banner::Info(t) => (t.as_str(), Style::default().fg(Color::Cyan)),
        Banner::Warning(t) => (t.as_str(), Style::default().fg(Color::Yellow)),
        Banner::Error(t) => (t.as_str(), Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
    };
    f.render_widget(Paragraph::new(Span::styled(format!(" {text}"), style)), area);
}

/// While a slash command is being typed, list what it could become.
fn draw_command_hint(f: &mut Frame, app: &TuiApp, area: Rect) {
    let input = app.input.as_str();
    let matches = commands::matching_commands(input);
    let text = match matches.as_slice() {
        [] => return,
        [cmd] => format!(" {} {}  {}", cmd.name, cmd.usage, cmd.description),
        many => {
            let names: Vec<&str> = many.iter().map(|c| c.name).collect();
            format!(" {}", names.join("  "))
        }
    };
    f.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn draw_input(f: &mut Frame, app: &TuiApp, area: Rect) {
    let focused = app.focus == Focus::Input;
    let block = Block::default()
        .title(" Message ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let prompt = Span::styled("> ", Style::default().fg(Color::Cyan));
    let line = if app.input.is_empty() {
        Line::from(vec![
            prompt,
            Span::styled(INPUT_PLACEHOLDER, Style::default().fg(Color::DarkGray)),
        ])
    } else {
        let mut spans = vec![prompt, Span::raw(app.input.as_str().to_string())];
        if app.input.cursor() == app.input.as_str().chars().count() {
            if let Some(suffix) = commands::ghost_suffix(app.input.as_str()) {
                spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
            }
        }
        Line::from(spans)
    };
    f.render_widget(Paragraph::new(line), inner);

    if focused && app.overlay.is_none() {
        let x = cursor_column(inner, app.input.cursor());
        f.set_cursor_position(Position::new(x, inner.y));
    }
}

fn draw_status(f: &mut Frame, app: &TuiApp, area: Rect) {
    let status_text = match app.status {
        AgentStatus::Idle => Span::styled("idle", Style::default().fg(Color::Green)),
        AgentStatus::Thinking => Span::styled("thinking...", Style::default().fg(Color::Yellow)),
    };
    let hints = match app.focus {
        Focus::Input => "Tab:Sidebar  Enter:Send  /help  ^C:Quit",
        Focus::Sidebar => "\u{2191}\u{2193}:Field  \u{2190}\u{2192}:Change  Esc:Back  ^C:Quit",
    };
    let line = Line::from(vec![
        Span::raw(" ["),
        status_text,
        Span::raw("] "),
        Span::styled(
            format!("session {} ", app.console.session().short_id()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("{} ", app.console.handler().backend().describe()),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    f.render_widget(
        Paragraph::new(Span::styled(FOOTER, Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_overlay(f: &mut Frame, app: &TuiApp, area: Rect) {
    let Some(overlay) = &app.overlay else {
        return;
    };
    let popup = centered(area, 80, 80);
    f.render_widget(Clear, popup);
    let block = Block::default()
        .title(format!(" {} ", overlay.title))
        .title_bottom(" Esc to close ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let para = Paragraph::new(render_markdown(&overlay.body))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(para, popup);
}

/// A rectangle `pct_x` by `pct_y` percent of `area`, centred in it.
fn centered(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentBackend;
    use crate::config::{AgentConfig, Credentials, Provider};
    use crate::console::Console;
    use crate::turn::TurnHandler;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;
    use std::time::Duration;

    fn app() -> TuiApp {
        TuiApp::new(Console::new(
            TurnHandler::new(AgentBackend::unavailable("test", Duration::ZERO)),
            AgentConfig::default(),
            Credentials::default(),
        ))
    }

    fn render(app: &mut TuiApp) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(110, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn redraw_is_stable() {
        let mut app = app();
        let first = render(&mut app);
        let second = render(&mut app);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn chat_and_sidebar_rendered() {
        let mut app = app();
        app.console.submit("Hello").await;
        let text = buffer_text(&render(&mut app));
        assert!(text.contains("Chat with Agent Zero"));
        assert!(text.contains("Chat Model"));
        assert!(text.contains("gpt-3.5-turbo"));
        assert!(text.contains("You"));
        assert!(text.contains("placeholder response"));
    }

    #[tokio::test]
    async fn uploads_listed() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        for name in ["a.txt", "b.txt", "c.txt"] {
            let path = dir.path().join(name);
            std::fs::write(&path, "data").unwrap();
            app.console.upload(&path).await.unwrap();
        }
        let text = buffer_text(&render(&mut app));
        assert!(text.contains("Uploaded 3 file(s)"));
        assert!(text.contains("Filename: b.txt"));
    }

    #[test]
    fn keys_never_shown_in_clear() {
        let mut app = app();
        app.console.set_credential(Provider::OpenAi, "sk-visible");
        let text = buffer_text(&render(&mut app));
        assert!(!text.contains("sk-visible"));
        assert!(text.contains("(not set)"));
    }

    #[test]
    fn placeholder_and_thinking() {
        let mut app = app();
        let text = buffer_text(&render(&mut app));
        assert!(text.contains(INPUT_PLACEHOLDER));
        assert!(text.contains("[idle]"));

        app.begin_submission("pending question");
        let text = buffer_text(&render(&mut app));
        assert!(text.contains("Thinking..."));
        assert!(text.contains("pending question"));
    }

    #[test]
    fn command_hint_while_typing() {
        let mut app = app();
        app.input.insert_str("/up");
        let text = buffer_text(&render(&mut app));
        assert!(text.contains("/upload <path>  Attach a file for the agent"));
    }

    #[test]
    fn footer_credits_shown() {
        let mut app = app();
        let text = buffer_text(&render(&mut app));
        assert!(text.contains(FOOTER));
    }

    #[test]
    fn upload_rows_saturate() {
        assert_eq!(upload_rows(0), 3);
        assert_eq!(upload_rows(2), 5);
        assert_eq!(upload_rows(65_533), 8);
        assert_eq!(upload_rows(usize::MAX), 8);
    }

    #[test]
    fn cursor_column_stays_in_box() {
        let inner = Rect::new(1, 1, 40, 1);
        assert_eq!(cursor_column(inner, 0), 3);
        assert_eq!(cursor_column(inner, 70_000), 40);
        assert_eq!(cursor_column(inner, usize::MAX), 40);
    }

    #[test]
    fn about_overlay_drawn() {
        let mut app = app();
        app.toggle_about();
        let text = buffer_text(&render(&mut app));
        assert!(text.contains("About Agent Zero"));
        assert!(text.contains("Esc to close"));
    }
}
