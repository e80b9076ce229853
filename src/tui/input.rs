//! Key binding dispatch for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::commands;

use super::app::{Focus, SidebarField, TuiApp};

/// Handle a key event, mutating app state.
pub fn handle_key(app: &mut TuiApp, key: KeyEvent) {
    // Global bindings
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::F(1) => {
            app.toggle_about();
            return;
        }
        _ => {}
    }

    if app.overlay.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.overlay = None;
        }
        return;
    }

    match key.code {
        KeyCode::Esc => {
            if app.focus == Focus::Sidebar {
                app.focus = Focus::Input;
            } else {
                app.banner = None;
            }
            return;
        }
        KeyCode::Tab => {
            if !accept_ghost(app) {
                app.toggle_focus();
            }
            return;
        }
        _ => {}
    }

    match app.focus {
        Focus::Input => input_key(app, key),
        Focus::Sidebar => sidebar_key(app, key),
    }
}

/// Complete a partially typed slash command. Returns false if there was
/// nothing to complete.
fn accept_ghost(app: &mut TuiApp) -> bool {
    if app.focus != Focus::Input || app.input.cursor() != app.input.as_str().chars().count() {
        return false;
    }
    match commands::ghost_suffix(app.input.as_str()) {
        Some(suffix) => {
            app.input.insert_str(&suffix);
            true
        }
        None => false,
    }
}

fn input_key(app: &mut TuiApp, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_input(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.input.insert(c),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.left(),
        KeyCode::Right => app.input.right(),
        KeyCode::Home => app.input.home(),
        KeyCode::End => app.input.end(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(app.viewport_height.max(1)),
        KeyCode::PageDown => app.scroll_down(app.viewport_height.max(1)),
        _ => {}
    }
}

fn sidebar_key(app: &mut TuiApp, key: KeyEvent) {
    match key.code {
        KeyCode::Up => app.sidebar_up(),
        KeyCode::Down => app.sidebar_down(),
        KeyCode::Left => app.adjust_selected(false),
        KeyCode::Right => app.adjust_selected(true),
        _ => {
            if let SidebarField::Key(provider) = app.selected_field() {
                match key.code {
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.key_draft_mut(provider).push(c);
                    }
                    KeyCode::Backspace => {
                        app.key_draft_mut(provider).pop();
                    }
                    KeyCode::Enter => app.commit_key_draft(provider),
                    _ => {}
                }
            } else if key.code == KeyCode::Enter {
                app.focus = Focus::Input;
            }
        }
    }
}
