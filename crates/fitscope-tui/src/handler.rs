use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, FocusPane, InputMode, Screen, EMAIL_TYPES};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn insert_at_cursor(text: &mut String, cursor: &mut usize, c: char) {
    let idx = char_to_byte_index(text, *cursor);
    text.insert(idx, c);
    *cursor += 1;
}

fn backspace_at_cursor(text: &mut String, cursor: &mut usize) {
    if *cursor > 0 {
        let idx = char_to_byte_index(text, *cursor - 1);
        text.remove(idx);
        *cursor -= 1;
    }
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key)?,
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    // Popups swallow input while visible
    if app.show_model_picker {
        handle_model_picker(app, key);
        return Ok(());
    }
    if app.show_email_picker {
        handle_email_picker(app, key);
        return Ok(());
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }

    Ok(())
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Dashboard => handle_dashboard_normal(app, key),
        Screen::Analyze => handle_analyze_normal(app, key),
        Screen::Report => handle_report_normal(app, key),
        Screen::Chat => handle_chat_normal(app, key),
    }
}

fn handle_dashboard_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('j') | KeyCode::Down => app.history_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.history_nav_up(),

        KeyCode::Enter => app.open_selected_report(),

        KeyCode::Char('n') => app.enter_analyze(),
        KeyCode::Char('d') => app.delete_selected(),
        KeyCode::Char('e') => {
            let selected = app.selected_history().cloned();
            app.export_analysis(selected.as_ref());
        }
        KeyCode::Char('S') => app.toggle_sheet_panel(),
        KeyCode::Char('r') => {
            app.refresh_dashboard();
            app.status = Some("Refreshing...".to_string());
        }
        KeyCode::Char('t') => app.test_connections(),
        KeyCode::Char('m') => app.open_model_picker(),

        _ => {}
    }
}

fn handle_analyze_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.screen = Screen::Dashboard;
            app.focus = FocusPane::List;
        }

        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Input => FocusPane::List,
                _ => FocusPane::Input,
            };
        }

        // Submit from anywhere on the screen
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.submit_transcript();
        }

        KeyCode::Char('i') | KeyCode::Enter if app.focus == FocusPane::Input => {
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Char('/') => {
            app.focus = FocusPane::List;
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Char('j') | KeyCode::Down if app.focus == FocusPane::List => app.docs_nav_down(),
        KeyCode::Char('k') | KeyCode::Up if app.focus == FocusPane::List => app.docs_nav_up(),
        KeyCode::Enter if app.focus == FocusPane::List => app.extract_selected_doc(),
        KeyCode::Char('r') if app.focus == FocusPane::List => app.load_docs(),

        _ => {}
    }
}

fn handle_report_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('h') => {
            app.screen = Screen::Dashboard;
            app.focus = FocusPane::List;
        }

        KeyCode::Char('j') | KeyCode::Down => app.report_scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.report_scroll_up(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.report_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.report_half_page_up();
        }
        KeyCode::Char('g') => app.report_scroll = 0,
        KeyCode::Char('G') => {
            app.report_scroll = app.report_total_lines.saturating_sub(app.report_height);
        }

        KeyCode::Char('c') | KeyCode::Char('a') => app.enter_chat(),
        KeyCode::Char('e') => {
            let report = app.report.clone();
            app.export_analysis(report.as_ref());
        }

        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.screen = Screen::Report;
            app.focus = FocusPane::Content;
        }

        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Input => {
                    if app.suggestions.is_empty() {
                        FocusPane::Content
                    } else {
                        FocusPane::Suggestions
                    }
                }
                FocusPane::Suggestions => FocusPane::Content,
                _ => FocusPane::Input,
            };
        }

        KeyCode::Char('i') | KeyCode::Enter if app.focus == FocusPane::Input => {
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Suggestions => app.suggestions_nav_down(),
            _ => app.chat_scroll = app.chat_scroll.saturating_add(1),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Suggestions => app.suggestions_nav_up(),
            _ => app.chat_scroll = app.chat_scroll.saturating_sub(1),
        },
        KeyCode::Enter if app.focus == FocusPane::Suggestions => app.take_suggestion(),

        KeyCode::Char('g') => {
            app.show_email_picker = true;
            app.email_picker_state.select(Some(0));
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match (app.screen, app.focus) {
        (Screen::Analyze, FocusPane::Input) => handle_transcript_editing(app, key),
        (Screen::Analyze, _) => handle_doc_search_editing(app, key),
        (Screen::Chat, _) => handle_chat_editing(app, key),
        // Editing only exists on Analyze and Chat
        _ => app.input_mode = InputMode::Normal,
    }
}

/// The transcript box is append-oriented: terminal paste arrives as a stream
/// of key events, so insertion is always at the end.
fn handle_transcript_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.input_mode = InputMode::Normal;
            app.submit_transcript();
        }
        KeyCode::Enter => app.transcript_input.push('\n'),
        KeyCode::Char(c) => app.transcript_input.push(c),
        KeyCode::Backspace => {
            app.transcript_input.pop();
        }
        _ => {}
    }
}

fn handle_doc_search_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.search_docs();
        }
        KeyCode::Char(c) => {
            insert_at_cursor(&mut app.doc_search_input, &mut app.doc_search_cursor, c);
        }
        KeyCode::Backspace => {
            backspace_at_cursor(&mut app.doc_search_input, &mut app.doc_search_cursor);
        }
        KeyCode::Left => app.doc_search_cursor = app.doc_search_cursor.saturating_sub(1),
        KeyCode::Right => {
            let len = app.doc_search_input.chars().count();
            app.doc_search_cursor = (app.doc_search_cursor + 1).min(len);
        }
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.send_chat(),
        KeyCode::Char(c) => {
            insert_at_cursor(&mut app.chat_input, &mut app.chat_cursor, c);
        }
        KeyCode::Backspace => {
            backspace_at_cursor(&mut app.chat_input, &mut app.chat_cursor);
        }
        KeyCode::Left => app.chat_cursor = app.chat_cursor.saturating_sub(1),
        KeyCode::Right => {
            let len = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(len);
        }
        KeyCode::Home => app.chat_cursor = 0,
        KeyCode::End => app.chat_cursor = app.chat_input.chars().count(),
        _ => {}
    }
}

fn handle_model_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.show_model_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.model_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.model_picker_nav_up(),
        KeyCode::Enter => app.apply_selected_model(),
        _ => {}
    }
}

fn handle_email_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.show_email_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.email_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.email_picker_nav_up(),
        KeyCode::Enter => {
            if let Some(email_type) = app
                .email_picker_state
                .selected()
                .and_then(|i| EMAIL_TYPES.get(i))
            {
                let email_type = email_type.to_string();
                app.show_email_picker = false;
                app.generate_email(&email_type);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_byte_index_handles_multibyte() {
        let s = "héllo";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 2), 3);
        assert_eq!(char_to_byte_index(s, 99), s.len());
    }

    #[test]
    fn test_insert_and_backspace_round_trip() {
        let mut text = "héllo".to_string();
        let mut cursor = 2;
        insert_at_cursor(&mut text, &mut cursor, 'x');
        assert_eq!(text, "héxllo");
        assert_eq!(cursor, 3);
        backspace_at_cursor(&mut text, &mut cursor);
        assert_eq!(text, "héllo");
        assert_eq!(cursor, 2);
    }
}
