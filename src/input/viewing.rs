//! File viewer key handling

use crossterm::event::{KeyCode, KeyEvent};

use crate::state::app::App;
use crate::state::mode::Mode;
use crate::state::preview::PreviewContent;

pub fn handle_viewing_mode(app: &mut App, key: KeyEvent, visible_height: usize) {
    if app.key_matches("viewer_close", &key)
        || matches!(key.code, KeyCode::F(3) | KeyCode::F(10) | KeyCode::Char('q'))
    {
        app.close_viewer();
        return;
    }
    if app.key_matches("viewer_next", &key) || app.key_matches("viewer_next_alt", &key) {
        app.viewer_next();
        return;
    }
    if app.key_matches("viewer_prev", &key) || app.key_matches("viewer_prev_alt", &key) {
        app.viewer_prev();
        return;
    }

    let Mode::Viewing { content, scroll, .. } = &mut app.mode else {
        return;
    };
    // Only text scrolls
    let PreviewContent::Text(lines) = content else {
        return;
    };
    let max_scroll = lines.len().saturating_sub(visible_height);
    let page = visible_height.max(1);

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => *scroll = (*scroll + 1).min(max_scroll),
        KeyCode::PageUp => *scroll = scroll.saturating_sub(page),
        KeyCode::PageDown | KeyCode::Char(' ') => *scroll = (*scroll + page).min(max_scroll),
        KeyCode::Home | KeyCode::Char('g') => *scroll = 0,
        KeyCode::End | KeyCode::Char('G') => *scroll = max_scroll,
        _ => {}
    }
}
