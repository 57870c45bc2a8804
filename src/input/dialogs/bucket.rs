use crossterm::event::{KeyCode, KeyEvent};

use crate::state::app::App;
use crate::state::mode::Mode;

pub fn handle_bucket_selector_mode(app: &mut App, key: KeyEvent) {
    let Mode::BucketSelector { buckets, selected } = &mut app.mode else {
        return;
    };

    match key.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
        }

        KeyCode::Up | KeyCode::Char('k') => {
            *selected = selected.saturating_sub(1);
        }

        KeyCode::Down | KeyCode::Char('j') => {
            if *selected + 1 < buckets.len() {
                *selected += 1;
            }
        }

        KeyCode::Home => *selected = 0,
        KeyCode::End => *selected = buckets.len().saturating_sub(1),

        KeyCode::Enter => {
            let Some(name) = buckets.get(*selected).cloned() else {
                return;
            };
            app.mode = Mode::Normal;
            app.select_bucket(&name);
        }

        _ => {}
    }
}
