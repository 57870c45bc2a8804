//! Yes/No confirmation and upload progress handlers

use crossterm::event::{KeyCode, KeyEvent};

use crate::state::app::App;
use crate::state::mode::Mode;

pub fn handle_simple_confirm_mode(app: &mut App, key: KeyEvent) {
    let Mode::SimpleConfirm { action, focus, .. } = &mut app.mode else {
        return;
    };

    match key.code {
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
            app.mode = Mode::Normal;
        }

        KeyCode::Char('y') | KeyCode::Char('Y') => {
            let action = action.clone();
            app.mode = Mode::Normal;
            app.execute_simple_confirm_action(action);
        }

        KeyCode::Enter => {
            if *focus == 0 {
                let action = action.clone();
                app.mode = Mode::Normal;
                app.execute_simple_confirm_action(action);
            } else {
                app.mode = Mode::Normal;
            }
        }

        KeyCode::Tab | KeyCode::Left | KeyCode::Right | KeyCode::BackTab => {
            *focus = if *focus == 0 { 1 } else { 0 };
        }

        _ => {}
    }
}

/// While uploading only Esc matters; with the stop prompt showing, Y/N answer it
pub fn handle_uploading_mode(app: &mut App, key: KeyEvent) {
    let Mode::Uploading { confirm_cancel, .. } = &app.mode else {
        return;
    };

    if *confirm_cancel {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.cancel_upload(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.dismiss_cancel_upload(),
            _ => {}
        }
    } else if key.code == KeyCode::Esc {
        app.request_cancel_upload();
    }
}
