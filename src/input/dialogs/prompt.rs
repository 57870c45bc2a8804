//! Single-input dialogs: new folder, search and upload path.
//!
//! Focus 0 is the input, 1 is OK, 2 is Cancel. Submitting keeps the dialog
//! open; the app closes it once the input is accepted.

use crossterm::event::{KeyCode, KeyEvent};

use crate::input::TextField;
use crate::state::app::App;
use crate::state::mode::Mode;

enum PromptOutcome {
    Submit(String),
    Cancel,
    Pending,
}

/// Shared key handling for one input plus OK/Cancel
fn edit_prompt(
    key: &KeyEvent,
    input: &mut String,
    cursor: &mut usize,
    focus: &mut usize,
    error: &mut Option<String>,
    selected: &mut bool,
) -> PromptOutcome {
    match key.code {
        KeyCode::Esc => return PromptOutcome::Cancel,

        KeyCode::Tab => {
            *focus = (*focus + 1) % 3;
            // Select text when entering the field with content
            *selected = *focus == 0 && !input.is_empty();
        }
        KeyCode::BackTab => {
            *focus = if *focus == 0 { 2 } else { *focus - 1 };
            *selected = *focus == 0 && !input.is_empty();
        }

        KeyCode::Enter => {
            *selected = false;
            return match *focus {
                0 | 1 => PromptOutcome::Submit(input.clone()),
                _ => PromptOutcome::Cancel,
            };
        }

        _ if *focus == 0 => {
            if TextField::handle_key(input, cursor, selected, key) {
                *error = None;
            }
        }

        KeyCode::Left if *focus > 0 => *focus -= 1,
        KeyCode::Right if *focus == 1 => *focus += 1,
        _ => {}
    }
    PromptOutcome::Pending
}

/// Run the shared handler against whichever prompt is open
fn prompt_outcome(app: &mut App, key: &KeyEvent) -> PromptOutcome {
    let selected = &mut app.ui.input_selected;
    match &mut app.mode {
        Mode::MakingDir { name_input, cursor_pos, focus, error } => {
            edit_prompt(key, name_input, cursor_pos, focus, error, selected)
        }
        Mode::Searching { pattern_input, cursor_pos, focus, error } => {
            edit_prompt(key, pattern_input, cursor_pos, focus, error, selected)
        }
        Mode::UploadPrompt { path_input, cursor_pos, focus, error } => {
            edit_prompt(key, path_input, cursor_pos, focus, error, selected)
        }
        _ => PromptOutcome::Pending,
    }
}

fn cancel(app: &mut App) {
    app.ui.input_selected = false;
    app.mode = Mode::Normal;
}

pub fn handle_mkdir_mode(app: &mut App, key: KeyEvent) {
    match prompt_outcome(app, &key) {
        PromptOutcome::Submit(name) => app.create_folder(&name),
        PromptOutcome::Cancel => cancel(app),
        PromptOutcome::Pending => {}
    }
}

pub fn handle_search_mode(app: &mut App, key: KeyEvent) {
    match prompt_outcome(app, &key) {
        PromptOutcome::Submit(pattern) => app.execute_search(&pattern),
        PromptOutcome::Cancel => cancel(app),
        PromptOutcome::Pending => {}
    }
}

pub fn handle_upload_prompt_mode(app: &mut App, key: KeyEvent) {
    match prompt_outcome(app, &key) {
        PromptOutcome::Submit(path) => app.start_upload(&path),
        PromptOutcome::Cancel => cancel(app),
        PromptOutcome::Pending => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    use crate::api::mock::MockApi;
    use crate::config::Config;

    fn press(app: &mut App, code: KeyCode) {
        handle_mkdir_mode(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app_with_upload() -> (App, Arc<MockApi>) {
        let api = Arc::new(MockApi::new().with_permissions(true, true));
        let mut app = App::new(Config::default(), api.clone());
        app.permissions.can_upload = true;
        (app, api)
    }

    #[test]
    fn test_typing_and_invalid_submit_keeps_dialog() {
        let (mut app, api) = app_with_upload();
        app.show_mkdir_dialog();
        for c in "a/b".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        match &app.mode {
            Mode::MakingDir { name_input, error, .. } => {
                assert_eq!(name_input, "a/b");
                assert!(error.is_some());
            }
            _ => panic!("dialog closed"),
        }

        // Editing clears the message
        press(&mut app, KeyCode::Backspace);
        assert!(matches!(&app.mode, Mode::MakingDir { error: None, .. }));
        assert_eq!(api.calls("mkdir"), 0);
    }

    #[test]
    fn test_focus_cycle_and_cancel() {
        let (mut app, _) = app_with_upload();
        app.show_mkdir_dialog();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert!(matches!(&app.mode, Mode::MakingDir { focus: 2, .. }));
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn test_valid_name_starts_request() {
        let (mut app, api) = app_with_upload();
        app.show_mkdir_dialog();
        for c in "photos".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.mode, Mode::BackgroundTask { .. }));
        app.wait_for_task();
        assert_eq!(api.call_args("mkdir"), vec!["photos"]);
    }
}
