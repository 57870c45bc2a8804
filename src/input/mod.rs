//! Input handling
//!
//! This module handles keyboard input dispatching based on the current application mode.

mod dialogs;
mod normal;
mod text_field;
mod viewing;

pub use text_field::TextField;

use crossterm::event::{KeyCode, KeyEvent};

use crate::state::app::App;
use crate::state::mode::Mode;

/// Handle a key event based on current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    match &app.mode {
        Mode::Normal => normal::handle_normal_mode(app, key),
        Mode::Viewing { .. } => {
            let height = app.ui.viewer_height;
            viewing::handle_viewing_mode(app, key, height);
        }
        Mode::MakingDir { .. } => dialogs::handle_mkdir_mode(app, key),
        Mode::Searching { .. } => dialogs::handle_search_mode(app, key),
        Mode::UploadPrompt { .. } => dialogs::handle_upload_prompt_mode(app, key),
        Mode::SimpleConfirm { .. } => dialogs::handle_simple_confirm_mode(app, key),
        Mode::BucketSelector { .. } => dialogs::handle_bucket_selector_mode(app, key),
        Mode::Uploading { .. } => dialogs::handle_uploading_mode(app, key),
        Mode::BackgroundTask { .. } => {
            // Escape abandons the request; other keys wait for it
            if key.code == KeyCode::Esc {
                app.cancel_background_task();
            }
        }
    }
}
