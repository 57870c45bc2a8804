//! Text field input handling utilities.
//!
//! Cursor positions are character indices, so folder names and local paths
//! with non-ASCII characters edit correctly.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Helper for handling text field input operations.
pub struct TextField;

/// Byte offset of the `cursor`-th character
fn byte_index(input: &str, cursor: usize) -> usize {
    input.char_indices().nth(cursor).map(|(i, _)| i).unwrap_or(input.len())
}

impl TextField {
    /// Handle backspace key - delete character before cursor
    #[inline]
    pub fn backspace(input: &mut String, cursor: &mut usize) {
        if *cursor > 0 {
            *cursor -= 1;
            input.remove(byte_index(input, *cursor));
        }
    }

    /// Handle delete key - delete character at cursor
    #[inline]
    pub fn delete(input: &mut String, cursor: usize) {
        if cursor < input.chars().count() {
            input.remove(byte_index(input, cursor));
        }
    }

    #[inline]
    pub fn left(cursor: &mut usize) {
        *cursor = cursor.saturating_sub(1);
    }

    #[inline]
    pub fn right(input: &str, cursor: &mut usize) {
        if *cursor < input.chars().count() {
            *cursor += 1;
        }
    }

    #[inline]
    pub fn home(cursor: &mut usize) {
        *cursor = 0;
    }

    #[inline]
    pub fn end(input: &str, cursor: &mut usize) {
        *cursor = input.chars().count();
    }

    /// Handle character input - insert at cursor
    #[inline]
    pub fn insert_char(input: &mut String, cursor: &mut usize, c: char) {
        input.insert(byte_index(input, *cursor), c);
        *cursor += 1;
    }

    /// Apply an editing key to a single-line field. `selected` means the
    /// whole content is highlighted and the next edit replaces it.
    /// Returns false when the key is not an editing key.
    pub fn handle_key(input: &mut String, cursor: &mut usize, selected: &mut bool, key: &KeyEvent) -> bool {
        let replace = *selected && !input.is_empty();
        match key.code {
            KeyCode::Backspace | KeyCode::Delete if replace => {
                input.clear();
                *cursor = 0;
            }
            KeyCode::Backspace => Self::backspace(input, cursor),
            KeyCode::Delete => Self::delete(input, *cursor),
            KeyCode::Left => Self::left(cursor),
            KeyCode::Right => Self::right(input, cursor),
            KeyCode::Home => Self::home(cursor),
            KeyCode::End => Self::end(input, cursor),
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                if replace {
                    input.clear();
                    *cursor = 0;
                }
                Self::insert_char(input, cursor, c);
            }
            _ => return false,
        }
        *selected = false;
        true
    }
}
