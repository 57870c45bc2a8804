//! Dialog rendering helper utilities.
//!
//! Every dialog is a bordered box centered on the screen with a title,
//! some content rows, a row of buttons and a help line.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
};

use super::Theme;

/// Pre-computed styles for dialog rendering.
pub struct DialogStyles {
    pub border: Style,
    pub title: Style,
    pub label: Style,
    pub warning: Style,
    pub input_focused: Style,
    pub input_selected: Style,  // When text is selected (highlighted)
    pub input_unfocused: Style,
    pub button_focused: Style,
    pub button_unfocused: Style,
    pub help: Style,
    pub bg: Style,
}

impl DialogStyles {
    /// Create dialog styles from theme with given background color.
    pub fn new(theme: &Theme, bg_color: Color, border_color: Color) -> Self {
        Self {
            border: Style::default().fg(border_color).bg(bg_color),
            title: Style::default().bg(bg_color).fg(theme.dialog_title).add_modifier(Modifier::BOLD),
            label: Style::default().bg(bg_color).fg(theme.dialog_text),
            warning: Style::default().bg(bg_color).fg(theme.dialog_warning).add_modifier(Modifier::BOLD),
            input_focused: Style::default().bg(theme.dialog_input_focused_bg).fg(theme.dialog_input_focused_fg),
            input_selected: Style::default().bg(theme.dialog_input_selected_bg).fg(theme.dialog_input_selected_fg),
            input_unfocused: Style::default().bg(bg_color).fg(theme.dialog_input_unfocused_fg),
            button_focused: Style::default().fg(theme.dialog_button_focused_fg).bg(theme.dialog_button_focused_bg).add_modifier(Modifier::BOLD),
            button_unfocused: Style::default().fg(theme.dialog_button_unfocused).bg(bg_color),
            help: Style::default().bg(bg_color).fg(theme.dialog_help),
            bg: Style::default().bg(bg_color),
        }
    }

    /// Destructive variant: the focused button uses the delete colors
    pub fn destructive(theme: &Theme) -> Self {
        let mut styles = Self::new(theme, theme.dialog_delete_bg, theme.dialog_delete_border);
        styles.button_focused = Style::default()
            .fg(theme.dialog_delete_button_focused_fg)
            .bg(theme.dialog_delete_button_focused_bg)
            .add_modifier(Modifier::BOLD);
        styles
    }

    /// Input style for a field given focus and selection state
    pub fn input(&self, focused: bool, selected: bool) -> Style {
        match (focused, selected) {
            (true, true) => self.input_selected,
            (true, false) => self.input_focused,
            _ => self.input_unfocused,
        }
    }
}

/// Helper functions for dialog rendering.
pub struct DialogRenderer;

impl DialogRenderer {
    /// Calculate centered dialog position and return the dialog area.
    /// Returns None if the area is too small.
    pub fn center_dialog(area: Rect, width: u16, height: u16, min_width: u16) -> Option<Rect> {
        if area.width < min_width || area.height < height {
            return None;
        }

        let dialog_width = width.min(area.width.saturating_sub(4));
        let x = area.x + (area.width.saturating_sub(dialog_width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;

        Some(Rect {
            x,
            y,
            width: dialog_width,
            height,
        })
    }

    /// Fill dialog area with background color.
    pub fn fill_background(area: Rect, buf: &mut Buffer, style: Style) {
        for row in area.y..area.y + area.height {
            for col in area.x..area.x + area.width {
                buf[(col, row)].set_char(' ').set_style(style);
            }
        }
    }

    /// Draw dialog border using box-drawing characters.
    pub fn draw_border(area: Rect, buf: &mut Buffer, style: Style) {
        Self::draw_frame(area, buf, style, ['┌', '┐', '└', '┘']);
    }

    /// Border with rounded corners, used by confirmations and progress
    pub fn draw_rounded_border(area: Rect, buf: &mut Buffer, style: Style) {
        Self::draw_frame(area, buf, style, ['╭', '╮', '╰', '╯']);
    }

    fn draw_frame(area: Rect, buf: &mut Buffer, style: Style, corners: [char; 4]) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        let right = area.x + area.width - 1;
        let bottom = area.y + area.height - 1;

        buf[(area.x, area.y)].set_char(corners[0]).set_style(style);
        buf[(right, area.y)].set_char(corners[1]).set_style(style);
        buf[(area.x, bottom)].set_char(corners[2]).set_style(style);
        buf[(right, bottom)].set_char(corners[3]).set_style(style);
        for col in area.x + 1..right {
            buf[(col, area.y)].set_char('─').set_style(style);
            buf[(col, bottom)].set_char('─').set_style(style);
        }
        for row in area.y + 1..bottom {
            buf[(area.x, row)].set_char('│').set_style(style);
            buf[(right, row)].set_char('│').set_style(style);
        }
    }

    /// Draw centered title on the top border.
    pub fn draw_title(area: Rect, buf: &mut Buffer, title: &str, style: Style) {
        Self::draw_centered(area, buf, 0, title, style);
    }

    /// Draw a line of text centered horizontally at `y_offset`
    pub fn draw_centered(area: Rect, buf: &mut Buffer, y_offset: u16, text: &str, style: Style) {
        let width = area.width.saturating_sub(4) as usize;
        let text = truncate_end(text, width);
        let x = area.x + (area.width.saturating_sub(text.chars().count() as u16)) / 2;
        buf.set_string(x, area.y + y_offset, &text, style);
    }

    /// Draw a horizontal row of buttons, centered.
    pub fn draw_buttons(
        area: Rect,
        buf: &mut Buffer,
        y_offset: u16,
        buttons: &[(&str, bool)], // (text, is_focused)
        focused_style: Style,
        unfocused_style: Style,
    ) {
        let button_y = area.y + y_offset;

        let total_width: usize = buttons.iter()
            .map(|(text, _)| text.len())
            .sum::<usize>() + (buttons.len().saturating_sub(1)) * 2;

        let mut x = area.x + (area.width.saturating_sub(total_width as u16)) / 2;

        for (text, is_focused) in buttons {
            let style = if *is_focused { focused_style } else { unfocused_style };
            buf.set_string(x, button_y, text, style);
            x += text.len() as u16 + 2;
        }
    }

    /// Draw an input field. Long input is cut from the start so the end
    /// (where typing happens) stays visible.
    pub fn draw_input_field(
        buf: &mut Buffer,
        x: u16,
        y: u16,
        width: usize,
        text: &str,
        style: Style,
    ) {
        for col in x..x + width as u16 {
            buf[(col, y)].set_char(' ').set_style(style);
        }

        let max_display = width.saturating_sub(1);
        let len = text.chars().count();
        let display_text = if len > max_display {
            let tail: String = text.chars().skip(len - max_display + 1).collect();
            format!("…{}", tail)
        } else {
            text.to_string()
        };

        buf.set_string(x, y, &display_text, style);
    }

    /// Draw help text centered on the second to last row.
    pub fn draw_help(area: Rect, buf: &mut Buffer, text: &str, style: Style) {
        Self::draw_centered(area, buf, area.height.saturating_sub(2), text, style);
    }

    /// Terminal cursor for a single-line input at `input_y` inside a dialog
    /// of the given size; mirrors the truncation of `draw_input_field`.
    pub fn input_cursor(
        area: Rect,
        width: u16,
        height: u16,
        input_y: u16,
        input: &str,
        cursor_pos: usize,
    ) -> (u16, u16) {
        let dialog_width = width.min(area.width.saturating_sub(4));
        let x = area.x + (area.width.saturating_sub(dialog_width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;

        let content_x = x + 2;
        let max_display = (dialog_width.saturating_sub(4) as usize).saturating_sub(1);
        let len = input.chars().count();
        let cursor_x = if len > max_display {
            content_x + max_display as u16
        } else {
            content_x + cursor_pos.min(len) as u16
        };
        (cursor_x, y + input_y)
    }
}

/// Cut `text` to `width` characters, marking the cut with '…'
pub fn truncate_end(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut s: String = text.chars().take(width - 1).collect();
    s.push('…');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_dialog() {
        let area = Rect { x: 0, y: 0, width: 80, height: 24 };
        let dialog = DialogRenderer::center_dialog(area, 40, 10, 20).unwrap();
        assert_eq!(dialog.width, 40);
        assert_eq!(dialog.height, 10);
        assert_eq!(dialog.x, 20); // (80 - 40) / 2
        assert_eq!(dialog.y, 7);  // (24 - 10) / 2
    }

    #[test]
    fn test_center_dialog_too_small() {
        let area = Rect { x: 0, y: 0, width: 15, height: 24 };
        assert!(DialogRenderer::center_dialog(area, 40, 10, 20).is_none());
    }

    #[test]
    fn test_truncate_end() {
        assert_eq!(truncate_end("short", 10), "short");
        assert_eq!(truncate_end("longer name", 6), "longe…");
        assert_eq!(truncate_end("ąęśćżź", 3), "ąę…");
    }

    #[test]
    fn test_input_cursor_follows_text() {
        let area = Rect { x: 0, y: 0, width: 80, height: 24 };
        // 50 wide dialog at x=15, content starts at 17
        assert_eq!(DialogRenderer::input_cursor(area, 50, 9, 4, "abc", 2), (19, 11));
        let long = "x".repeat(100);
        assert_eq!(DialogRenderer::input_cursor(area, 50, 9, 4, &long, 0), (17 + 45, 11));
    }
}
