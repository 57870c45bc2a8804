//! Dialog widgets

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use super::dialog_helpers::{DialogRenderer, DialogStyles, truncate_end};
use super::Theme;

const INPUT_DIALOG_WIDTH: u16 = 56;
const INPUT_DIALOG_HEIGHT: u16 = 10;
const INPUT_ROW: u16 = 4;

/// Layout shared by the single-input dialogs: label, input, an error line,
/// OK/Cancel and a help line. Focus 0 is the input, 1 is OK, 2 is Cancel.
struct InputDialog<'a> {
    title: &'a str,
    label: &'a str,
    input: &'a str,
    error: Option<&'a str>,
    focus: usize,
    input_selected: bool,
    bg: Color,
    border: Color,
    theme: &'a Theme,
}

impl InputDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(dialog_area) = DialogRenderer::center_dialog(area, INPUT_DIALOG_WIDTH, INPUT_DIALOG_HEIGHT, 20) else {
            return;
        };
        let styles = DialogStyles::new(self.theme, self.bg, self.border);

        DialogRenderer::fill_background(dialog_area, buf, styles.bg);
        DialogRenderer::draw_border(dialog_area, buf, styles.border);
        DialogRenderer::draw_title(dialog_area, buf, self.title, styles.title);

        let content_x = dialog_area.x + 2;
        let content_width = dialog_area.width.saturating_sub(4) as usize;

        buf.set_string(content_x, dialog_area.y + 2, self.label, styles.label);

        let input_style = styles.input(self.focus == 0, self.input_selected);
        DialogRenderer::draw_input_field(buf, content_x, dialog_area.y + INPUT_ROW, content_width, self.input, input_style);

        if let Some(error) = self.error {
            buf.set_string(content_x, dialog_area.y + 5, truncate_end(error, content_width), styles.warning);
        }

        DialogRenderer::draw_buttons(
            dialog_area, buf, 7,
            &[("[ OK ]", self.focus == 1), ("[ Cancel ]", self.focus == 2)],
            styles.button_focused, styles.button_unfocused,
        );

        DialogRenderer::draw_help(dialog_area, buf, "Tab=Switch  Enter=Select  Esc=Cancel", styles.help);
    }
}

/// Cursor position inside any single-input dialog
pub fn input_dialog_cursor_position(area: Rect, input: &str, cursor_pos: usize) -> (u16, u16) {
    DialogRenderer::input_cursor(area, INPUT_DIALOG_WIDTH, INPUT_DIALOG_HEIGHT, INPUT_ROW, input, cursor_pos)
}

/// New folder dialog (F7)
pub struct MkdirDialog<'a> {
    name_input: &'a str,
    error: Option<&'a str>,
    focus: usize,
    input_selected: bool,
    theme: &'a Theme,
}

impl<'a> MkdirDialog<'a> {
    pub fn new(
        name_input: &'a str,
        error: Option<&'a str>,
        focus: usize,
        input_selected: bool,
        theme: &'a Theme,
    ) -> Self {
        Self { name_input, error, focus, input_selected, theme }
    }
}

impl Widget for MkdirDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        InputDialog {
            title: " Create Folder ",
            label: "Folder name:",
            input: self.name_input,
            error: self.error,
            focus: self.focus,
            input_selected: self.input_selected,
            bg: self.theme.dialog_mkdir_bg,
            border: self.theme.dialog_mkdir_border,
            theme: self.theme,
        }
        .render(area, buf);
    }
}

/// Search dialog
pub struct SearchDialog<'a> {
    pattern_input: &'a str,
    error: Option<&'a str>,
    focus: usize,
    input_selected: bool,
    theme: &'a Theme,
}

impl<'a> SearchDialog<'a> {
    pub fn new(
        pattern_input: &'a str,
        error: Option<&'a str>,
        focus: usize,
        input_selected: bool,
        theme: &'a Theme,
    ) -> Self {
        Self { pattern_input, error, focus, input_selected, theme }
    }
}

impl Widget for SearchDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        InputDialog {
            title: " Search Bucket ",
            label: "Name contains:",
            input: self.pattern_input,
            error: self.error,
            focus: self.focus,
            input_selected: self.input_selected,
            bg: self.theme.dialog_search_bg,
            border: self.theme.dialog_search_border,
            theme: self.theme,
        }
        .render(area, buf);
    }
}

/// Local path prompt that starts an upload (F6)
pub struct UploadPromptDialog<'a> {
    path_input: &'a str,
    target: &'a str,
    error: Option<&'a str>,
    focus: usize,
    input_selected: bool,
    theme: &'a Theme,
}

impl<'a> UploadPromptDialog<'a> {
    pub fn new(
        path_input: &'a str,
        target: &'a str,
        error: Option<&'a str>,
        focus: usize,
        input_selected: bool,
        theme: &'a Theme,
    ) -> Self {
        Self { path_input, target, error, focus, input_selected, theme }
    }
}

impl Widget for UploadPromptDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label = format!("Upload file or folder to /{}:", self.target);
        let label = truncate_end(&label, INPUT_DIALOG_WIDTH as usize - 4);
        InputDialog {
            title: " Upload ",
            label: &label,
            input: self.path_input,
            error: self.error,
            focus: self.focus,
            input_selected: self.input_selected,
            bg: self.theme.dialog_upload_bg,
            border: self.theme.dialog_upload_border,
            theme: self.theme,
        }
        .render(area, buf);
    }
}

/// Yes/No confirmation with an optional warning line
pub struct SimpleConfirmDialog<'a> {
    message: &'a str,
    warning: Option<&'a str>,
    focus: usize,
    theme: &'a Theme,
}

impl<'a> SimpleConfirmDialog<'a> {
    pub fn new(message: &'a str, warning: Option<&'a str>, focus: usize, theme: &'a Theme) -> Self {
        Self { message, warning, focus, theme }
    }
}

impl Widget for SimpleConfirmDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text_len = self.message.chars().count()
            .max(self.warning.map(|w| w.chars().count()).unwrap_or(0)) as u16;
        let dialog_width = (text_len + 6).max(30);
        let dialog_height = if self.warning.is_some() { 8 } else { 7 };

        let Some(dialog_area) = DialogRenderer::center_dialog(area, dialog_width, dialog_height, 20) else {
            return;
        };
        let styles = DialogStyles::destructive(self.theme);

        DialogRenderer::fill_background(dialog_area, buf, styles.bg);
        DialogRenderer::draw_rounded_border(dialog_area, buf, styles.border);
        DialogRenderer::draw_title(dialog_area, buf, " Confirm ", styles.title);

        DialogRenderer::draw_centered(dialog_area, buf, 2, self.message, styles.label);
        let mut buttons_row = 4;
        if let Some(warning) = self.warning {
            DialogRenderer::draw_centered(dialog_area, buf, 3, warning, styles.warning);
            buttons_row = 5;
        }

        DialogRenderer::draw_buttons(
            dialog_area, buf, buttons_row,
            &[("[ Yes ]", self.focus == 0), ("[ No ]", self.focus == 1)],
            styles.button_focused, styles.button_unfocused,
        );

        DialogRenderer::draw_help(dialog_area, buf, "Y/N, Tab, Enter, Esc", styles.help);
    }
}

/// Bucket list (Alt+F1); the active bucket is marked
pub struct BucketSelector<'a> {
    buckets: &'a [String],
    selected: usize,
    active: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> BucketSelector<'a> {
    pub fn new(buckets: &'a [String], selected: usize, active: Option<&'a str>, theme: &'a Theme) -> Self {
        Self { buckets, selected, active, theme }
    }
}

impl Widget for BucketSelector<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.buckets.is_empty() {
            return;
        }

        let max_name_len = self.buckets.iter().map(|b| b.chars().count()).max().unwrap_or(10);
        let dialog_width = ((max_name_len + 8) as u16).clamp(24, 48);
        // border + items (max 12 visible) + help + border
        let visible = self.buckets.len().min(12);
        let dialog_height = (visible + 4) as u16;

        let Some(dialog_area) = DialogRenderer::center_dialog(area, dialog_width, dialog_height, 15) else {
            return;
        };

        let bg = self.theme.dialog_search_bg;
        let styles = DialogStyles::new(self.theme, bg, self.theme.dialog_search_border);
        let selected_style = Style::default()
            .bg(self.theme.cursor_bg)
            .fg(self.theme.cursor_fg)
            .add_modifier(Modifier::BOLD);

        DialogRenderer::fill_background(dialog_area, buf, styles.bg);
        DialogRenderer::draw_border(dialog_area, buf, styles.border);
        DialogRenderer::draw_title(dialog_area, buf, " Buckets ", styles.title);

        // Keep the selection roughly centered once the list scrolls
        let scroll_offset = if self.buckets.len() > visible {
            let half = visible / 2;
            if self.selected < half {
                0
            } else if self.selected >= self.buckets.len() - half {
                self.buckets.len() - visible
            } else {
                self.selected - half
            }
        } else {
            0
        };

        let inner = dialog_area.width.saturating_sub(6) as usize;
        for (i, bucket) in self.buckets.iter().skip(scroll_offset).take(visible).enumerate() {
            let index = scroll_offset + i;
            let row_y = dialog_area.y + 1 + i as u16;
            let style = if index == self.selected { selected_style } else { styles.label };

            for col in dialog_area.x + 1..dialog_area.x + dialog_area.width - 1 {
                buf[(col, row_y)].set_char(' ').set_style(style);
            }
            let marker = if self.active == Some(bucket.as_str()) { '*' } else { ' ' };
            let line = format!("{} {}", marker, truncate_end(bucket, inner));
            buf.set_string(dialog_area.x + 2, row_y, &line, style);
        }

        DialogRenderer::draw_help(dialog_area, buf, "Enter=Select  Esc=Cancel", styles.help);
    }
}
