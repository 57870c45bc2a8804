//! Spinner and upload progress overlays

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::state::upload::{UploadItem, UploadStatus};
use super::dialog_helpers::{DialogRenderer, DialogStyles, truncate_end};
use super::panel::format_size;
use super::Theme;

/// Spinner animation frames (Braille dots pattern)
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn frame_char(frame: usize) -> &'static str {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

/// A centered spinner overlay dialog
pub struct SpinnerDialog<'a> {
    /// Current animation frame
    frame: usize,
    title: &'a str,
    message: &'a str,
    border_style: Style,
    content_style: Style,
}

impl<'a> SpinnerDialog<'a> {
    pub fn new(frame: usize, title: &'a str, message: &'a str) -> Self {
        Self {
            frame,
            title,
            message,
            border_style: Style::default(),
            content_style: Style::default(),
        }
    }

    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    pub fn content_style(mut self, style: Style) -> Self {
        self.content_style = style;
        self
    }
}

impl Widget for SpinnerDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content = format!("{} {}", frame_char(self.frame), self.message);
        let content_width = content.chars().count().max(self.title.chars().count() + 2) + 4;
        let dialog_width = (content_width as u16 + 2).max(24);
        let dialog_height = 5;

        let Some(dialog_area) = DialogRenderer::center_dialog(area, dialog_width, dialog_height, 10) else {
            return;
        };

        DialogRenderer::fill_background(dialog_area, buf, self.content_style);
        DialogRenderer::draw_border(dialog_area, buf, self.border_style);
        if !self.title.is_empty() {
            DialogRenderer::draw_title(dialog_area, buf, &format!(" {} ", self.title), self.border_style);
        }
        DialogRenderer::draw_centered(dialog_area, buf, 2, &content, self.content_style);
        DialogRenderer::draw_centered(dialog_area, buf, dialog_height - 1, "Esc = Cancel", self.border_style);
    }
}

/// Upload batch progress: one row per file with status and a bar
pub struct UploadProgressDialog<'a> {
    frame: usize,
    items: &'a [UploadItem],
    confirm_cancel: bool,
    cancelling: bool,
    theme: &'a Theme,
}

impl<'a> UploadProgressDialog<'a> {
    pub fn new(
        frame: usize,
        items: &'a [UploadItem],
        confirm_cancel: bool,
        cancelling: bool,
        theme: &'a Theme,
    ) -> Self {
        Self { frame, items, confirm_cancel, cancelling, theme }
    }

    /// Index of the file being sent, or the last finished one
    fn current_index(&self) -> usize {
        self.items.iter()
            .position(|i| i.status == UploadStatus::Uploading)
            .or_else(|| self.items.iter().rposition(|i| i.status != UploadStatus::Waiting))
            .unwrap_or(0)
    }
}

impl Widget for UploadProgressDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        // border + title gap + rows (max 10) + gap + status + help + border
        let visible = self.items.len().clamp(1, 10);
        let dialog_height = visible as u16 + 6;
        let Some(dialog_area) = DialogRenderer::center_dialog(area, 64, dialog_height, 30) else {
            return;
        };

        let styles = DialogStyles::new(theme, theme.dialog_upload_bg, theme.dialog_upload_border);
        let bar_filled = Style::default().fg(theme.dialog_upload_bg).bg(theme.dialog_upload_border);
        let success = Style::default().bg(theme.dialog_upload_bg).fg(theme.status_success_bg);

        DialogRenderer::fill_background(dialog_area, buf, styles.bg);
        DialogRenderer::draw_rounded_border(dialog_area, buf, styles.border);

        let done = self.items.iter()
            .filter(|i| matches!(i.status, UploadStatus::Success | UploadStatus::Failed))
            .count();
        let title = format!(" {} Uploading {}/{} ", frame_char(self.frame), done, self.items.len());
        DialogRenderer::draw_title(dialog_area, buf, &title, styles.title);

        let inner = dialog_area.width.saturating_sub(4) as usize;
        let status_w = 7;
        let size_w = 10;
        let bar_w = 14;
        let name_w = inner.saturating_sub(status_w + size_w + bar_w + 3);

        // Scroll so the active file stays in view
        let current = self.current_index();
        let start = current.saturating_sub(visible - 1).min(self.items.len().saturating_sub(visible));

        for (row, item) in self.items.iter().skip(start).take(visible).enumerate() {
            let y = dialog_area.y + 2 + row as u16;
            let mut x = dialog_area.x + 2;

            let name = truncate_end(&item.name, name_w);
            buf.set_string(x, y, format!("{:<w$}", name, w = name_w), styles.label);
            x += name_w as u16 + 1;

            buf.set_string(x, y, format!("{:>w$}", format_size(item.size), w = size_w), styles.label);
            x += size_w as u16 + 1;

            let filled = bar_w * item.progress as usize / 100;
            for i in 0..bar_w {
                let (ch, style) = if i < filled { ('█', bar_filled) } else { ('░', styles.label) };
                buf[(x + i as u16, y)].set_char(ch).set_style(style);
            }
            x += bar_w as u16 + 1;

            let (label, style) = match item.status {
                UploadStatus::Waiting => ("waiting".to_string(), styles.help),
                UploadStatus::Uploading => (format!("{:>3}%", item.progress), styles.label),
                UploadStatus::Success => ("done".to_string(), success),
                UploadStatus::Failed => ("failed".to_string(), styles.warning),
            };
            buf.set_string(x, y, truncate_end(&label, status_w), style);
        }

        // Latest failure reason, or the cancel prompt
        let status_y = dialog_area.y + dialog_area.height - 3;
        if self.confirm_cancel {
            let prompt = Style::default().bg(theme.dialog_upload_bg).fg(theme.dialog_warning).add_modifier(Modifier::BOLD);
            DialogRenderer::draw_centered(dialog_area, buf, status_y - dialog_area.y, "Stop uploading the remaining files? (Y/N)", prompt);
        } else if self.cancelling {
            DialogRenderer::draw_centered(dialog_area, buf, status_y - dialog_area.y, "Stopping after the current file...", styles.warning);
        } else if let Some(error) = self.items.iter().rev().find_map(|i| i.error.as_deref()) {
            buf.set_string(dialog_area.x + 2, status_y, truncate_end(error, inner), styles.warning);
        }

        DialogRenderer::draw_help(dialog_area, buf, "Esc = Stop", styles.help);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn item(name: &str, status: UploadStatus, progress: u8) -> UploadItem {
        UploadItem {
            name: name.to_string(),
            local_path: PathBuf::from(name),
            remote_path: name.to_string(),
            size: 2048,
            status,
            progress,
            error: None,
        }
    }

    fn screen(buf: &Buffer) -> String {
        (0..buf.area.height)
            .map(|y| (0..buf.area.width).map(|x| buf[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_upload_dialog_rows() {
        let theme = Theme::default();
        let items = vec![
            item("one.txt", UploadStatus::Success, 100),
            item("two.txt", UploadStatus::Uploading, 42),
            item("three.txt", UploadStatus::Waiting, 0),
        ];
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        UploadProgressDialog::new(0, &items, false, false, &theme).render(area, &mut buf);
        let text = screen(&buf);
        assert!(text.contains("Uploading 1/3"));
        assert!(text.contains("done"));
        assert!(text.contains(" 42%"));
        assert!(text.contains("waiting"));
    }

    #[test]
    fn test_upload_dialog_cancel_prompt() {
        let theme = Theme::default();
        let items = vec![item("one.txt", UploadStatus::Uploading, 10)];
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        UploadProgressDialog::new(3, &items, true, false, &theme).render(area, &mut buf);
        assert!(screen(&buf).contains("Stop uploading the remaining files?"));
    }
}
