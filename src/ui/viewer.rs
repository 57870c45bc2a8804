//! File viewer widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::api::Entry;
use crate::state::navigation::ViewerCursor;
use crate::state::preview::{PreviewContent, PreviewKind};
use super::panel::format_size;
use super::Theme;

/// File viewer widget
pub struct FileViewer<'a> {
    entry: &'a Entry,
    cursor: ViewerCursor,
    kind: PreviewKind,
    content: &'a PreviewContent,
    scroll: usize,
    /// Share link shown on the info card
    download_url: String,
    theme: &'a Theme,
}

impl<'a> FileViewer<'a> {
    pub fn new(
        entry: &'a Entry,
        cursor: ViewerCursor,
        kind: PreviewKind,
        content: &'a PreviewContent,
        scroll: usize,
        download_url: String,
        theme: &'a Theme,
    ) -> Self {
        Self { entry, cursor, kind, content, scroll, download_url, theme }
    }

    /// Calculate the visible height (content area, excluding header and footer)
    pub fn content_height(area: Rect) -> usize {
        area.height.saturating_sub(2) as usize
    }

    /// Lines of the info card for media and unknown types
    fn info_lines(&self) -> Vec<(String, bool)> {
        let mut lines = vec![
            (self.entry.display_name().to_string(), true),
            (String::new(), false),
            (format!("Kind:     {}", self.kind.label()), false),
        ];
        if let Some(size) = self.entry.size {
            lines.push((format!("Size:     {}", format_size(size)), false));
        }
        if let Some(modified) = &self.entry.modified {
            lines.push((format!("Modified: {}", modified), false));
        }
        lines.push((format!("Download: {}", self.download_url), false));
        if let Some(cdn) = &self.entry.cdn_url {
            lines.push((format!("CDN:      {}", cdn), false));
        }
        lines.push((String::new(), false));
        let note = match self.kind {
            PreviewKind::Unsupported => "No preview is available for this file type.",
            _ => "Preview is not shown in the terminal. Use F5 to download.",
        };
        lines.push((note.to_string(), false));
        lines
    }
}

impl Widget for FileViewer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < 10 {
            return;
        }

        let header_style = Style::default().bg(self.theme.viewer_header_bg).fg(self.theme.viewer_header_fg);
        let content_style = Style::default().bg(self.theme.viewer_content_bg).fg(self.theme.viewer_content_fg);
        let line_num_style = Style::default().bg(self.theme.viewer_content_bg).fg(self.theme.viewer_line_number);
        let footer_style = Style::default().bg(self.theme.viewer_footer_bg).fg(self.theme.viewer_footer_fg);
        let error_style = Style::default().bg(self.theme.viewer_content_bg).fg(self.theme.status_error_fg);

        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                buf[(x, y)].set_char(' ').set_style(content_style);
            }
        }

        // Header
        for x in area.x..area.x + area.width {
            buf[(x, area.y)].set_char(' ').set_style(header_style);
        }
        let header = format!(" {} [{}]", self.entry.path, self.kind.label());
        let header: String = header.chars().take(area.width as usize).collect();
        buf.set_string(area.x, area.y, &header, header_style);

        let content_start_y = area.y + 1;
        let content_height = Self::content_height(area);
        let content_width = area.width as usize;

        let mut position_info = String::new();
        match self.content {
            PreviewContent::Loading => {
                buf.set_string(area.x + 1, content_start_y, "Loading...", content_style);
            }
            PreviewContent::Error(e) => {
                let msg: String = format!("Can not load preview: {}", e).chars().take(content_width - 1).collect();
                buf.set_string(area.x + 1, content_start_y, &msg, error_style);
            }
            PreviewContent::Info => {
                for (i, (line, bold)) in self.info_lines().into_iter().enumerate().take(content_height) {
                    let style = if bold { content_style.add_modifier(Modifier::BOLD) } else { content_style };
                    let line: String = line.chars().take(content_width.saturating_sub(2)).collect();
                    buf.set_string(area.x + 2, content_start_y + 1 + i as u16, &line, style);
                }
            }
            PreviewContent::Text(lines) => {
                let total = lines.len();
                let num_width = ((total.max(1) as f64).log10().floor() as usize + 1).max(4);
                let text_width = content_width.saturating_sub(num_width + 1);

                for (i, line) in lines.iter().skip(self.scroll).take(content_height).enumerate() {
                    let y = content_start_y + i as u16;
                    let num_str = format!("{:>width$} ", self.scroll + i + 1, width = num_width);
                    buf.set_string(area.x, y, &num_str, line_num_style);

                    let text_start = area.x + num_width as u16 + 1;
                    for (col, ch) in line.chars().take(text_width).enumerate() {
                        let display_char = if ch.is_control() { ' ' } else { ch };
                        buf[(text_start + col as u16, y)].set_char(display_char).set_style(content_style);
                    }
                }

                let percent = if total <= content_height {
                    100
                } else {
                    ((self.scroll + content_height).min(total) * 100) / total
                };
                position_info = format!("Line {}/{} ({}%)  ", (self.scroll + 1).min(total), total, percent);
            }
        }

        // Footer
        let footer_y = area.y + area.height - 1;
        for x in area.x..area.x + area.width {
            buf[(x, footer_y)].set_char(' ').set_style(footer_style);
        }
        let prev = if self.cursor.previous.is_some() { "←/p Prev  " } else { "" };
        let next = if self.cursor.next.is_some() { "→/n Next  " } else { "" };
        let footer = format!(" {}{}{}Esc Close", position_info, prev, next);
        let footer: String = footer.chars().take(area.width as usize).collect();
        buf.set_string(area.x, footer_y, &footer, footer_style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::file;

    fn screen(buf: &Buffer) -> String {
        (0..buf.area.height)
            .map(|y| (0..buf.area.width).map(|x| buf[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_text_preview_has_line_numbers() {
        let theme = Theme::default();
        let entry = file("notes/a.txt", 12);
        let content = PreviewContent::Text(vec!["first".into(), "second".into()]);
        let cursor = ViewerCursor { selected: 0, previous: None, next: Some(1) };
        let area = Rect::new(0, 0, 60, 8);
        let mut buf = Buffer::empty(area);
        FileViewer::new(&entry, cursor, PreviewKind::Text, &content, 0, String::new(), &theme).render(area, &mut buf);

        let text = screen(&buf);
        assert!(text.contains("notes/a.txt [Text]"));
        assert!(text.contains("   1 first"));
        assert!(text.contains("   2 second"));
        assert!(text.contains("→/n Next"));
        assert!(!text.contains("Prev"));
    }

    #[test]
    fn test_info_card_for_media() {
        let theme = Theme::default();
        let entry = file("pics/cat.png", 2048);
        let cursor = ViewerCursor { selected: 0, previous: None, next: None };
        let area = Rect::new(0, 0, 80, 16);
        let mut buf = Buffer::empty(area);
        FileViewer::new(
            &entry, cursor, PreviewKind::Image, &PreviewContent::Info, 0,
            "http://host/api/download/pics%2Fcat.png".to_string(), &theme,
        )
        .render(area, &mut buf);

        let text = screen(&buf);
        assert!(text.contains("Kind:     Image"));
        assert!(text.contains("Size:     2.0 KB"));
        assert!(text.contains("Download: http://host/api/download/pics%2Fcat.png"));
    }
}
