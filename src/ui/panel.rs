//! Panel widget for displaying bucket listings

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, StatefulWidget, Widget},
};

use crate::api::Entry;
use crate::state::panel::{Panel, SortField, ViewMode};
use super::Theme;

/// Height of the footer area (separator line + footer text line)
const FOOTER_HEIGHT: u16 = 2;

/// Widget for rendering the file panel
pub struct PanelWidget<'a> {
    theme: &'a Theme,
}

impl<'a> PanelWidget<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    /// Folder path, or the search pattern while showing results
    fn format_title(panel: &Panel) -> String {
        match &panel.search {
            Some(search) => format!(" Search: {} ", search.pattern),
            None => format!(" /{} ", panel.path),
        }
    }

    /// Format the sorting indicator
    fn format_sort(panel: &Panel) -> String {
        let sort = panel.sort();
        if sort.field == SortField::Unsorted && !sort.reverse {
            return " [---] ".to_string();
        }
        let dir_char = if sort.reverse { '↓' } else { '↑' };
        format!(" [{}{}] ", sort.field.label(), dir_char)
    }

    /// Folder and file counts with the total size of the listing
    fn footer_left(panel: &Panel) -> String {
        format!(
            " {} files, {} folders  {} ",
            panel.file_count(),
            panel.folder_count(),
            format_size(panel.total_size()),
        )
    }

    fn footer_right(panel: &Panel) -> String {
        format!(" Page {}/{} ", panel.page().index + 1, panel.page_count())
    }

    /// Render in Brief mode (two columns)
    fn render_brief(panel: &Panel, theme: &Theme, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 4 {
            return;
        }

        let col_width = area.width / 2;
        let rows = area.height as usize;
        let entries = panel.displayed_entries();

        let start = panel.scroll_offset;
        let end = (start + rows * 2).min(entries.len());

        for (i, entry_idx) in (start..end).enumerate() {
            let entry = &entries[entry_idx];

            // Fill left column first, then right
            let col = i / rows;
            let row = i % rows;
            if col > 1 {
                break;
            }

            let x = area.x + (col as u16 * col_width) + if col > 0 { 1 } else { 0 };
            let y = area.y + row as u16;

            let (style, prefix, suffix) = entry_style_and_decorations(entry, entry_idx == panel.cursor, theme);
            let name = decorated_name(panel, entry, prefix, suffix);

            let max_width = col_width.saturating_sub(1) as usize;
            let display_name = if panel.is_search() {
                truncate_path_right(&name, max_width)
            } else {
                truncate_name(&name, max_width)
            };

            let span = Span::styled(format!("{:<width$}", display_name, width = max_width), style);
            buf.set_span(x, y, &span, col_width);
        }

        if col_width > 0 && area.width > col_width {
            let sep_x = area.x + col_width;
            for row in 0..area.height {
                buf[(sep_x, area.y + row)]
                    .set_char('│')
                    .set_style(Style::default().fg(theme.panel_column_separator));
            }
        }
    }

    /// Render in Full mode (single column with details)
    fn render_full(panel: &Panel, theme: &Theme, area: Rect, buf: &mut Buffer) {
        if area.height < 2 || area.width < 20 {
            return;
        }

        let content_area = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: area.height.saturating_sub(1),
        };
        let rows = content_area.height as usize;

        let size_width: u16 = 9;   // "1023.9 MB"
        let date_width: u16 = 16;  // "2024-01-15 10:23"
        let cdn_width: u16 = 3;
        let fixed_width = size_width + date_width + cdn_width + 3;
        let name_width = area.width.saturating_sub(fixed_width).max(10);

        let header_style = Style::default()
            .fg(theme.panel_header)
            .add_modifier(Modifier::BOLD);

        let header = format!(
            "{:<name_w$} {:>size_w$} {:<date_w$} {:<cdn_w$}",
            "Name",
            "Size",
            "Modified",
            "CDN",
            name_w = name_width as usize,
            size_w = size_width as usize,
            date_w = date_width as usize,
            cdn_w = cdn_width as usize,
        );
        buf.set_string(area.x, area.y, &header, header_style);

        let entries = panel.displayed_entries();
        let start = panel.scroll_offset;
        let end = (start + rows).min(entries.len());

        for (i, entry_idx) in (start..end).enumerate() {
            let entry = &entries[entry_idx];
            let y = content_area.y + i as u16;
            let (style, prefix, suffix) = entry_style_and_decorations(entry, entry_idx == panel.cursor, theme);

            let name = decorated_name(panel, entry, prefix, suffix);
            let display_name = if panel.is_search() {
                truncate_path_right(&name, name_width as usize)
            } else {
                truncate_name(&name, name_width as usize)
            };

            let size_str = match (entry.folder, entry.size) {
                (true, _) => "<DIR>".to_string(),
                (false, Some(size)) => format_size_short(size),
                (false, None) => "-".to_string(),
            };
            let date_str = entry.modified.as_deref().map(format_date).unwrap_or_default();
            let cdn_str = if entry.cdn_url.is_some() { "●" } else { "" };

            let line = format!(
                "{:<name_w$} {:>size_w$} {:<date_w$} {:<cdn_w$}",
                display_name,
                size_str,
                date_str,
                cdn_str,
                name_w = name_width as usize,
                size_w = size_width as usize,
                date_w = date_width as usize,
                cdn_w = cdn_width as usize,
            );

            buf.set_string(area.x, y, &line, style);
        }
    }

    /// Single centered message in place of the listing
    fn render_message(text: &str, style: Style, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let text = truncate_name(text, area.width as usize);
        let x = area.x + area.width.saturating_sub(text.chars().count() as u16) / 2;
        buf.set_string(x, area.y + area.height / 2, &text, style);
    }
}

impl StatefulWidget for PanelWidget<'_> {
    type State = Panel;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let panel_bg = if state.is_search() {
            self.theme.search_panel_background
        } else {
            self.theme.panel_background
        };

        let border_style = Style::default()
            .fg(self.theme.panel_border)
            .bg(panel_bg);
        let title_style = Style::default()
            .fg(self.theme.cursor_fg)
            .bg(self.theme.panel_header_bg);
        let sort_style = Style::default()
            .fg(self.theme.panel_header)
            .bg(panel_bg);

        let title_line = Line::from(vec![
            Span::styled(Self::format_title(state), title_style),
            Span::styled(Self::format_sort(state), sort_style),
        ]);

        let block = Block::default()
            .title(title_line)
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(panel_bg));

        let inner = block.inner(area);

        let content_area = Rect {
            x: inner.x,
            y: inner.y,
            width: inner.width,
            height: inner.height.saturating_sub(FOOTER_HEIGHT),
        };

        let separator_y = inner.y + inner.height.saturating_sub(FOOTER_HEIGHT);
        let footer_text_y = separator_y + 1;

        // Navigation needs the visible row count; Full loses one to the header
        state.visible_height = match state.view_mode {
            ViewMode::Brief => content_area.height as usize,
            ViewMode::Full => content_area.height.saturating_sub(1) as usize,
        };

        block.render(area, buf);
        if inner.height < FOOTER_HEIGHT + 1 {
            return;
        }

        let text_style = Style::default().fg(self.theme.file_normal).bg(panel_bg);
        if let Some(error) = &state.error {
            let style = Style::default().fg(self.theme.status_error_fg).bg(panel_bg);
            Self::render_message(error, style, content_area, buf);
        } else if state.loading && state.displayed_entries().is_empty() {
            Self::render_message("Loading...", text_style, content_area, buf);
        } else if state.displayed_entries().is_empty() {
            let text = if state.is_search() { "Nothing found" } else { "This folder is empty" };
            Self::render_message(text, text_style, content_area, buf);
        } else {
            match state.view_mode {
                ViewMode::Brief => Self::render_brief(state, self.theme, content_area, buf),
                ViewMode::Full => Self::render_full(state, self.theme, content_area, buf),
            }
        }

        let separator_style = Style::default()
            .fg(self.theme.panel_border)
            .bg(panel_bg);
        for x in inner.x..inner.x + inner.width {
            buf[(x, separator_y)].set_char('─').set_style(separator_style);
        }

        for x in inner.x..inner.x + inner.width {
            buf[(x, footer_text_y)].set_char(' ').set_style(text_style);
        }
        let footer_right = Self::footer_right(state);
        buf.set_string(inner.x, footer_text_y, Self::footer_left(state), text_style);
        let right_x = inner.x + inner.width.saturating_sub(footer_right.chars().count() as u16);
        buf.set_string(right_x, footer_text_y, &footer_right, text_style);
    }
}

/// Name with highlight decorations; search results show the full path
fn decorated_name(panel: &Panel, entry: &Entry, prefix: Option<&str>, suffix: Option<&str>) -> String {
    let mut name = String::new();
    if entry.folder {
        name.push('/');
    }
    if let Some(p) = prefix {
        name.push_str(p);
    }
    if panel.is_search() {
        name.push_str(entry.path.trim_end_matches('/'));
    } else {
        name.push_str(entry.display_name());
    }
    if let Some(s) = suffix {
        name.push_str(s);
    }
    name
}

/// Get style and display decorations for an entry
/// Returns (style, prefix, suffix)
fn entry_style_and_decorations<'a>(
    entry: &Entry,
    is_cursor: bool,
    theme: &'a Theme,
) -> (Style, Option<&'a str>, Option<&'a str>) {
    let mut prefix: Option<&str> = None;
    let mut suffix: Option<&str> = None;

    let fg_color = match theme.find_highlight(entry.display_name(), entry.folder, entry.cdn_url.is_some()) {
        Some((color, pfx, sfx)) => {
            prefix = pfx;
            suffix = sfx;
            color
        }
        None if entry.folder => theme.file_directory,
        None => theme.file_normal,
    };

    let mut style = if is_cursor {
        Style::default().bg(theme.cursor_bg).fg(theme.cursor_fg)
    } else {
        Style::default().fg(fg_color)
    };

    if entry.folder {
        style = style.add_modifier(Modifier::BOLD);
    }

    (style, prefix, suffix)
}

/// Truncate a filename to fit within max_width (keeps the beginning)
fn truncate_name(name: &str, max_width: usize) -> String {
    if name.chars().count() <= max_width {
        name.to_string()
    } else if max_width <= 3 {
        name.chars().take(max_width).collect()
    } else {
        let mut result: String = name.chars().take(max_width - 1).collect();
        result.push('…');
        result
    }
}

/// Truncate a path keeping the end, so the file name stays visible
fn truncate_path_right(path: &str, max_width: usize) -> String {
    let char_count = path.chars().count();
    if char_count <= max_width {
        path.to_string()
    } else if max_width <= 3 {
        path.chars().skip(char_count - max_width).collect()
    } else {
        let skip = char_count - (max_width - 3);
        let mut result = String::from("...");
        result.extend(path.chars().skip(skip));
        result
    }
}

/// Format a file size for display (full version for footer and status)
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a file size for display (short version for columns)
fn format_size_short(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1}T", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1}G", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}M", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}K", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Server timestamps are ISO-8601; show "YYYY-MM-DD HH:MM"
pub fn format_date(modified: &str) -> String {
    modified.replacen('T', " ", 1).chars().take(16).collect()
}
