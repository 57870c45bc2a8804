//! Breadcrumb, status bar and function key bar widgets

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::api::Entry;
use crate::state::notify::{Notification, NotificationKind};
use crate::state::panel::Panel;
use super::panel::{format_date, format_size};
use super::Theme;

/// `bucket › folder › folder` line above the panel
pub struct Breadcrumb<'a> {
    segments: &'a [String],
    theme: &'a Theme,
}

impl<'a> Breadcrumb<'a> {
    pub fn new(segments: &'a [String], theme: &'a Theme) -> Self {
        Self { segments, theme }
    }
}

impl Widget for Breadcrumb<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }
        let style = Style::default().bg(self.theme.breadcrumb_bg).fg(self.theme.breadcrumb_fg);
        for x in area.x..area.x + area.width {
            buf[(x, area.y)].set_char(' ').set_style(style);
        }

        let Some((bucket, folders)) = self.segments.split_first() else {
            return;
        };
        let bucket_style = style.fg(self.theme.breadcrumb_bucket).add_modifier(Modifier::BOLD);
        let bucket_text = format!(" {} ", bucket);
        buf.set_string(area.x, area.y, &bucket_text, bucket_style);

        let trail: String = folders.iter().map(|s| format!("› {} ", s)).collect();
        let used = bucket_text.chars().count();
        let room = (area.width as usize).saturating_sub(used);
        buf.set_string(area.x + used as u16, area.y, truncate_path(&trail, room), style);
    }
}

/// Status line: the current notification, or details of the selected entry
pub struct StatusBar<'a> {
    panel: &'a Panel,
    notification: Option<&'a Notification>,
    is_admin: bool,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(panel: &'a Panel, theme: &'a Theme) -> Self {
        Self { panel, notification: None, is_admin: false, theme }
    }

    pub fn with_notification(mut self, notification: Option<&'a Notification>) -> Self {
        self.notification = notification;
        self
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let style = Style::default().bg(self.theme.status_bg).fg(self.theme.status_fg);
        for x in area.x..area.x + area.width {
            buf[(x, area.y)].set_char(' ').set_style(style);
        }

        // Admin marker is right-aligned and always visible
        let mut right_width: u16 = 0;
        if self.is_admin {
            let admin = " ADMIN ";
            right_width = admin.len() as u16;
            let admin_style = Style::default()
                .bg(self.theme.status_bg)
                .fg(self.theme.status_admin)
                .add_modifier(Modifier::BOLD);
            buf.set_string(area.x + area.width.saturating_sub(right_width), area.y, admin, admin_style);
        }
        let width = area.width.saturating_sub(right_width) as usize;

        if let Some(n) = self.notification {
            let note_style = match n.kind {
                NotificationKind::Error => Style::default().bg(self.theme.status_error_bg).fg(self.theme.status_error_fg),
                NotificationKind::Success => Style::default().bg(self.theme.status_success_bg).fg(self.theme.status_success_fg),
                NotificationKind::Info => style.add_modifier(Modifier::BOLD),
            };
            let msg = truncate_str(&format!(" {} ", n.message), width);
            for x in area.x..area.x + width as u16 {
                buf[(x, area.y)].set_char(' ').set_style(note_style);
            }
            buf.set_string(area.x, area.y, &msg, note_style);
            return;
        }

        let Some(entry) = self.panel.selected() else {
            return;
        };
        let info = truncate_path(&entry_info(entry), width.saturating_sub(1));
        buf.set_string(area.x + 1, area.y, &info, style);
    }
}

/// "path │ size │ modified" for the status line
fn entry_info(entry: &Entry) -> String {
    let size = match (entry.folder, entry.size) {
        (true, _) => "<DIR>".to_string(),
        (false, Some(s)) => format_size(s),
        (false, None) => "-".to_string(),
    };
    let mut info = format!("{} │ {}", entry.path, size);
    if let Some(modified) = &entry.modified {
        info.push_str(" │ ");
        info.push_str(&format_date(modified));
    }
    if entry.cdn_url.is_some() {
        info.push_str(" │ CDN");
    }
    info
}

/// Bottom line of function key hints
pub struct KeyBar<'a> {
    keys: &'a [(&'a str, &'a str)],
    theme: &'a Theme,
}

/// Function keys shown while browsing
pub const BROWSER_KEYS: &[(&str, &str)] = &[
    ("F3", "View"),
    ("F5", "Download"),
    ("F6", "Upload"),
    ("F7", "MkFolder"),
    ("F8", "Delete"),
    ("Alt+/", "Search"),
    ("Alt+F1", "Bucket"),
    ("F10", "Quit"),
];

impl<'a> KeyBar<'a> {
    pub fn new(keys: &'a [(&'a str, &'a str)], theme: &'a Theme) -> Self {
        Self { keys, theme }
    }
}

impl Widget for KeyBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }
        let label_style = Style::default().bg(self.theme.cursor_bg).fg(self.theme.cursor_fg);
        let key_style = Style::default().bg(self.theme.status_bg).fg(self.theme.status_fg).add_modifier(Modifier::BOLD);
        for x in area.x..area.x + area.width {
            buf[(x, area.y)].set_char(' ').set_style(key_style);
        }

        let mut x = area.x;
        let end = area.x + area.width;
        for (key, label) in self.keys {
            let needed = (key.len() + label.len() + 2) as u16;
            if x + needed > end {
                break;
            }
            buf.set_string(x, area.y, key, key_style);
            x += key.len() as u16;
            buf.set_string(x, area.y, label, label_style);
            x += label.len() as u16 + 2;
        }
    }
}

/// Truncate a string to max_width (keeps the start)
fn truncate_str(s: &str, max_width: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_width {
        s.to_string()
    } else if max_width <= 1 {
        "…".to_string()
    } else {
        let mut result: String = s.chars().take(max_width - 1).collect();
        result.push('…');
        result
    }
}

/// Truncate a path to max_width (keeps the end)
fn truncate_path(s: &str, max_width: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_width {
        s.to_string()
    } else if max_width <= 1 {
        "…".to_string()
    } else {
        let skip = char_count - max_width + 1;
        let mut result = String::from("…");
        result.extend(s.chars().skip(skip));
        result
    }
}
