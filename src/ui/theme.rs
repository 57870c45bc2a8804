//! Color themes
//!
//! Built-in presets (dark, classic, light), per-color overrides, user
//! themes that inherit from another theme, and name highlighting rules.

use ratatui::style::Color;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete theme definition with all UI colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel
    pub panel_border: Color,
    pub panel_header: Color,
    pub panel_header_bg: Color,
    pub panel_column_separator: Color,
    pub panel_background: Color,
    /// Background while the panel shows search results
    pub search_panel_background: Color,

    // Breadcrumb line
    pub breadcrumb_bg: Color,
    pub breadcrumb_fg: Color,
    pub breadcrumb_bucket: Color,

    // File list
    pub file_normal: Color,
    pub file_directory: Color,
    pub cursor_bg: Color,
    pub cursor_fg: Color,

    // Status bar and notifications
    pub status_bg: Color,
    pub status_fg: Color,
    pub status_error_bg: Color,
    pub status_error_fg: Color,
    pub status_success_bg: Color,
    pub status_success_fg: Color,
    pub status_admin: Color,

    // Viewer
    pub viewer_header_bg: Color,
    pub viewer_header_fg: Color,
    pub viewer_content_bg: Color,
    pub viewer_content_fg: Color,
    pub viewer_line_number: Color,
    pub viewer_footer_bg: Color,
    pub viewer_footer_fg: Color,

    // Dialog backgrounds and borders per dialog kind
    pub dialog_upload_bg: Color,
    pub dialog_upload_border: Color,
    pub dialog_search_bg: Color,
    pub dialog_search_border: Color,
    pub dialog_delete_bg: Color,
    pub dialog_delete_border: Color,
    pub dialog_mkdir_bg: Color,
    pub dialog_mkdir_border: Color,
    // Dialog common
    pub dialog_title: Color,
    pub dialog_text: Color,
    pub dialog_warning: Color,
    pub dialog_input_focused_bg: Color,
    pub dialog_input_focused_fg: Color,
    pub dialog_input_selected_bg: Color,
    pub dialog_input_selected_fg: Color,
    pub dialog_input_unfocused_fg: Color,
    pub dialog_button_focused_bg: Color,
    pub dialog_button_focused_fg: Color,
    pub dialog_button_unfocused: Color,
    pub dialog_delete_button_focused_bg: Color,
    pub dialog_delete_button_focused_fg: Color,
    pub dialog_help: Color,

    /// Compiled name highlighting rules
    pub highlights: Vec<CompiledHighlight>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        let teal = Color::Rgb(0, 150, 136);
        let gold = Color::Rgb(200, 170, 100);
        let light_gray = Color::Rgb(171, 178, 191);
        let dark_gray = Color::Rgb(76, 82, 99);
        let charcoal = Color::Rgb(58, 58, 58);

        Self {
            panel_border: teal,
            panel_header: gold,
            panel_header_bg: Color::Rgb(95, 135, 135),
            panel_column_separator: Color::Rgb(120, 120, 120),
            panel_background: charcoal,
            search_panel_background: Color::Rgb(75, 70, 50),

            breadcrumb_bg: Color::Rgb(45, 45, 45),
            breadcrumb_fg: light_gray,
            breadcrumb_bucket: gold,

            file_normal: Color::Rgb(220, 220, 220),
            file_directory: Color::Rgb(171, 175, 135),
            cursor_bg: Color::Rgb(0, 95, 95),
            cursor_fg: Color::Rgb(220, 220, 220),

            status_bg: Color::Rgb(45, 45, 45),
            status_fg: light_gray,
            status_error_bg: Color::Rgb(180, 60, 60),
            status_error_fg: Color::White,
            status_success_bg: Color::Rgb(60, 110, 60),
            status_success_fg: Color::White,
            status_admin: gold,

            viewer_header_bg: teal,
            viewer_header_fg: Color::Black,
            viewer_content_bg: charcoal,
            viewer_content_fg: light_gray,
            viewer_line_number: dark_gray,
            viewer_footer_bg: teal,
            viewer_footer_fg: Color::Black,

            dialog_upload_bg: Color::Rgb(30, 50, 40),
            dialog_upload_border: Color::Rgb(152, 195, 121),
            dialog_search_bg: Color::Rgb(30, 40, 55),
            dialog_search_border: Color::Rgb(97, 175, 239),
            dialog_delete_bg: Color::Rgb(55, 35, 35),
            dialog_delete_border: Color::Rgb(224, 108, 117),
            dialog_mkdir_bg: Color::Rgb(60, 40, 25),
            dialog_mkdir_border: Color::Rgb(210, 140, 60),
            dialog_title: Color::White,
            dialog_text: light_gray,
            dialog_warning: gold,
            dialog_input_focused_bg: dark_gray,
            dialog_input_focused_fg: Color::White,
            dialog_input_selected_bg: Color::Rgb(0, 100, 150),
            dialog_input_selected_fg: Color::White,
            dialog_input_unfocused_fg: dark_gray,
            dialog_button_focused_bg: teal,
            dialog_button_focused_fg: Color::Black,
            dialog_button_unfocused: dark_gray,
            dialog_delete_button_focused_bg: Color::Rgb(224, 108, 117),
            dialog_delete_button_focused_fg: Color::White,
            dialog_help: dark_gray,

            highlights: Vec::new(),
        }
    }

    /// Blue panels with cyan frames
    pub fn classic() -> Self {
        Self {
            panel_border: Color::LightCyan,
            panel_header: Color::Yellow,
            panel_header_bg: Color::Cyan,
            panel_column_separator: Color::Cyan,
            panel_background: Color::Blue,
            search_panel_background: Color::Rgb(80, 80, 128),

            breadcrumb_bg: Color::Cyan,
            breadcrumb_fg: Color::Black,
            breadcrumb_bucket: Color::Blue,

            file_normal: Color::LightCyan,
            file_directory: Color::White,
            cursor_bg: Color::Cyan,
            cursor_fg: Color::Black,

            status_bg: Color::Cyan,
            status_fg: Color::Black,
            status_error_bg: Color::Red,
            status_error_fg: Color::White,
            status_success_bg: Color::Green,
            status_success_fg: Color::Black,
            status_admin: Color::Yellow,

            viewer_header_bg: Color::Cyan,
            viewer_header_fg: Color::Black,
            viewer_content_bg: Color::Blue,
            viewer_content_fg: Color::LightCyan,
            viewer_line_number: Color::Cyan,
            viewer_footer_bg: Color::Cyan,
            viewer_footer_fg: Color::Black,

            dialog_upload_bg: Color::Rgb(0, 64, 0),
            dialog_upload_border: Color::LightGreen,
            dialog_search_bg: Color::Rgb(0, 0, 96),
            dialog_search_border: Color::LightBlue,
            dialog_delete_bg: Color::Rgb(96, 0, 0),
            dialog_delete_border: Color::LightRed,
            dialog_mkdir_bg: Color::Rgb(96, 64, 0),
            dialog_mkdir_border: Color::Yellow,
            dialog_title: Color::White,
            dialog_text: Color::White,
            dialog_warning: Color::Yellow,
            dialog_input_focused_bg: Color::Cyan,
            dialog_input_focused_fg: Color::Black,
            dialog_input_selected_bg: Color::LightBlue,
            dialog_input_selected_fg: Color::Black,
            dialog_input_unfocused_fg: Color::Gray,
            dialog_button_focused_bg: Color::Cyan,
            dialog_button_focused_fg: Color::Black,
            dialog_button_unfocused: Color::Gray,
            dialog_delete_button_focused_bg: Color::LightRed,
            dialog_delete_button_focused_fg: Color::Black,
            dialog_help: Color::Gray,

            highlights: Vec::new(),
        }
    }

    /// For light terminal backgrounds
    pub fn light() -> Self {
        Self {
            panel_border: Color::Blue,
            panel_header: Color::Blue,
            panel_header_bg: Color::Gray,
            panel_column_separator: Color::Gray,
            panel_background: Color::White,
            search_panel_background: Color::Rgb(255, 255, 220),

            breadcrumb_bg: Color::Gray,
            breadcrumb_fg: Color::Black,
            breadcrumb_bucket: Color::Blue,

            file_normal: Color::Black,
            file_directory: Color::Blue,
            cursor_bg: Color::Blue,
            cursor_fg: Color::White,

            status_bg: Color::Gray,
            status_fg: Color::Black,
            status_error_bg: Color::Red,
            status_error_fg: Color::White,
            status_success_bg: Color::Green,
            status_success_fg: Color::Black,
            status_admin: Color::Rgb(180, 100, 0),

            viewer_header_bg: Color::Blue,
            viewer_header_fg: Color::White,
            viewer_content_bg: Color::White,
            viewer_content_fg: Color::Black,
            viewer_line_number: Color::Gray,
            viewer_footer_bg: Color::Blue,
            viewer_footer_fg: Color::White,

            dialog_upload_bg: Color::Rgb(220, 255, 220),
            dialog_upload_border: Color::Green,
            dialog_search_bg: Color::Rgb(220, 220, 255),
            dialog_search_border: Color::Blue,
            dialog_delete_bg: Color::Rgb(255, 220, 220),
            dialog_delete_border: Color::Red,
            dialog_mkdir_bg: Color::Rgb(255, 235, 200),
            dialog_mkdir_border: Color::Rgb(200, 120, 40),
            dialog_title: Color::Black,
            dialog_text: Color::Black,
            dialog_warning: Color::Red,
            dialog_input_focused_bg: Color::White,
            dialog_input_focused_fg: Color::Black,
            dialog_input_selected_bg: Color::Rgb(180, 210, 255),
            dialog_input_selected_fg: Color::Black,
            dialog_input_unfocused_fg: Color::Gray,
            dialog_button_focused_bg: Color::Blue,
            dialog_button_focused_fg: Color::White,
            dialog_button_unfocused: Color::DarkGray,
            dialog_delete_button_focused_bg: Color::Red,
            dialog_delete_button_focused_fg: Color::White,
            dialog_help: Color::Gray,

            highlights: Vec::new(),
        }
    }

    /// Get a built-in theme by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "classic" => Some(Self::classic()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    /// Apply color overrides; unknown keys and bad colors are ignored
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (key, value) in overrides {
            let Some(color) = parse_color(value) else {
                continue;
            };
            let slot = match key.as_str() {
                "panel_border" => &mut self.panel_border,
                "panel_header" => &mut self.panel_header,
                "panel_header_bg" => &mut self.panel_header_bg,
                "panel_column_separator" => &mut self.panel_column_separator,
                "panel_background" => &mut self.panel_background,
                "search_panel_background" => &mut self.search_panel_background,
                "breadcrumb_bg" => &mut self.breadcrumb_bg,
                "breadcrumb_fg" => &mut self.breadcrumb_fg,
                "breadcrumb_bucket" => &mut self.breadcrumb_bucket,
                "file_normal" => &mut self.file_normal,
                "file_directory" => &mut self.file_directory,
                "cursor_bg" => &mut self.cursor_bg,
                "cursor_fg" => &mut self.cursor_fg,
                "status_bg" => &mut self.status_bg,
                "status_fg" => &mut self.status_fg,
                "status_error_bg" => &mut self.status_error_bg,
                "status_error_fg" => &mut self.status_error_fg,
                "status_success_bg" => &mut self.status_success_bg,
                "status_success_fg" => &mut self.status_success_fg,
                "status_admin" => &mut self.status_admin,
                "viewer_header_bg" => &mut self.viewer_header_bg,
                "viewer_header_fg" => &mut self.viewer_header_fg,
                "viewer_content_bg" => &mut self.viewer_content_bg,
                "viewer_content_fg" => &mut self.viewer_content_fg,
                "viewer_line_number" => &mut self.viewer_line_number,
                "viewer_footer_bg" => &mut self.viewer_footer_bg,
                "viewer_footer_fg" => &mut self.viewer_footer_fg,
                "dialog_upload_bg" => &mut self.dialog_upload_bg,
                "dialog_upload_border" => &mut self.dialog_upload_border,
                "dialog_search_bg" => &mut self.dialog_search_bg,
                "dialog_search_border" => &mut self.dialog_search_border,
                "dialog_delete_bg" => &mut self.dialog_delete_bg,
                "dialog_delete_border" => &mut self.dialog_delete_border,
                "dialog_mkdir_bg" => &mut self.dialog_mkdir_bg,
                "dialog_mkdir_border" => &mut self.dialog_mkdir_border,
                "dialog_title" => &mut self.dialog_title,
                "dialog_text" => &mut self.dialog_text,
                "dialog_warning" => &mut self.dialog_warning,
                "dialog_input_focused_bg" => &mut self.dialog_input_focused_bg,
                "dialog_input_focused_fg" => &mut self.dialog_input_focused_fg,
                "dialog_input_selected_bg" => &mut self.dialog_input_selected_bg,
                "dialog_input_selected_fg" => &mut self.dialog_input_selected_fg,
                "dialog_input_unfocused_fg" => &mut self.dialog_input_unfocused_fg,
                "dialog_button_focused_bg" => &mut self.dialog_button_focused_bg,
                "dialog_button_focused_fg" => &mut self.dialog_button_focused_fg,
                "dialog_button_unfocused" => &mut self.dialog_button_unfocused,
                "dialog_delete_button_focused_bg" => &mut self.dialog_delete_button_focused_bg,
                "dialog_delete_button_focused_fg" => &mut self.dialog_delete_button_focused_fg,
                "dialog_help" => &mut self.dialog_help,
                _ => continue,
            };
            *slot = color;
        }
        self
    }

    /// First highlight rule matching an entry: (color, prefix, suffix)
    pub fn find_highlight(&self, name: &str, is_folder: bool, has_cdn: bool) -> Option<(Color, Option<&str>, Option<&str>)> {
        self.highlights.iter()
            .find(|h| match (h.special, &h.regex) {
                (Some(SpecialPattern::Folder), _) => is_folder,
                (Some(SpecialPattern::Cdn), _) => has_cdn,
                (None, Some(regex)) => !is_folder && regex.is_match(name),
                (None, None) => false,
            })
            .map(|h| (h.color, h.prefix.as_deref(), h.suffix.as_deref()))
    }
}

/// A user-defined theme
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CustomTheme {
    /// Theme to inherit from: a preset or another custom theme
    pub base: Option<String>,
    #[serde(flatten)]
    pub colors: HashMap<String, String>,
}

/// Highlighting rule as written in the config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHighlight {
    /// Regex on the name, or "folder" / "cdn" for folders and entries
    /// that have a CDN link
    pub pattern: String,
    pub color: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
}

/// Highlighting rule ready for matching
#[derive(Debug, Clone)]
pub struct CompiledHighlight {
    pub regex: Option<Regex>,
    pub special: Option<SpecialPattern>,
    pub color: Color,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecialPattern {
    Folder,
    Cdn,
}

/// `[theme]` section of the config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// "dark", "classic", "light", or a custom theme name
    pub preset: String,
    /// Overrides applied on top of the active theme
    #[serde(default)]
    pub colors: HashMap<String, String>,
    #[serde(default)]
    pub themes: HashMap<String, CustomTheme>,
    /// First match wins
    #[serde(default = "default_highlights")]
    pub highlights: Vec<FileHighlight>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            preset: "dark".to_string(),
            colors: HashMap::new(),
            themes: HashMap::new(),
            highlights: default_highlights(),
        }
    }
}

fn rule(pattern: &str, color: &str) -> FileHighlight {
    FileHighlight {
        pattern: pattern.to_string(),
        color: color.to_string(),
        prefix: None,
        suffix: None,
    }
}

fn default_highlights() -> Vec<FileHighlight> {
    vec![
        rule(r"\.(jpg|jpeg|png|gif|bmp|svg|webp|ico|tiff?)$", "magenta"),
        rule(r"\.(mp3|mp4|mkv|avi|mov|wav|flac|ogg|webm|m4a)$", "cyan"),
        rule(r"\.(pdf|doc|docx|odt|xls|xlsx|ppt|pptx)$", "yellow"),
        rule(r"\.(tar|gz|bz2|xz|zip|rar|7z|tgz|zst)$", "#b05050"),
        rule(r"\.(txt|md|json|csv|log|ya?ml|toml|xml)$", "lightblue"),
    ]
}

impl ThemeConfig {
    /// Resolve the active theme and compile its highlight rules
    pub fn build_theme(&self) -> Theme {
        let mut theme = self.resolve_theme(&self.preset, &mut Vec::new())
            .with_overrides(&self.colors);
        theme.highlights = self.compile_highlights();
        theme
    }

    fn compile_highlights(&self) -> Vec<CompiledHighlight> {
        self.highlights.iter().filter_map(|h| {
            let color = parse_color(&h.color)?;
            let (regex, special) = match h.pattern.to_lowercase().as_str() {
                "folder" | "dir" => (None, Some(SpecialPattern::Folder)),
                "cdn" => (None, Some(SpecialPattern::Cdn)),
                _ => (Some(Regex::new(&format!("(?i){}", h.pattern)).ok()?), None),
            };
            Some(CompiledHighlight {
                regex,
                special,
                color,
                prefix: h.prefix.clone(),
                suffix: h.suffix.clone(),
            })
        }).collect()
    }

    /// Resolve a theme by name through its chain of bases.
    /// `visited` breaks inheritance cycles.
    fn resolve_theme(&self, name: &str, visited: &mut Vec<String>) -> Theme {
        if visited.iter().any(|v| v == name) {
            return Theme::default();
        }
        visited.push(name.to_string());

        if let Some(theme) = Theme::by_name(name) {
            return theme;
        }
        match self.themes.get(name) {
            Some(custom) => {
                let base = custom.base.as_deref().unwrap_or("dark");
                self.resolve_theme(base, visited).with_overrides(&custom.colors)
            }
            None => Theme::default(),
        }
    }
}

/// Parse a color: a name ("red", "light_blue"), "#RRGGBB", "RRGGBB" or "rgb(R,G,B)"
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim().to_lowercase();

    let named = match s.as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "light_red" | "lightred" => Some(Color::LightRed),
        "light_green" | "lightgreen" => Some(Color::LightGreen),
        "light_yellow" | "lightyellow" => Some(Color::LightYellow),
        "light_blue" | "lightblue" => Some(Color::LightBlue),
        "light_magenta" | "lightmagenta" => Some(Color::LightMagenta),
        "light_cyan" | "lightcyan" => Some(Color::LightCyan),
        "reset" => Some(Color::Reset),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    let hex = s.strip_prefix('#').unwrap_or(&s);
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }

    let inner = s.strip_prefix("rgb(")?.strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').collect();
    if parts.len() != 3 {
        return None;
    }
    Some(Color::Rgb(
        parts[0].trim().parse().ok()?,
        parts[1].trim().parse().ok()?,
        parts[2].trim().parse().ok()?,
    ))
}
