//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};


use crate::errors::{AppError, AppResult};
use crate::ui::ThemeConfig;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Bucket server connection
    pub server: ServerConfig,
    /// Listing behavior
    pub browser: BrowserConfig,
    pub upload: UploadConfig,
    pub confirmations: ConfirmConfig,
    pub logging: LoggingConfig,
    pub theme: ThemeConfig,
    /// Keyboard shortcuts
    pub keybindings: KeyBindings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the bucket server
    pub url: String,
    /// Path prefix of the API under `url`
    pub api_prefix: String,
    /// Timeout for listing and metadata requests
    pub timeout_secs: u64,
    /// Timeout for uploads and downloads
    pub upload_timeout_secs: u64,
    /// Last selected bucket
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Entries per page
    pub page_size: usize,
    /// Shortest pattern sent to the search endpoint
    pub search_min_length: usize,
    /// "", "name", "size" or "modified"
    pub sort_field: String,
    pub sort_reverse: bool,
    /// "full" or "brief"
    pub view_mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Percent points held back from the progress bar until the server answers
    pub overtime_coefficient: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmConfig {
    /// Ask before deleting files and folders
    pub delete: bool,
    /// Ask before stopping an upload batch
    pub cancel_upload: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Filter directive used when RUST_LOG is not set
    pub level: String,
}

/// Keyboard shortcut configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeyBindings {
    /// Custom keybindings (action -> key)
    #[serde(flatten)]
    pub bindings: HashMap<String, String>,
}

impl KeyBindings {
    /// Get the key binding for an action, falling back to default
    pub fn get(&self, action: &str) -> &str {
        self.bindings.get(action)
            .map(|s| s.as_str())
            .unwrap_or_else(|| default_keybinding(action))
    }

    /// Check if a key event matches an action
    pub fn matches(&self, action: &str, key: &crossterm::event::KeyEvent) -> bool {
        use crossterm::event::KeyCode;

        let Some((code, mods)) = parse_key_binding(self.get(action)) else {
            return false;
        };
        if key.modifiers != mods {
            return false;
        }
        match (&key.code, &code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => a.eq_ignore_ascii_case(b),
            _ => key.code == code,
        }
    }
}

/// Parse a key binding string like "Ctrl+C", "Alt+F1", "F10", etc.
pub fn parse_key_binding(s: &str) -> Option<(crossterm::event::KeyCode, crossterm::event::KeyModifiers)> {
    use crossterm::event::KeyModifiers;

    let mut modifiers = KeyModifiers::NONE;
    let mut parts: Vec<&str> = s.trim().split('+').collect();
    let key_str = parts.pop()?;

    for modifier in parts {
        match modifier.to_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "alt" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            _ => return None,
        }
    }

    Some((parse_key_code(key_str)?, modifiers))
}

fn parse_key_code(s: &str) -> Option<crossterm::event::KeyCode> {
    use crossterm::event::KeyCode;

    let s_lower = s.to_lowercase();

    if s_lower.starts_with('f') && s_lower.len() >= 2
        && let Ok(n) = s_lower[1..].parse::<u8>()
        && (1..=12).contains(&n)
    {
        return Some(KeyCode::F(n));
    }

    match s_lower.as_str() {
        "esc" | "escape" => Some(KeyCode::Esc),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        "backtab" => Some(KeyCode::BackTab),
        "backspace" | "bs" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        "insert" | "ins" => Some(KeyCode::Insert),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" | "pgup" => Some(KeyCode::PageUp),
        "pagedown" | "pgdn" => Some(KeyCode::PageDown),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "space" => Some(KeyCode::Char(' ')),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}

/// Get the default key binding for an action
pub fn default_keybinding(action: &str) -> &'static str {
    match action {
        // Application
        "quit" => "F10",
        "quit_alt" => "Ctrl+C",
        "refresh" => "Ctrl+R",

        // Listing
        "move_up" => "Up",
        "move_down" => "Down",
        "move_left" => "Left",
        "move_right" => "Right",
        "page_up" => "PageUp",
        "page_down" => "PageDown",
        "home" => "Home",
        "end" => "End",
        "enter" => "Enter",
        "go_parent" => "Backspace",
        "prev_page" => "Alt+PageUp",
        "next_page" => "Alt+PageDown",
        "toggle_view" => "Alt+M",

        // Sorting
        "sort_name" => "Ctrl+N",
        "sort_size" => "Ctrl+S",
        "sort_modified" => "Ctrl+T",
        "sort_unsorted" => "Ctrl+U",

        // Operations
        "view" => "F3",
        "download" => "F5",
        "upload" => "F6",
        "mkdir" => "F7",
        "delete" => "F8",
        "search" => "Alt+/",
        "select_bucket" => "Alt+F1",
        "select_bucket_alt" => "Ctrl+F1",
        "cdn_link" => "Ctrl+L",
        "share_link" => "Ctrl+K",

        // Viewer
        "viewer_next" => "Right",
        "viewer_prev" => "Left",
        "viewer_next_alt" => "n",
        "viewer_prev_alt" => "p",
        "viewer_close" => "Esc",

        _ => "",
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            api_prefix: "api".to_string(),
            timeout_secs: 15,
            upload_timeout_secs: 600,
            bucket: None,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            search_min_length: 3,
            sort_field: String::new(),
            sort_reverse: false,
            view_mode: "full".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { overtime_coefficient: 1 }
    }
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self {
            delete: true,
            cancel_upload: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
        }
    }
}

/// Get the config directory path for the current platform
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|p| PathBuf::from(p).join("bucketview"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        // XDG_CONFIG_HOME first, then ~/.config
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|p| PathBuf::from(p).join(".config")))
            .map(|p| p.join("bucketview"))
    }
}

/// Get the config file path
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Default config file content with comments
fn default_config() -> String {
    r##"# bucketview configuration
# This file is auto-generated. Edit as needed.

[server]
# Bucket server address (can be overridden on the command line)
url = "http://localhost:8080"

# API path under the server address
api_prefix = "api"

# Request timeouts in seconds
timeout_secs = 15
upload_timeout_secs = 600

# Last selected bucket (updated automatically)
# bucket = "my-bucket"

[browser]
# Entries shown per page
page_size = 100

# Shortest search pattern sent to the server
search_min_length = 3

# Initial sort: "" (server order), "name", "size", "modified"
sort_field = ""
sort_reverse = false

# "full" (name, size, modified) or "brief" (two columns of names)
view_mode = "full"

[upload]
# Progress shown while a file is sent stops this many percent short of 100
# until the server confirms the upload
overtime_coefficient = 1

[confirmations]
delete = true
cancel_upload = true

[logging]
# Log file: bucketview.log next to this file. RUST_LOG overrides the level.
enabled = true
level = "info"

[theme]
# Presets: "dark", "classic", "light"
preset = "dark"

# Override single colors of the active theme:
# [theme.colors]
# cursor_bg = "#005f5f"
# status_admin = "yellow"

# Custom themes inherit from a preset or another custom theme:
# [theme.themes.mine]
# base = "light"
# panel_background = "#fafafa"

# Name highlighting, first match wins. Pattern is a regex on the name,
# or "folder" / "cdn" (entries with a CDN link).
# [[theme.highlights]]
# pattern = "\\.(jpg|png)$"
# color = "magenta"

[keybindings]
# Format: "Key", "Ctrl+Key", "Alt+Key", "Shift+Key"
# quit = "F10"
# view = "F3"
# download = "F5"
# upload = "F6"
# mkdir = "F7"
# delete = "F8"
# search = "Alt+/"
# select_bucket = "Alt+F1"
# select_bucket_alt = "Ctrl+F1"
# refresh = "Ctrl+R"
# cdn_link = "Ctrl+L"
# share_link = "Ctrl+K"
# sort_name = "Ctrl+N"
# sort_size = "Ctrl+S"
# sort_modified = "Ctrl+T"
# sort_unsorted = "Ctrl+U"
# prev_page = "Alt+PageUp"
# next_page = "Alt+PageDown"
# toggle_view = "Alt+M"
"##.to_string()
}

/// A loaded configuration plus whatever went wrong getting it. Loading
/// runs before logging is set up, so problems travel back to the caller.
#[derive(Debug)]
pub struct Loaded {
    pub config: Config,
    pub warnings: Vec<String>,
}

impl Loaded {
    fn fallback(warning: String) -> Self {
        Loaded { config: Config::default(), warnings: vec![warning] }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Loaded {
        let Some(config_path) = config_file() else {
            return Loaded::fallback("Could not determine config directory, using default configuration".to_string());
        };
        Self::load_from(&config_path)
    }

    /// Load from a specific file, writing the commented default first if
    /// it is missing. Any failure falls back to defaults with a warning.
    pub fn load_from(config_path: &Path) -> Loaded {
        if let Some(config_dir) = config_path.parent()
            && !config_dir.exists()
            && let Err(e) = fs::create_dir_all(config_dir)
        {
            return Loaded::fallback(format!("Could not create config directory {}: {}", config_dir.display(), e));
        }

        if !config_path.exists()
            && let Err(e) = fs::write(config_path, default_config())
        {
            return Loaded::fallback(format!("Could not create config file {}: {}", config_path.display(), e));
        }

        match fs::read_to_string(config_path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => Loaded { config, warnings: Vec::new() },
                Err(e) => Loaded::fallback(format!(
                    "Could not parse config file {}: {}. Using default configuration",
                    config_path.display(),
                    e
                )),
            },
            Err(e) => Loaded::fallback(format!("Could not read config file {}: {}", config_path.display(), e)),
        }
    }

    pub fn parse(content: &str) -> AppResult<Self> {
        toml_edit::de::from_str(content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Remember the selected bucket, in memory and in the file
    pub fn remember_bucket(&mut self, name: &str, config_path: &Path) -> AppResult<()> {
        self.server.bucket = Some(name.to_string());
        self.save_bucket_to(config_path)
    }

    /// Write `server.bucket` into an existing file, leaving comments and
    /// every other value untouched
    pub fn save_bucket_to(&self, config_path: &Path) -> AppResult<()> {
        use toml_edit::{DocumentMut, Item, Table, value};

        let existing = if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            default_config()
        };
        let mut doc: DocumentMut = existing
            .parse()
            .map_err(|e: toml_edit::TomlError| AppError::Config(e.to_string()))?;

        if !doc.contains_table("server") {
            doc["server"] = Item::Table(Table::new());
        }
        if let Some(server) = doc.get_mut("server").and_then(|v| v.as_table_mut()) {
            match &self.server.bucket {
                Some(bucket) => server["bucket"] = value(bucket.as_str()),
                None => {
                    server.remove("bucket");
                }
            }
        }

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(config_path, doc.to_string())?;
        Ok(())
    }
}
