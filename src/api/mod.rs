//! Bucket server access
//!
//! The server exposes a small JSON/HTTP API rooted at a configurable prefix:
//! - `list/{path}`, `search?pattern=` return entry lists
//! - `mkdir/{path}`, `delete/{path}`, `deleteFolder/{path}`, `upload/{path}` mutate
//! - `buckets`, `bucket` list and select the active bucket
//! - `is_admin`, `can_upload`, `can_delete` report permissions
//! - `download/{path}` returns raw file bytes
//!
//! Every call is a single request with no retries. Failures are returned once
//! to the caller, which decides how to report them.

mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpApi;

use serde::Deserialize;
use thiserror::Error;

/// Error type for server calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Connection error: {0}")]
    Transport(String),
    #[error("Server returned {code}: {message}")]
    Status { code: u16, message: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Io(e.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Upload progress callback: (bytes sent, bytes total)
pub type ProgressFn = Box<dyn FnMut(u64, u64) + Send + 'static>;

/// Upload source, usually an open local file
pub type UploadBody = Box<dyn std::io::Read + Send + 'static>;

/// A file or folder record returned by the listing and search endpoints.
///
/// Folder names keep the trailing '/' the server gives them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Entry {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub folder: bool,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub cdn_url: Option<String>,
}

impl Entry {
    /// Name without the folder marker
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim_end_matches('/');
        if trimmed.is_empty() { &self.name } else { trimmed }
    }

    /// Path usable as a navigation target (no trailing '/')
    pub fn folder_path(&self) -> &str {
        self.path.trim_end_matches('/')
    }

    /// Extension taken from the text after the last '.' of the path
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.path.rsplit_once('.')?;
        if ext.is_empty() || ext.contains('/') {
            return None;
        }
        Some(ext.to_lowercase())
    }
}

/// Operations the browser needs from the bucket server.
///
/// Implementations are shared with worker threads, so calls take `&self`.
pub trait StorageApi: Send + Sync {
    /// List a folder ("" is the bucket root)
    fn list_files(&self, path: &str) -> ApiResult<Vec<Entry>>;

    /// Search the whole bucket by name pattern
    fn search_files(&self, pattern: &str) -> ApiResult<Vec<Entry>>;

    fn create_folder(&self, path: &str) -> ApiResult<()>;

    fn delete_file(&self, path: &str) -> ApiResult<()>;

    /// Delete a folder and everything under it
    fn delete_folder(&self, path: &str) -> ApiResult<()>;

    /// Upload one file of `len` bytes, streamed from `body`, reporting
    /// progress while it is sent
    fn upload_file(&self, path: &str, body: UploadBody, len: u64, progress: ProgressFn) -> ApiResult<()>;

    fn list_buckets(&self) -> ApiResult<Vec<String>>;

    /// Make `name` the active bucket for all later calls
    fn select_bucket(&self, name: &str) -> ApiResult<()>;

    fn can_upload(&self) -> ApiResult<bool>;

    fn can_delete(&self) -> ApiResult<bool>;

    fn is_admin(&self) -> ApiResult<bool>;

    /// Fetch raw file contents
    fn download(&self, path: &str) -> ApiResult<Vec<u8>>;

    /// Public URL of the download endpoint for a path
    fn download_url(&self, path: &str) -> String;
}

/// Percent-encode a bucket path as a single URL component ('/' included)
pub fn encode_path(path: &str) -> String {
    urlencoding::encode(path).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, path: &str, folder: bool) -> Entry {
        Entry {
            name: name.to_string(),
            path: path.to_string(),
            folder,
            size: None,
            modified: None,
            cdn_url: None,
        }
    }

    #[test]
    fn test_entry_from_json() {
        let json = r#"[
            {"path": "docs/", "name": "docs/", "size": 0, "folder": true},
            {"path": "a.txt", "name": "a.txt", "size": 12, "folder": false, "cdn_url": "https://cdn/a.txt"}
        ]"#;
        let entries: Vec<Entry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].folder);
        assert_eq!(entries[1].size, Some(12));
        assert_eq!(entries[1].cdn_url.as_deref(), Some("https://cdn/a.txt"));
        assert_eq!(entries[1].modified, None);
    }

    #[test]
    fn test_display_name_strips_folder_marker() {
        let e = entry("docs/", "photos/docs/", true);
        assert_eq!(e.display_name(), "docs");
        assert_eq!(e.folder_path(), "photos/docs");
    }

    #[test]
    fn test_extension() {
        assert_eq!(entry("a.TXT", "dir/a.TXT", false).extension().as_deref(), Some("txt"));
        assert_eq!(entry("Makefile", "dir.v2/Makefile", false).extension(), None);
        assert_eq!(entry("noext", "noext", false).extension(), None);
    }

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("a b/c.txt"), "a%20b%2Fc.txt");
        assert_eq!(encode_path(""), "");
    }
}
