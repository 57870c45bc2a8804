//! Input checks run before a request is built

use std::path::Path;

use crate::errors::ValidationError;

/// Check a new folder name and return it trimmed.
pub fn validate_folder_name(name: &str) -> Result<String, ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Empty);
    }
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Whitespace);
    }
    if trimmed.contains('/') {
        return Err(ValidationError::ContainsSlash);
    }
    Ok(trimmed.to_string())
}

/// Join a folder path and a child name ("" is the root)
pub fn join_path(parent: &str, name: &str) -> String {
    let parent = parent.trim_end_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Last path component of a server-supplied name, safe to join onto a
/// local folder. `None` for empty names and `.`/`..`.
pub fn local_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next()?;
    match Path::new(last).file_name()?.to_str()? {
        "" | "." | ".." => None,
        file => Some(file.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_name() {
        assert_eq!(validate_folder_name("my-folder"), Ok("my-folder".to_string()));
        assert_eq!(validate_folder_name("  photos 2024 "), Ok("photos 2024".to_string()));
    }

    #[test]
    fn test_rejects_slash() {
        assert_eq!(validate_folder_name("a/b"), Err(ValidationError::ContainsSlash));
        assert_eq!(validate_folder_name("/"), Err(ValidationError::ContainsSlash));
    }

    #[test]
    fn test_rejects_blank() {
        assert_eq!(validate_folder_name("   "), Err(ValidationError::Whitespace));
        assert_eq!(validate_folder_name(""), Err(ValidationError::Empty));
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "docs"), "docs");
        assert_eq!(join_path("a/b", "docs"), "a/b/docs");
        assert_eq!(join_path("a/b/", "x.txt"), "a/b/x.txt");
    }

    #[test]
    fn test_local_file_name() {
        assert_eq!(local_file_name("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(local_file_name("../escape.txt").as_deref(), Some("escape.txt"));
        assert_eq!(local_file_name("/etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(local_file_name("..\\win.ini").as_deref(), Some("win.ini"));
        assert_eq!(local_file_name(".."), None);
        assert_eq!(local_file_name("."), None);
        assert_eq!(local_file_name(""), None);
        assert_eq!(local_file_name("a/.."), None);
    }
}
