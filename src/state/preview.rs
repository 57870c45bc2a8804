//! What the viewer can show for a file

use crate::api::Entry;

/// Largest body rendered as text; anything beyond is cut
pub const MAX_TEXT_PREVIEW: usize = 2 * 1024 * 1024;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PreviewKind {
    Text,
    Image,
    Video,
    Audio,
    Pdf,
    Unsupported,
}

impl PreviewKind {
    pub fn from_extension(ext: Option<&str>) -> Self {
        let Some(ext) = ext else {
            return PreviewKind::Unsupported;
        };
        match ext {
            "txt" | "md" | "log" | "json" | "csv" | "tsv" | "xml" | "yaml" | "yml" | "toml"
            | "ini" | "conf" | "cfg" | "html" | "htm" | "css" | "js" | "ts" | "rs" | "py"
            | "sh" | "sql" | "go" | "java" | "c" | "h" | "cpp" => PreviewKind::Text,
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "svg" | "ico" => PreviewKind::Image,
            "mp4" | "webm" | "mov" | "avi" | "mkv" => PreviewKind::Video,
            "mp3" | "wav" | "ogg" | "flac" | "m4a" => PreviewKind::Audio,
            "pdf" => PreviewKind::Pdf,
            _ => PreviewKind::Unsupported,
        }
    }

    pub fn for_entry(entry: &Entry) -> Self {
        Self::from_extension(entry.extension().as_deref())
    }

    pub fn label(self) -> &'static str {
        match self {
            PreviewKind::Text => "Text",
            PreviewKind::Image => "Image",
            PreviewKind::Video => "Video",
            PreviewKind::Audio => "Audio",
            PreviewKind::Pdf => "PDF document",
            PreviewKind::Unsupported => "Unknown",
        }
    }

    /// Only text is fetched; the rest is described by an info card
    pub fn needs_download(self) -> bool {
        self == PreviewKind::Text
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewContent {
    Loading,
    Text(Vec<String>),
    /// Info card for media and unknown types
    Info,
    Error(String),
}

/// Split downloaded bytes into display lines
pub fn text_lines(data: &[u8]) -> Vec<String> {
    let slice = &data[..data.len().min(MAX_TEXT_PREVIEW)];
    String::from_utf8_lossy(slice)
        .lines()
        .map(|l| l.replace('\t', "    "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::file;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(PreviewKind::for_entry(&file("notes/readme.MD", 1)), PreviewKind::Text);
        assert_eq!(PreviewKind::for_entry(&file("a.b.png", 1)), PreviewKind::Image);
        assert_eq!(PreviewKind::for_entry(&file("clip.mp4", 1)), PreviewKind::Video);
        assert_eq!(PreviewKind::for_entry(&file("doc.pdf", 1)), PreviewKind::Pdf);
        assert_eq!(PreviewKind::for_entry(&file("archive.tar.gz", 1)), PreviewKind::Unsupported);
        assert_eq!(PreviewKind::for_entry(&file("Makefile", 1)), PreviewKind::Unsupported);
    }

    #[test]
    fn test_text_lines() {
        let lines = text_lines(b"one\n\ttwo\r\nthree");
        assert_eq!(lines, vec!["one", "    two", "three"]);
        assert_eq!(text_lines(&[0xff, b'a']), vec!["\u{fffd}a"]);
    }
}
