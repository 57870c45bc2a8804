use crate::api::Entry;

use super::navigation::ViewerCursor;
use super::preview::{PreviewContent, PreviewKind};
use super::upload::UploadItem;

/// Action to perform on simple confirmation
#[derive(Clone, Debug)]
pub enum SimpleConfirmAction {
    /// Delete a file, or a folder with everything in it
    Delete { entry: Entry },
}

/// Application mode
#[derive(Clone, Debug)]
pub enum Mode {
    /// Normal file browsing
    Normal,
    /// Waiting for a request (spinner overlay)
    BackgroundTask {
        title: String,
        message: String,
        frame: usize,
    },
    /// Viewing a file (Enter / F3)
    Viewing {
        /// Snapshot of the displayed page the viewer walks through
        entries: Vec<Entry>,
        cursor: ViewerCursor,
        kind: PreviewKind,
        content: PreviewContent,
        scroll: usize,
    },
    /// New folder dialog (F7)
    MakingDir {
        name_input: String,
        cursor_pos: usize,
        focus: usize,
        /// Validation message shown under the input
        error: Option<String>,
    },
    /// Yes/No confirmation
    SimpleConfirm {
        message: String,
        /// Extra line drawn in the warning color
        warning: Option<String>,
        action: SimpleConfirmAction,
        focus: usize,
    },
    /// Bucket list (Alt+F1)
    BucketSelector {
        buckets: Vec<String>,
        selected: usize,
    },
    /// Search pattern dialog
    Searching {
        pattern_input: String,
        cursor_pos: usize,
        focus: usize,
        error: Option<String>,
    },
    /// Local path to upload (F6)
    UploadPrompt {
        path_input: String,
        cursor_pos: usize,
        focus: usize,
        error: Option<String>,
    },
    /// Upload batch in progress
    Uploading {
        items: Vec<UploadItem>,
        frame: usize,
        /// "Stop uploading the remaining files?" is showing
        confirm_cancel: bool,
        /// Cancel requested, waiting for the current file to finish
        cancelling: bool,
    },
}
