//! Upload batch bookkeeping

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};
use crate::validate::join_path;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UploadStatus {
    Waiting,
    Uploading,
    Success,
    Failed,
}

/// One queued file
#[derive(Clone, Debug)]
pub struct UploadItem {
    pub name: String,
    pub local_path: PathBuf,
    /// Target path in the bucket
    pub remote_path: String,
    pub size: u64,
    pub status: UploadStatus,
    /// Displayed percentage, 0..=100
    pub progress: u8,
    pub error: Option<String>,
}

/// Event sent from the upload worker
#[derive(Clone, Debug)]
pub enum UploadEvent {
    Started(usize),
    Progress { index: usize, loaded: u64, total: u64 },
    Finished { index: usize, error: Option<String> },
}

/// Percentage shown while a file is being sent. The overtime coefficient
/// keeps it below 100 until the server has answered.
pub fn display_progress(loaded: u64, total: u64, overtime: u8) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = ((100 * loaded as u128 + total as u128 / 2) / total as u128) as i64;
    (percent - overtime as i64).clamp(0, 100) as u8
}

/// Files to upload from a local path: the file itself, or the regular
/// files directly inside a directory sorted by name.
pub fn collect_files(local: &Path) -> AppResult<Vec<PathBuf>> {
    let meta = fs::metadata(local)?;
    if meta.is_file() {
        return Ok(vec![local.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(local)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    if files.is_empty() {
        return Err(AppError::Operation(format!("No files to upload in {}", local.display())));
    }
    Ok(files)
}

/// Build the waiting queue for a batch going into `remote_dir`
pub fn build_queue(files: Vec<PathBuf>, remote_dir: &str) -> Vec<UploadItem> {
    files
        .into_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            UploadItem {
                remote_path: join_path(remote_dir, &name),
                name,
                local_path: path,
                size,
                status: UploadStatus::Waiting,
                progress: 0,
                error: None,
            }
        })
        .collect()
}

/// Apply a worker event to the queue
pub fn apply_event(items: &mut [UploadItem], event: &UploadEvent, overtime: u8) {
    match *event {
        UploadEvent::Started(index) => {
            if let Some(item) = items.get_mut(index) {
                item.status = UploadStatus::Uploading;
                item.progress = 0;
            }
        }
        UploadEvent::Progress { index, loaded, total } => {
            if let Some(item) = items.get_mut(index) {
                item.progress = display_progress(loaded, total, overtime);
            }
        }
        UploadEvent::Finished { index, ref error } => {
            if let Some(item) = items.get_mut(index) {
                match error {
                    None => {
                        item.status = UploadStatus::Success;
                        item.progress = 100;
                    }
                    Some(e) => {
                        item.status = UploadStatus::Failed;
                        item.error = Some(e.clone());
                    }
                }
            }
        }
    }
}
