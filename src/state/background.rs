//! Background task handling for server requests

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, channel};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use crate::api::{ApiError, ApiResult, Entry, ProgressFn, StorageApi};
use super::upload::{UploadEvent, UploadItem};

/// What the current user may do in the active bucket
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Permissions {
    pub can_upload: bool,
    pub can_delete: bool,
    pub is_admin: bool,
}

impl Permissions {
    /// Ask the server; any failed check counts as "not allowed"
    pub fn fetch(api: &dyn StorageApi) -> Self {
        Self {
            can_upload: api.can_upload().unwrap_or(false),
            can_delete: api.can_delete().unwrap_or(false),
            is_admin: api.is_admin().unwrap_or(false),
        }
    }
}

/// Result of a background task
pub enum TaskResult {
    /// Startup: buckets listed and one made active
    Bootstrapped {
        buckets: ApiResult<Vec<String>>,
        active: Option<String>,
        /// Set when selecting `active` failed
        select_error: Option<ApiError>,
        permissions: Permissions,
    },
    /// Listing of `path` arrived
    FilesLoaded {
        path: String,
        result: ApiResult<Vec<Entry>>,
    },
    SearchDone {
        pattern: String,
        result: ApiResult<Vec<Entry>>,
    },
    /// Active bucket switched (permissions re-checked on success)
    BucketSelected {
        name: String,
        result: ApiResult<Permissions>,
    },
    FolderCreated {
        name: String,
        result: ApiResult<()>,
    },
    Deleted {
        name: String,
        folder: bool,
        result: ApiResult<()>,
    },
    PreviewLoaded {
        path: String,
        result: ApiResult<Vec<u8>>,
    },
    Downloaded {
        name: String,
        result: Result<PathBuf, String>,
    },
    /// Upload batch ended (completed, or stopped at a file boundary)
    UploadFinished {
        succeeded: usize,
        failed: usize,
        cancelled: bool,
    },
}

/// A background task with its communication channel
pub struct BackgroundTask {
    /// Receiver for task completion
    pub receiver: Receiver<TaskResult>,
    /// Per-file events for uploads
    pub progress_rx: Option<Receiver<UploadEvent>>,
    /// Thread handle (for cleanup)
    _handle: JoinHandle<()>,
}

impl BackgroundTask {
    fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> TaskResult + Send + 'static,
    {
        let (tx, rx) = channel::<TaskResult>();
        let handle = thread::spawn(move || {
            let _ = tx.send(work());
        });

        BackgroundTask {
            receiver: rx,
            progress_rx: None,
            _handle: handle,
        }
    }

    /// List buckets, pick the preferred one (or the first) and fetch permissions
    pub fn bootstrap(api: Arc<dyn StorageApi>, preferred: Option<String>) -> Self {
        Self::spawn(move || {
            let buckets = api.list_buckets();
            let mut active = None;
            let mut select_error = None;

            if let Ok(list) = &buckets {
                active = preferred
                    .filter(|p| list.contains(p))
                    .or_else(|| list.first().cloned());
                if let Some(name) = &active
                    && let Err(e) = api.select_bucket(name)
                {
                    select_error = Some(e);
                }
            }

            TaskResult::Bootstrapped {
                buckets,
                active,
                select_error,
                permissions: Permissions::fetch(api.as_ref()),
            }
        })
    }

    pub fn load(api: Arc<dyn StorageApi>, path: String) -> Self {
        Self::spawn(move || {
            let result = api.list_files(&path);
            TaskResult::FilesLoaded { path, result }
        })
    }

    pub fn search(api: Arc<dyn StorageApi>, pattern: String) -> Self {
        Self::spawn(move || {
            let result = api.search_files(&pattern);
            TaskResult::SearchDone { pattern, result }
        })
    }

    pub fn select_bucket(api: Arc<dyn StorageApi>, name: String) -> Self {
        Self::spawn(move || {
            let result = api
                .select_bucket(&name)
                .map(|()| Permissions::fetch(api.as_ref()));
            TaskResult::BucketSelected { name, result }
        })
    }

    pub fn create_folder(api: Arc<dyn StorageApi>, path: String, name: String) -> Self {
        Self::spawn(move || {
            let result = api.create_folder(&path);
            TaskResult::FolderCreated { name, result }
        })
    }

    pub fn delete(api: Arc<dyn StorageApi>, entry: Entry) -> Self {
        Self::spawn(move || {
            let result = if entry.folder {
                api.delete_folder(entry.folder_path())
            } else {
                api.delete_file(&entry.path)
            };
            TaskResult::Deleted {
                name: entry.display_name().to_string(),
                folder: entry.folder,
                result,
            }
        })
    }

    pub fn preview(api: Arc<dyn StorageApi>, path: String) -> Self {
        Self::spawn(move || {
            let result = api.download(&path);
            TaskResult::PreviewLoaded { path, result }
        })
    }

    /// Fetch a file and write it to `dest`, which must not exist yet
    pub fn download(api: Arc<dyn StorageApi>, entry: Entry, dest: PathBuf) -> Self {
        Self::spawn(move || {
            let name = entry.display_name().to_string();
            let result = api
                .download(&entry.path)
                .map_err(|e| e.to_string())
                .and_then(|data| {
                    let mut file = fs::OpenOptions::new()
                        .write(true)
                        .create_new(true)
                        .open(&dest)
                        .map_err(|e| e.to_string())?;
                    file.write_all(&data).map_err(|e| e.to_string())
                })
                .map(|()| dest);
            TaskResult::Downloaded { name, result }
        })
    }

    /// Upload queued files one at a time. The cancel flag is checked
    /// before each file; a file already being sent always finishes.
    pub fn upload(api: Arc<dyn StorageApi>, items: Vec<UploadItem>, cancel: Arc<AtomicBool>) -> Self {
        let (tx, rx) = channel::<TaskResult>();
        let (progress_tx, progress_rx) = channel::<UploadEvent>();

        let handle = thread::spawn(move || {
            let mut succeeded = 0usize;
            let mut failed = 0usize;
            let mut cancelled = false;

            for (index, item) in items.iter().enumerate() {
                if cancel.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }

                let _ = progress_tx.send(UploadEvent::Started(index));
                info!(file = %item.remote_path, "uploading");

                let ptx = progress_tx.clone();
                let progress: ProgressFn = Box::new(move |loaded, total| {
                    let _ = ptx.send(UploadEvent::Progress { index, loaded, total });
                });

                let result = fs::File::open(&item.local_path)
                    .and_then(|file| Ok((file.metadata()?.len(), file)))
                    .map_err(ApiError::from)
                    .and_then(|(len, file)| api.upload_file(&item.remote_path, Box::new(file), len, progress));

                let error = match result {
                    Ok(()) => {
                        succeeded += 1;
                        None
                    }
                    Err(e) => {
                        warn!(file = %item.remote_path, error = %e, "upload failed");
                        failed += 1;
                        Some(e.to_string())
                    }
                };
                let _ = progress_tx.send(UploadEvent::Finished { index, error });
            }

            let _ = tx.send(TaskResult::UploadFinished { succeeded, failed, cancelled });
        });

        BackgroundTask {
            receiver: rx,
            progress_rx: Some(progress_rx),
            _handle: handle,
        }
    }

    /// Check if the task has completed (non-blocking)
    pub fn try_recv(&self) -> Option<TaskResult> {
        self.receiver.try_recv().ok()
    }

    /// Block until the task completes
    #[cfg(test)]
    pub fn wait(&self) -> Option<TaskResult> {
        self.receiver.recv().ok()
    }
}
