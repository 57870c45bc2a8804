//! Application state

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::api::{Entry, StorageApi};
use crate::config::Config;
use crate::ui::Theme;
use crate::validate::{join_path, local_file_name, validate_folder_name};

use super::background::{BackgroundTask, Permissions, TaskResult};
use super::mode::{Mode, SimpleConfirmAction};
use super::navigation::ViewerCursor;
use super::notify::{NotificationAction, NotificationKind, Notifications};
use super::panel::{Panel, SearchState, SortField, SortSpec, ViewMode};
use super::preview::{PreviewContent, PreviewKind, text_lines};
use super::upload::{UploadEvent, UploadStatus, apply_event, build_queue, collect_files};
use super::UiState;

/// Main application state
pub struct App {
    // === Listing ===
    pub panel: Panel,

    // === Mode and control ===
    pub mode: Mode,
    pub should_quit: bool,

    // === UI layout state ===
    pub ui: UiState,

    // === Server state ===
    pub api: Arc<dyn StorageApi>,
    pub buckets: Vec<String>,
    /// Active bucket, `None` until the server told us
    pub bucket: Option<String>,
    pub permissions: Permissions,

    pub notifications: Notifications,

    // === Configuration ===
    pub config: Config,
    /// Where `server.bucket` is persisted; `None` keeps it in memory only
    pub config_path: Option<PathBuf>,
    pub theme: Theme,
    /// Local folder downloads are written into
    pub download_dir: PathBuf,

    /// Name to place the cursor on once the next listing lands
    pending_select: Option<String>,
    /// File to open once the next listing lands (`--open`)
    pending_open: Option<String>,
    /// Bucket list and permissions have arrived at least once
    connected: bool,

    // === Background tasks ===
    /// Outstanding listing or search; replacing it abandons the old one
    pub load_task: Option<BackgroundTask>,
    /// Outstanding modal request (bucket switch, mutation, preview, upload)
    pub background_task: Option<BackgroundTask>,
    /// Cancel flag shared with the upload worker
    pub cancel_token: Option<Arc<AtomicBool>>,
}

impl App {
    /// Check if a key event matches a configurable action.
    #[inline]
    pub fn key_matches(&self, action: &str, key: &crossterm::event::KeyEvent) -> bool {
        self.config.keybindings.matches(action, key)
    }
}

// ============================================================================
// CORE / CONSTRUCTION
// ============================================================================

impl App {
    pub fn new(config: Config, api: Arc<dyn StorageApi>) -> Self {
        let sort = SortSpec {
            field: SortField::from_name(&config.browser.sort_field),
            reverse: config.browser.sort_reverse,
        };
        let panel = Panel::new(
            config.browser.page_size,
            sort,
            ViewMode::from_name(&config.browser.view_mode),
        );
        let theme = config.theme.build_theme();

        Self {
            panel,
            mode: Mode::Normal,
            should_quit: false,
            ui: UiState::default(),
            api,
            buckets: Vec::new(),
            bucket: None,
            permissions: Permissions::default(),
            notifications: Notifications::default(),
            config,
            config_path: None,
            theme,
            download_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            pending_select: None,
            pending_open: None,
            connected: false,
            load_task: None,
            background_task: None,
            cancel_token: None,
        }
    }

    /// Connect: list buckets, pick one, check permissions, then load the root.
    /// `open` names a file to open once the first listing arrives.
    pub fn start(&mut self, open: Option<String>) {
        self.pending_open = open;
        self.connect();
    }

    /// Surface configuration problems found before logging was up
    pub fn report_config_warnings(&mut self, warnings: &[String]) {
        for warning in warnings {
            warn!("{}", warning);
        }
        if let Some(last) = warnings.last() {
            self.notifications.error(last.clone());
        }
    }

    /// Run the bucket and permission handshake
    fn connect(&mut self) {
        info!(server = %self.config.server.url, "connecting");
        self.background_task = Some(BackgroundTask::bootstrap(
            self.api.clone(),
            self.config.server.bucket.clone(),
        ));
        self.mode = Mode::BackgroundTask {
            title: "Connecting".to_string(),
            message: self.config.server.url.clone(),
            frame: 0,
        };
    }

    /// Called once per event loop iteration
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Expire notifications as of `now`; a reload notification reloads
    pub fn tick_at(&mut self, now: Instant) {
        let actions = self.notifications.expire(now);
        if actions.contains(&NotificationAction::Reload) {
            self.reload();
        }
    }

    /// Breadcrumb segments: the bucket, then each folder of the path
    pub fn breadcrumbs(&self) -> Vec<String> {
        let mut crumbs = vec![self.bucket.clone().unwrap_or_else(|| "/".to_string())];
        crumbs.extend(
            self.panel.path.split('/').filter(|s| !s.is_empty()).map(str::to_string),
        );
        crumbs
    }
}

// ============================================================================
// LISTING AND NAVIGATION
// ============================================================================

impl App {
    /// Fetch the current folder again (or repeat the active search).
    /// Before the first handshake has finished this connects instead.
    pub fn reload(&mut self) {
        if !self.connected {
            self.connect();
            return;
        }
        if let Some(search) = &self.panel.search {
            let pattern = search.pattern.clone();
            self.load_task = Some(BackgroundTask::search(self.api.clone(), pattern));
        } else {
            debug!(path = %self.panel.path, "loading listing");
            self.load_task = Some(BackgroundTask::load(self.api.clone(), self.panel.path.clone()));
        }
        self.panel.loading = true;
    }

    pub fn navigate_to(&mut self, path: &str) {
        self.panel.change_path(path);
        self.reload();
    }

    /// Enter the selected folder, or open the selected file in the viewer
    pub fn enter_selected(&mut self) {
        let Some(entry) = self.panel.selected().cloned() else {
            return;
        };
        if entry.folder {
            self.navigate_to(entry.folder_path());
        } else {
            self.open_viewer(self.panel.cursor);
        }
    }

    /// One folder up; leaves search results first
    pub fn go_parent(&mut self) {
        if self.panel.is_search() {
            self.exit_search();
            return;
        }
        let Some(parent) = self.panel.parent_path() else {
            return;
        };
        let current = self.panel.path.rsplit('/').next().map(str::to_string);
        self.navigate_to(&parent);
        self.pending_select = current;
    }

    pub fn set_sort(&mut self, field: SortField) {
        self.panel.set_sort(field);
    }

    pub fn next_page(&mut self) {
        self.panel.next_page();
    }

    pub fn prev_page(&mut self) {
        self.panel.prev_page();
    }

    pub fn toggle_view_mode(&mut self) {
        let mode = self.panel.view_mode.toggled();
        self.panel.set_view_mode(mode);
    }

    /// Open a file of the current listing by name, turning to its page
    pub fn open_file_by_name(&mut self, name: &str) {
        let found = self.panel.sorted_entries()
            .iter()
            .position(|e| !e.folder && e.display_name() == name);
        match found {
            Some(index) => {
                let size = self.panel.page().size.max(1);
                self.panel.set_page(index / size);
                self.panel.cursor = index % size;
                self.open_viewer(self.panel.cursor);
            }
            None => self.notifications.error(format!("There is no file: {}", name)),
        }
    }

    fn handle_files_loaded(&mut self, path: String, result: crate::api::ApiResult<Vec<Entry>>) {
        if self.panel.is_search() || path != self.panel.path {
            debug!(%path, "ignoring stale listing");
            return;
        }
        match result {
            Ok(entries) => {
                info!(%path, count = entries.len(), "listing loaded");
                self.panel.set_entries(entries);
                if let Some(name) = self.pending_select.take() {
                    self.panel.select_name(&name);
                }
                if let Some(name) = self.pending_open.take() {
                    self.open_file_by_name(&name);
                }
            }
            Err(e) => {
                warn!(%path, error = %e, "listing failed");
                self.pending_select = None;
                self.panel.loading = false;
                self.panel.error = Some(e.to_string());
                self.notifications.push(
                    format!("Something went wrong, while loading files... {}", e),
                    NotificationKind::Error,
                    NotificationAction::Reload,
                );
            }
        }
    }
}

// ============================================================================
// SEARCH
// ============================================================================

impl App {
    pub fn show_search_dialog(&mut self) {
        let pattern = self.panel.search.as_ref().map(|s| s.pattern.clone()).unwrap_or_default();
        self.mode = Mode::Searching {
            cursor_pos: pattern.chars().count(),
            pattern_input: pattern,
            focus: 0,
            error: None,
        };
    }

    /// Replace the listing with results for `pattern`
    pub fn execute_search(&mut self, pattern: &str) {
        let pattern = pattern.trim();
        let min = self.config.browser.search_min_length;
        if pattern.chars().count() < min {
            if let Mode::Searching { error, .. } = &mut self.mode {
                *error = Some(format!("Enter at least {} characters", min));
            }
            return;
        }

        info!(%pattern, "searching");
        self.mode = Mode::Normal;
        let path = self.panel.path.clone();
        self.panel.change_path(&path);
        self.panel.search = Some(SearchState { pattern: pattern.to_string() });
        self.reload();
    }

    /// Back from search results to the folder listing
    pub fn exit_search(&mut self) {
        if self.panel.search.is_none() {
            return;
        }
        let path = self.panel.path.clone();
        self.navigate_to(&path);
    }

    fn handle_search_done(&mut self, pattern: String, result: crate::api::ApiResult<Vec<Entry>>) {
        if self.panel.search.as_ref().map(|s| s.pattern.as_str()) != Some(pattern.as_str()) {
            return;
        }
        match result {
            Ok(entries) => self.panel.set_entries(entries),
            Err(e) => {
                self.panel.loading = false;
                self.panel.error = Some(e.to_string());
                self.notifications.push(
                    format!("Something went wrong... {}", e),
                    NotificationKind::Error,
                    NotificationAction::Reload,
                );
            }
        }
    }
}

// ============================================================================
// BUCKETS
// ============================================================================

impl App {
    pub fn show_bucket_selector(&mut self) {
        if self.buckets.is_empty() {
            self.notifications.info("No buckets available");
            return;
        }
        let selected = self.bucket.as_ref()
            .and_then(|b| self.buckets.iter().position(|x| x == b))
            .unwrap_or(0);
        self.mode = Mode::BucketSelector {
            buckets: self.buckets.clone(),
            selected,
        };
    }

    /// Switch the active bucket. Selecting the active one does nothing.
    pub fn select_bucket(&mut self, name: &str) {
        if self.bucket.as_deref() == Some(name) {
            self.mode = Mode::Normal;
            return;
        }
        info!(bucket = %name, "switching bucket");
        self.background_task = Some(BackgroundTask::select_bucket(self.api.clone(), name.to_string()));
        self.mode = Mode::BackgroundTask {
            title: "Bucket".to_string(),
            message: format!("Switching to {}", name),
            frame: 0,
        };
    }

    fn remember_bucket(&mut self, name: &str) {
        match &self.config_path {
            Some(path) => {
                if let Err(e) = self.config.remember_bucket(name, path) {
                    warn!(error = %e, "could not save bucket");
                }
            }
            None => self.config.server.bucket = Some(name.to_string()),
        }
    }

    fn bucket_error(&mut self, e: impl std::fmt::Display) {
        self.notifications.push(
            format!("Bucket selection error... {}", e),
            NotificationKind::Error,
            NotificationAction::Reload,
        );
    }
}

// ============================================================================
// FOLDERS, DELETE, DOWNLOAD, LINKS
// ============================================================================

impl App {
    /// Show mkdir dialog (F7)
    pub fn show_mkdir_dialog(&mut self) {
        if !self.permissions.can_upload {
            self.notifications.error("Sorry, but you don't have the permission to create folder");
            return;
        }
        self.mode = Mode::MakingDir {
            name_input: String::new(),
            cursor_pos: 0,
            focus: 0,
            error: None,
        };
    }

    /// Validate the name and create the folder under the current path.
    /// An invalid name stays in the dialog with its message.
    pub fn create_folder(&mut self, name: &str) {
        let name = match validate_folder_name(name) {
            Ok(name) => name,
            Err(e) => {
                if let Mode::MakingDir { error, .. } = &mut self.mode {
                    *error = Some(e.to_string());
                }
                return;
            }
        };

        let path = join_path(&self.panel.path, &name);
        info!(%path, "creating folder");
        self.background_task = Some(BackgroundTask::create_folder(self.api.clone(), path, name.clone()));
        self.mode = Mode::BackgroundTask {
            title: "Create folder".to_string(),
            message: name,
            frame: 0,
        };
    }

    /// Ask before deleting the selected entry (F8). Without the delete
    /// permission nothing happens.
    pub fn delete_selected(&mut self) {
        if !self.permissions.can_delete {
            return;
        }
        let Some(entry) = self.panel.selected().cloned() else {
            return;
        };

        if !self.config.confirmations.delete {
            self.execute_delete(entry);
            return;
        }

        let (message, warning) = if entry.folder {
            (
                format!("Delete the folder \"{}\"?", entry.display_name()),
                Some("This action will result in the complete deletion of all contents in this folder.".to_string()),
            )
        } else {
            (format!("Delete the file \"{}\"?", entry.display_name()), None)
        };
        self.mode = Mode::SimpleConfirm {
            message,
            warning,
            action: SimpleConfirmAction::Delete { entry },
            focus: 0,
        };
    }

    /// Execute a simple confirmation action
    pub fn execute_simple_confirm_action(&mut self, action: SimpleConfirmAction) {
        match action {
            SimpleConfirmAction::Delete { entry } => self.execute_delete(entry),
        }
    }

    fn execute_delete(&mut self, entry: Entry) {
        info!(path = %entry.path, folder = entry.folder, "deleting");
        let name = entry.display_name().to_string();
        self.background_task = Some(BackgroundTask::delete(self.api.clone(), entry));
        self.mode = Mode::BackgroundTask {
            title: "Delete".to_string(),
            message: name,
            frame: 0,
        };
    }

    /// Save the selected file into the download folder (F5). Only the last
    /// part of the server name is used, and existing files are left alone.
    pub fn download_selected(&mut self) {
        let Some(entry) = self.panel.selected().filter(|e| !e.folder).cloned() else {
            return;
        };
        let name = entry.display_name().to_string();
        let Some(file_name) = local_file_name(&name) else {
            warn!(%name, "refusing download with unsafe name");
            self.notifications.error(format!("{} can not be downloaded, due to: invalid file name", name));
            return;
        };
        let dest = self.download_dir.join(file_name);
        if dest.exists() {
            self.notifications.error(format!("{} can not be downloaded, due to: {} already exists", name, dest.display()));
            return;
        }
        self.background_task = Some(BackgroundTask::download(self.api.clone(), entry, dest));
        self.mode = Mode::BackgroundTask {
            title: "Download".to_string(),
            message: name,
            frame: 0,
        };
    }

    /// Show the CDN link of the selected entry (Ctrl+L)
    pub fn show_cdn_link(&mut self) {
        match self.panel.selected().and_then(|e| e.cdn_url.clone()) {
            Some(url) => self.notifications.info(format!("CDN link: {}", url)),
            None => self.notifications.info("Oooops. There is nothing to copy"),
        }
    }

    /// Show the download URL of the selected file (Ctrl+K)
    pub fn show_share_link(&mut self) {
        let Some(entry) = self.panel.selected().filter(|e| !e.folder) else {
            self.notifications.info("Oooops. There is nothing to copy");
            return;
        };
        let url = self.api.download_url(&entry.path);
        self.notifications.info(format!("Share link: {}", url));
    }
}

// ============================================================================
// UPLOAD
// ============================================================================

impl App {
    /// Show the upload dialog (F6)
    pub fn show_upload_dialog(&mut self) {
        if !self.permissions.can_upload {
            self.notifications.error("Sorry, but you don't have the permission to upload files");
            return;
        }
        self.mode = Mode::UploadPrompt {
            path_input: String::new(),
            cursor_pos: 0,
            focus: 0,
            error: None,
        };
    }

    /// Queue a local file (or the files of a directory) and start sending
    pub fn start_upload(&mut self, local: &str) {
        let local = local.trim();
        let files = if local.is_empty() {
            Err(crate::errors::AppError::Operation("Enter a file or directory path".to_string()))
        } else {
            collect_files(std::path::Path::new(local))
        };
        let files = match files {
            Ok(files) => files,
            Err(e) => {
                if let Mode::UploadPrompt { error, .. } = &mut self.mode {
                    *error = Some(e.to_string());
                }
                return;
            }
        };

        let items = build_queue(files, &self.panel.path);
        info!(count = items.len(), dir = %self.panel.path, "starting upload");
        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel_token = Some(cancel.clone());
        self.background_task = Some(BackgroundTask::upload(self.api.clone(), items.clone(), cancel));
        self.mode = Mode::Uploading {
            items,
            frame: 0,
            confirm_cancel: false,
            cancelling: false,
        };
    }

    /// Esc while uploading: ask first if configured
    pub fn request_cancel_upload(&mut self) {
        let ask = self.config.confirmations.cancel_upload;
        if let Mode::Uploading { confirm_cancel, cancelling, .. } = &mut self.mode {
            if *cancelling {
                return;
            }
            if ask {
                *confirm_cancel = true;
                return;
            }
        }
        self.cancel_upload();
    }

    /// Stop after the file being sent; nothing else starts
    pub fn cancel_upload(&mut self) {
        if let Some(cancel) = &self.cancel_token {
            cancel.store(true, Ordering::Relaxed);
        }
        if let Mode::Uploading { confirm_cancel, cancelling, .. } = &mut self.mode {
            *confirm_cancel = false;
            *cancelling = true;
        }
    }

    pub fn dismiss_cancel_upload(&mut self) {
        if let Mode::Uploading { confirm_cancel, .. } = &mut self.mode {
            *confirm_cancel = false;
        }
    }

    fn apply_upload_event(&mut self, event: UploadEvent) {
        let overtime = self.config.upload.overtime_coefficient;
        let Mode::Uploading { items, .. } = &mut self.mode else {
            return;
        };
        apply_event(items, &event, overtime);

        if let UploadEvent::Finished { index, .. } = event
            && let Some(item) = items.get(index)
        {
            match (item.status, &item.error) {
                (UploadStatus::Failed, Some(e)) => {
                    let message = format!("{} can not be uploaded, due to: {}", item.name, e);
                    self.notifications.error(message);
                }
                _ => {
                    let message = format!("{} was successfully uploaded!", item.name);
                    self.notifications.success(message);
                }
            }
        }
    }

    /// Apply pending upload events to the dialog
    pub fn poll_upload_progress(&mut self) {
        let events: Vec<UploadEvent> = match self.background_task.as_ref().and_then(|t| t.progress_rx.as_ref()) {
            Some(rx) => rx.try_iter().collect(),
            None => return,
        };
        for event in events {
            self.apply_upload_event(event);
        }
    }
}

// ============================================================================
// VIEWER
// ============================================================================

impl App {
    /// Open the viewer on entry `index` of the displayed page
    pub fn open_viewer(&mut self, index: usize) {
        let entries = self.panel.displayed_entries().to_vec();
        if entries.get(index).is_none_or(|e| e.folder) {
            return;
        }
        let cursor = ViewerCursor::new(&entries, index);
        self.mode = Mode::Viewing {
            entries,
            cursor,
            kind: PreviewKind::Unsupported,
            content: PreviewContent::Loading,
            scroll: 0,
        };
        self.load_preview();
    }

    /// Fill the viewer for its selected entry; text is fetched in the background
    fn load_preview(&mut self) {
        let Mode::Viewing { entries, cursor, kind, content, scroll } = &mut self.mode else {
            return;
        };
        let Some(entry) = entries.get(cursor.selected) else {
            return;
        };
        *kind = PreviewKind::for_entry(entry);
        *scroll = 0;
        if kind.needs_download() {
            *content = PreviewContent::Loading;
            self.background_task = Some(BackgroundTask::preview(self.api.clone(), entry.path.clone()));
        } else {
            *content = PreviewContent::Info;
            self.background_task = None;
        }
    }

    pub fn viewer_next(&mut self) {
        let moved = match &mut self.mode {
            Mode::Viewing { entries, cursor, .. } => cursor.forward(entries),
            _ => false,
        };
        if moved {
            self.load_preview();
        }
    }

    pub fn viewer_prev(&mut self) {
        let moved = match &mut self.mode {
            Mode::Viewing { entries, cursor, .. } => cursor.backward(entries),
            _ => false,
        };
        if moved {
            self.load_preview();
        }
    }

    /// Close the viewer, leaving the panel cursor on the last viewed file
    pub fn close_viewer(&mut self) {
        if let Mode::Viewing { cursor, .. } = &self.mode {
            self.panel.cursor = cursor.selected;
        }
        self.background_task = None;
        self.mode = Mode::Normal;
    }

    /// Entry currently shown in the viewer
    #[cfg(test)]
    pub fn viewer_entry(&self) -> Option<&Entry> {
        match &self.mode {
            Mode::Viewing { entries, cursor, .. } => entries.get(cursor.selected),
            _ => None,
        }
    }

    fn handle_preview_loaded(&mut self, path: String, result: crate::api::ApiResult<Vec<u8>>) {
        let Mode::Viewing { entries, cursor, content, .. } = &mut self.mode else {
            return;
        };
        if entries.get(cursor.selected).map(|e| e.path.as_str()) != Some(path.as_str()) {
            return;
        }
        match result {
            Ok(data) => *content = PreviewContent::Text(text_lines(&data)),
            Err(e) => {
                *content = PreviewContent::Error(e.to_string());
                self.notifications.error(format!("Something went wrong, while loading file... {}", e));
            }
        }
    }
}

// ============================================================================
// BACKGROUND TASKS
// ============================================================================

impl App {
    /// Abandon the current modal request (Esc on the spinner)
    pub fn cancel_background_task(&mut self) {
        self.background_task = None;
        self.mode = Mode::Normal;
        self.notifications.info("Request abandoned");
    }

    /// Check if a background task has completed and handle the result
    pub fn poll_background_task(&mut self) {
        self.poll_upload_progress();
        if let Some(result) = self.background_task.as_ref().and_then(|t| t.try_recv()) {
            self.poll_upload_progress();
            self.background_task = None;
            self.handle_task_result(result);
        }
        if let Some(result) = self.load_task.as_ref().and_then(|t| t.try_recv()) {
            self.load_task = None;
            self.handle_task_result(result);
        }
    }

    fn handle_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Bootstrapped { buckets, active, select_error, permissions } => {
                self.mode = Mode::Normal;
                self.connected = true;
                self.permissions = permissions;
                match buckets {
                    Ok(list) => {
                        self.buckets = list;
                        self.bucket = active;
                    }
                    Err(e) => {
                        self.notifications.push(
                            format!("Something went wrong, while loading buckets... {}", e),
                            NotificationKind::Error,
                            NotificationAction::Reload,
                        );
                    }
                }
                if let Some(e) = select_error {
                    self.bucket_error(e);
                }
                self.reload();
            }
            TaskResult::FilesLoaded { path, result } => self.handle_files_loaded(path, result),
            TaskResult::SearchDone { pattern, result } => self.handle_search_done(pattern, result),
            TaskResult::BucketSelected { name, result } => {
                self.mode = Mode::Normal;
                match result {
                    Ok(permissions) => {
                        self.bucket = Some(name.clone());
                        self.permissions = permissions;
                        self.remember_bucket(&name);
                        self.navigate_to("");
                    }
                    Err(e) => self.bucket_error(e),
                }
            }
            TaskResult::FolderCreated { name, result } => {
                self.mode = Mode::Normal;
                match result {
                    Ok(()) => {
                        self.notifications.success(format!("Folder {} was successfully created!", name));
                        self.pending_select = Some(name);
                        self.reload();
                    }
                    Err(e) => {
                        self.notifications.error(format!("Folder {} can not be created, due to: {}", name, e));
                    }
                }
            }
            TaskResult::Deleted { name, folder, result } => {
                self.mode = Mode::Normal;
                match (result, folder) {
                    (Ok(()), false) => {
                        self.notifications.success(format!("File {} was successfully deleted!", name));
                        self.reload();
                    }
                    (Ok(()), true) => {
                        self.notifications.success(format!("The folder {} was successfully deleted!", name));
                        self.reload();
                    }
                    (Err(e), false) => {
                        self.notifications.error(format!("File {} can not be deleted, due to: {}", name, e));
                    }
                    (Err(e), true) => {
                        self.notifications.error(format!("The folder {} can not be deleted, due to: {}", name, e));
                    }
                }
            }
            TaskResult::PreviewLoaded { path, result } => self.handle_preview_loaded(path, result),
            TaskResult::Downloaded { name, result } => {
                self.mode = Mode::Normal;
                match result {
                    Ok(path) => self.notifications.success(format!("{} saved to {}", name, path.display())),
                    Err(e) => self.notifications.error(format!("{} can not be downloaded, due to: {}", name, e)),
                }
            }
            TaskResult::UploadFinished { succeeded, failed, cancelled } => {
                info!(succeeded, failed, cancelled, "upload finished");
                self.cancel_token = None;
                self.mode = Mode::Normal;
                if cancelled {
                    self.notifications.info(format!("Upload stopped after {} file(s)", succeeded + failed));
                }
                self.reload();
            }
        }
    }

    /// Advance the spinner animation frame
    pub fn tick_spinner(&mut self) {
        match &mut self.mode {
            Mode::BackgroundTask { frame, .. } | Mode::Uploading { frame, .. } => {
                *frame = (*frame + 1) % 10;
            }
            _ => {}
        }
    }

    /// Run outstanding tasks to completion, handling each result in order
    #[cfg(test)]
    pub fn wait_for_task(&mut self) {
        loop {
            if let Some(task) = self.background_task.take() {
                let result = task.wait();
                if let Some(rx) = &task.progress_rx {
                    for event in rx.try_iter().collect::<Vec<_>>() {
                        self.apply_upload_event(event);
                    }
                }
                if let Some(result) = result {
                    self.handle_task_result(result);
                }
                continue;
            }
            if let Some(task) = self.load_task.take() {
                if let Some(result) = task.wait() {
                    self.handle_task_result(result);
                }
                continue;
            }
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockApi, file, folder};

    fn root_listing() -> Vec<Entry> {
        vec![
            folder("docs"),
            file("b.txt", 20),
            file("a.txt", 10),
            folder("media"),
            file("c.png", 30),
        ]
    }

    fn mock() -> Arc<MockApi> {
        Arc::new(
            MockApi::new()
                .with_buckets(&["alpha", "beta"])
                .with_permissions(true, true)
                .with_listing("", root_listing())
                .with_listing("docs", vec![file("docs/readme.md", 5), folder("docs/old")])
                .with_file("a.txt", b"hello\nworld"),
        )
    }

    fn started(api: Arc<MockApi>) -> App {
        let mut app = App::new(Config::default(), api);
        app.start(None);
        app.wait_for_task();
        app
    }

    fn select(app: &mut App, name: &str) {
        assert!(app.panel.select_name(name), "no entry {}", name);
    }

    #[test]
    fn test_start_picks_bucket_and_loads_root() {
        let api = mock();
        let app = started(api.clone());
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.bucket.as_deref(), Some("alpha"));
        assert_eq!(app.buckets, vec!["alpha", "beta"]);
        assert!(app.permissions.can_upload && app.permissions.can_delete);
        assert_eq!(app.panel.displayed_entries().len(), 5);
        assert!(!app.panel.loading);
        assert_eq!(api.call_args("list"), vec![""]);
        assert_eq!(app.breadcrumbs(), vec!["alpha"]);
    }

    #[test]
    fn test_load_failure_notifies_once_with_reload() {
        let api = mock();
        api.fail("list");
        let app = started(api);
        assert_eq!(app.notifications.count_containing("while loading files"), 1);
        let current = app.notifications.current().unwrap();
        assert_eq!(current.action, NotificationAction::Reload);
        assert!(app.panel.error.is_some());
    }

    #[test]
    fn test_navigation_resets_page_and_returns_to_folder() {
        let api = mock();
        let mut config = Config::default();
        config.browser.page_size = 2;
        let mut app = App::new(config, api.clone());
        app.start(None);
        app.wait_for_task();

        app.next_page();
        assert_eq!(app.panel.page().index, 1);

        app.navigate_to("docs");
        assert_eq!(app.panel.page().index, 0);
        app.wait_for_task();
        assert_eq!(app.breadcrumbs(), vec!["alpha", "docs"]);
        assert_eq!(app.panel.displayed_entries().len(), 2);

        app.go_parent();
        app.wait_for_task();
        assert_eq!(app.panel.path, "");
        assert_eq!(app.panel.selected().map(|e| e.display_name()), Some("docs"));
    }

    #[test]
    fn test_enter_folder_uses_trimmed_path() {
        let api = mock();
        let mut app = started(api.clone());
        select(&mut app, "docs");
        app.enter_selected();
        app.wait_for_task();
        assert_eq!(app.panel.path, "docs");
        assert_eq!(api.call_args("list"), vec!["", "docs"]);
    }

    #[test]
    fn test_stale_listing_is_ignored() {
        let api = mock();
        let mut app = started(api);
        app.handle_task_result(TaskResult::FilesLoaded {
            path: "elsewhere".to_string(),
            result: Ok(vec![file("x", 1)]),
        });
        assert_eq!(app.panel.displayed_entries().len(), 5);
    }

    #[test]
    fn test_delete_file_success_reloads_once() {
        let api = mock();
        let mut app = started(api.clone());
        select(&mut app, "a.txt");
        app.delete_selected();
        let Mode::SimpleConfirm { action, warning, .. } = app.mode.clone() else {
            panic!("expected confirm");
        };
        assert!(warning.is_none());
        app.execute_simple_confirm_action(action);
        app.wait_for_task();

        assert_eq!(api.call_args("delete"), vec!["a.txt"]);
        assert_eq!(api.calls("list"), 2);
        assert_eq!(app.notifications.count_containing("File a.txt was successfully deleted!"), 1);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn test_delete_file_failure_keeps_list() {
        let api = mock();
        api.fail("delete");
        let mut app = started(api.clone());
        let before = app.panel.displayed_entries().to_vec();
        select(&mut app, "a.txt");
        app.config.confirmations.delete = false;
        app.delete_selected();
        app.wait_for_task();

        assert_eq!(api.calls("list"), 1);
        assert_eq!(app.panel.displayed_entries(), before.as_slice());
        assert_eq!(app.notifications.history().len(), 1);
        assert_eq!(app.notifications.count_containing("File a.txt can not be deleted, due to:"), 1);
    }

    #[test]
    fn test_delete_folder_warns_and_reports() {
        let api = mock();
        let mut app = started(api.clone());
        select(&mut app, "media");
        app.delete_selected();
        let Mode::SimpleConfirm { action, warning, .. } = app.mode.clone() else {
            panic!("expected confirm");
        };
        assert!(warning.unwrap().contains("complete deletion of all contents"));
        app.execute_simple_confirm_action(action);
        app.wait_for_task();
        assert_eq!(api.call_args("deleteFolder"), vec!["media"]);
        assert_eq!(app.notifications.count_containing("The folder media was successfully deleted!"), 1);

        api.fail("deleteFolder");
        select(&mut app, "docs");
        app.config.confirmations.delete = false;
        app.delete_selected();
        app.wait_for_task();
        assert_eq!(app.notifications.count_containing("The folder docs can not be deleted, due to:"), 1);
    }

    #[test]
    fn test_delete_without_permission_is_silent() {
        let api = Arc::new(MockApi::new().with_listing("", root_listing()).with_permissions(true, false));
        let mut app = started(api.clone());
        select(&mut app, "a.txt");
        app.delete_selected();
        assert!(matches!(app.mode, Mode::Normal));
        assert!(app.notifications.history().is_empty());
        assert_eq!(api.calls("delete"), 0);
    }

    #[test]
    fn test_mkdir_validation_stays_in_dialog() {
        let api = mock();
        let mut app = started(api.clone());
        app.show_mkdir_dialog();
        app.create_folder("a/b");
        match &app.mode {
            Mode::MakingDir { error, .. } => assert_eq!(error.as_deref(), Some("Folder name can not contain '/'")),
            _ => panic!("dialog closed"),
        }
        app.create_folder("   ");
        assert!(matches!(app.mode, Mode::MakingDir { .. }));
        assert_eq!(api.calls("mkdir"), 0);
    }

    #[test]
    fn test_mkdir_creates_under_current_path() {
        let api = mock();
        let mut app = started(api.clone());
        app.navigate_to("docs");
        app.wait_for_task();
        app.show_mkdir_dialog();
        app.create_folder(" my-folder ");
        app.wait_for_task();
        assert_eq!(api.call_args("mkdir"), vec!["docs/my-folder"]);
        assert_eq!(app.notifications.count_containing("Folder my-folder was successfully created!"), 1);
        assert_eq!(api.call_args("list"), vec!["", "docs", "docs"]);
    }

    #[test]
    fn test_mkdir_and_upload_need_permission() {
        let api = Arc::new(MockApi::new().with_permissions(false, false));
        let mut app = started(api);
        app.show_mkdir_dialog();
        app.show_upload_dialog();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.notifications.count_containing("permission to create folder"), 1);
        assert_eq!(app.notifications.count_containing("permission to upload files"), 1);
    }

    #[test]
    fn test_upload_batch_reports_each_file() {
        let dir = std::env::temp_dir().join(format!("bv_app_upload_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("one.txt"), b"1").unwrap();
        std::fs::write(dir.join("two.txt"), b"22").unwrap();

        let api = mock();
        api.fail_on("upload", "docs/one.txt");
        let mut app = started(api.clone());
        app.navigate_to("docs");
        app.wait_for_task();

        app.show_upload_dialog();
        app.start_upload(&dir.to_string_lossy());
        assert!(matches!(app.mode, Mode::Uploading { .. }));
        app.wait_for_task();

        assert_eq!(api.call_args("upload"), vec!["docs/one.txt", "docs/two.txt"]);
        assert_eq!(app.notifications.count_containing("one.txt can not be uploaded, due to:"), 1);
        assert_eq!(app.notifications.count_containing("two.txt was successfully uploaded!"), 1);
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(api.call_args("list").last().map(String::as_str), Some("docs"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_upload_bad_path_stays_in_dialog() {
        let mut app = started(mock());
        app.show_upload_dialog();
        app.start_upload("/no/such/place");
        match &app.mode {
            Mode::UploadPrompt { error, .. } => assert!(error.is_some()),
            _ => panic!("dialog closed"),
        }
    }

    #[test]
    fn test_cancel_upload_asks_first() {
        let mut app = started(mock());
        app.cancel_token = Some(Arc::new(AtomicBool::new(false)));
        app.mode = Mode::Uploading { items: Vec::new(), frame: 0, confirm_cancel: false, cancelling: false };

        app.request_cancel_upload();
        assert!(matches!(app.mode, Mode::Uploading { confirm_cancel: true, .. }));
        app.dismiss_cancel_upload();
        assert!(!app.cancel_token.as_ref().unwrap().load(Ordering::Relaxed));

        app.request_cancel_upload();
        app.cancel_upload();
        assert!(matches!(app.mode, Mode::Uploading { cancelling: true, confirm_cancel: false, .. }));
        assert!(app.cancel_token.as_ref().unwrap().load(Ordering::Relaxed));
    }

    #[test]
    fn test_bucket_switch() {
        let api = mock();
        let mut app = started(api.clone());
        app.navigate_to("docs");
        app.wait_for_task();

        app.select_bucket("alpha");
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(api.call_args("bucket"), vec!["alpha"]);

        app.select_bucket("beta");
        app.wait_for_task();
        assert_eq!(app.bucket.as_deref(), Some("beta"));
        assert_eq!(app.config.server.bucket.as_deref(), Some("beta"));
        assert_eq!(app.panel.path, "");
        assert_eq!(app.panel.page().index, 0);
        assert_eq!(api.call_args("list").last().map(String::as_str), Some(""));
    }

    #[test]
    fn test_bucket_switch_failure() {
        let api = mock();
        let mut app = started(api.clone());
        api.fail("bucket");
        app.select_bucket("beta");
        app.wait_for_task();
        assert_eq!(app.bucket.as_deref(), Some("alpha"));
        assert_eq!(app.notifications.count_containing("Bucket selection error..."), 1);
    }

    #[test]
    fn test_search_and_back() {
        let api = mock();
        let mut app = started(api.clone());
        app.show_search_dialog();
        app.execute_search("ab");
        assert!(matches!(app.mode, Mode::Searching { error: Some(_), .. }));
        assert_eq!(api.calls("search"), 0);

        app.execute_search("readme");
        app.wait_for_task();
        assert!(app.panel.is_search());
        assert_eq!(app.panel.displayed_entries().len(), 1);

        app.go_parent();
        app.wait_for_task();
        assert!(!app.panel.is_search());
        assert_eq!(app.panel.displayed_entries().len(), 5);
    }

    #[test]
    fn test_viewer_walks_files_only() {
        let api = mock();
        let mut app = started(api.clone());
        app.set_sort(SortField::Name);
        // a.txt, b.txt, c.png, docs/, media/
        app.open_viewer(0);
        app.wait_for_task();
        match &app.mode {
            Mode::Viewing { content, kind, cursor, .. } => {
                assert_eq!(*kind, PreviewKind::Text);
                assert_eq!(*content, PreviewContent::Text(vec!["hello".into(), "world".into()]));
                assert_eq!(cursor.next, Some(1));
                assert_eq!(cursor.previous, None);
            }
            _ => panic!("viewer not open"),
        }

        app.viewer_next();
        app.viewer_next();
        assert_eq!(app.viewer_entry().map(|e| e.name.as_str()), Some("c.png"));
        assert!(matches!(app.mode, Mode::Viewing { content: PreviewContent::Info, .. }));
        app.viewer_next();
        assert_eq!(app.viewer_entry().map(|e| e.name.as_str()), Some("c.png"));

        app.close_viewer();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.panel.cursor, 2);
    }

    #[test]
    fn test_preview_error_notifies_once() {
        let api = mock();
        let mut app = started(api);
        app.set_sort(SortField::Name);
        app.open_viewer(1); // b.txt has no content in the mock
        app.wait_for_task();
        assert!(matches!(app.mode, Mode::Viewing { content: PreviewContent::Error(_), .. }));
        assert_eq!(app.notifications.count_containing("while loading file..."), 1);
    }

    #[test]
    fn test_open_by_name() {
        let api = mock();
        let mut app = App::new(Config::default(), api);
        app.start(Some("missing.txt".to_string()));
        app.wait_for_task();
        assert_eq!(app.notifications.count_containing("There is no file: missing.txt"), 1);

        app.open_file_by_name("a.txt");
        assert!(matches!(app.mode, Mode::Viewing { .. }));
    }

    #[test]
    fn test_links() {
        let mut app = started(mock());
        select(&mut app, "a.txt");
        app.show_cdn_link();
        assert_eq!(app.notifications.current().unwrap().message, "Oooops. There is nothing to copy");
        app.show_share_link();
        assert_eq!(app.notifications.current().unwrap().message, "Share link: http://mock/api/download/a.txt");
    }

    #[test]
    fn test_reload_notification_reloads_on_expiry() {
        let api = mock();
        let mut app = started(api.clone());
        app.notifications.push("boom", NotificationKind::Error, NotificationAction::Reload);

        app.tick();
        assert!(app.load_task.is_none());

        app.tick_at(Instant::now() + std::time::Duration::from_secs(7));
        assert!(app.load_task.is_some());
        app.wait_for_task();
        assert_eq!(api.calls("list"), 2);
        assert!(app.notifications.current().is_none());
    }

    fn named(name: &str, path: &str) -> Entry {
        Entry { name: name.to_string(), ..file(path, 5) }
    }

    #[test]
    fn test_download_stays_in_download_dir() {
        let dir = std::env::temp_dir().join(format!("bv_app_download_{}", std::process::id()));
        let inside = dir.join("work");
        std::fs::create_dir_all(&inside).unwrap();
        let escape = format!("../bv_escape_{}.txt", std::process::id());

        let api = Arc::new(
            MockApi::new()
                .with_listing("", vec![named(&escape, "x.txt"), named("..", "y.txt")])
                .with_file("x.txt", b"hello"),
        );
        let mut app = started(api.clone());
        app.download_dir = inside.clone();

        app.panel.cursor = 0;
        app.download_selected();
        app.wait_for_task();
        let saved = inside.join(format!("bv_escape_{}.txt", std::process::id()));
        assert_eq!(std::fs::read(&saved).unwrap(), b"hello");
        assert!(!dir.join(format!("bv_escape_{}.txt", std::process::id())).exists());

        // Second download of the same file keeps the local copy
        app.download_selected();
        assert!(app.background_task.is_none());
        assert_eq!(app.notifications.count_containing("already exists"), 1);

        app.panel.cursor = 1;
        app.download_selected();
        assert!(app.background_task.is_none());
        assert_eq!(app.notifications.count_containing("invalid file name"), 1);
        assert_eq!(api.calls("download"), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_open_by_name_turns_to_its_page() {
        let files: Vec<Entry> = (0..5).map(|i| file(&format!("f{}.txt", i), 1)).collect();
        let api = Arc::new(MockApi::new().with_listing("", files));
        let mut config = Config::default();
        config.browser.page_size = 2;
        let mut app = App::new(config, api);
        app.start(Some("f4.txt".to_string()));
        app.wait_for_task();

        assert_eq!(app.panel.page().index, 2);
        assert_eq!(app.viewer_entry().map(|e| e.name.as_str()), Some("f4.txt"));
        assert_eq!(app.notifications.count_containing("There is no file"), 0);

        app.close_viewer();
        app.open_file_by_name("f1.txt");
        assert_eq!(app.panel.page().index, 0);
        assert_eq!(app.panel.cursor, 1);
        assert_eq!(app.viewer_entry().map(|e| e.name.as_str()), Some("f1.txt"));
    }

    #[test]
    fn test_config_warnings_reach_the_status_bar() {
        let mut app = App::new(Config::default(), Arc::new(MockApi::new()));
        app.report_config_warnings(&["Could not parse config file x: bad".to_string()]);
        app.start(None);
        app.wait_for_task();
        assert_eq!(app.notifications.count_containing("Could not parse config file"), 1);
        assert!(app.notifications.current().is_some_and(|n| n.message.contains("Could not parse")));

        let mut app = App::new(Config::default(), Arc::new(MockApi::new()));
        app.report_config_warnings(&[]);
        assert!(app.notifications.current().is_none());
    }

    #[test]
    fn test_abandoned_connect_is_retried_on_refresh() {
        let api = mock();
        let mut app = App::new(Config::default(), api.clone());
        app.start(None);
        app.cancel_background_task();
        assert!(matches!(app.mode, Mode::Normal));
        assert!(app.bucket.is_none());

        app.reload();
        assert!(matches!(app.mode, Mode::BackgroundTask { .. }));
        assert!(app.load_task.is_none());
        app.wait_for_task();

        assert_eq!(app.bucket.as_deref(), Some("alpha"));
        assert!(app.permissions.can_upload);
        assert_eq!(app.panel.displayed_entries().len(), 5);

        // Once connected, refresh only lists again
        app.reload();
        assert!(app.background_task.is_none());
        assert!(app.load_task.is_some());
        app.wait_for_task();
    }
}
