//! In-memory server used by controller tests

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::sync::Mutex;

use super::{ApiError, ApiResult, Entry, ProgressFn, StorageApi, UploadBody};

#[derive(Default)]
struct MockState {
    listings: HashMap<String, Vec<Entry>>,
    buckets: Vec<String>,
    can_upload: bool,
    can_delete: bool,
    /// Operation names that fail, optionally restricted to one path
    failing: HashSet<(String, Option<String>)>,
    files: HashMap<String, Vec<u8>>,
    calls: Vec<(String, String)>,
}

pub struct MockApi {
    state: Mutex<MockState>,
}

pub fn file(path: &str, size: u64) -> Entry {
    let name = path.rsplit('/').next().unwrap_or(path).to_string();
    Entry {
        name,
        path: path.to_string(),
        folder: false,
        size: Some(size),
        modified: None,
        cdn_url: None,
    }
}

pub fn folder(path: &str) -> Entry {
    let trimmed = path.trim_end_matches('/');
    let name = trimmed.rsplit('/').next().unwrap_or(trimmed);
    Entry {
        name: format!("{}/", name),
        path: format!("{}/", trimmed),
        folder: true,
        size: Some(0),
        modified: None,
        cdn_url: None,
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self { state: Mutex::new(MockState::default()) }
    }

    pub fn with_listing(self, path: &str, entries: Vec<Entry>) -> Self {
        self.state.lock().unwrap().listings.insert(path.to_string(), entries);
        self
    }

    pub fn with_buckets(self, buckets: &[&str]) -> Self {
        self.state.lock().unwrap().buckets = buckets.iter().map(|b| b.to_string()).collect();
        self
    }

    pub fn with_permissions(self, can_upload: bool, can_delete: bool) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.can_upload = can_upload;
            state.can_delete = can_delete;
        }
        self
    }

    pub fn with_file(self, path: &str, data: &[u8]) -> Self {
        self.state.lock().unwrap().files.insert(path.to_string(), data.to_vec());
        self
    }

    /// Make every call of `op` fail
    pub fn fail(&self, op: &str) {
        self.state.lock().unwrap().failing.insert((op.to_string(), None));
    }

    /// Make `op` fail only for `path`
    pub fn fail_on(&self, op: &str, path: &str) {
        self.state.lock().unwrap().failing.insert((op.to_string(), Some(path.to_string())));
    }

    pub fn set_listing(&self, path: &str, entries: Vec<Entry>) {
        self.state.lock().unwrap().listings.insert(path.to_string(), entries);
    }

    /// Stored contents of an uploaded or seeded file
    pub fn file_data(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    /// Number of recorded calls of `op`
    pub fn calls(&self, op: &str) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|(o, _)| o == op).count()
    }

    /// Arguments of every recorded call of `op`, in order
    pub fn call_args(&self, op: &str) -> Vec<String> {
        self.state.lock().unwrap().calls.iter()
            .filter(|(o, _)| o == op)
            .map(|(_, a)| a.clone())
            .collect()
    }

    fn record(&self, op: &str, arg: &str) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((op.to_string(), arg.to_string()));
        let fails = state.failing.contains(&(op.to_string(), None))
            || state.failing.contains(&(op.to_string(), Some(arg.to_string())));
        if fails {
            Err(ApiError::Status { code: 500, message: format!("{} failed", op) })
        } else {
            Ok(())
        }
    }
}

impl StorageApi for MockApi {
    fn list_files(&self, path: &str) -> ApiResult<Vec<Entry>> {
        self.record("list", path)?;
        Ok(self.state.lock().unwrap().listings.get(path).cloned().unwrap_or_default())
    }

    fn search_files(&self, pattern: &str) -> ApiResult<Vec<Entry>> {
        self.record("search", pattern)?;
        let state = self.state.lock().unwrap();
        let needle = pattern.to_lowercase();
        let mut found: Vec<Entry> = state.listings.values()
            .flatten()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }

    fn create_folder(&self, path: &str) -> ApiResult<()> {
        self.record("mkdir", path)
    }

    fn delete_file(&self, path: &str) -> ApiResult<()> {
        self.record("delete", path)
    }

    fn delete_folder(&self, path: &str) -> ApiResult<()> {
        self.record("deleteFolder", path)
    }

    fn upload_file(&self, path: &str, mut body: UploadBody, len: u64, mut progress: ProgressFn) -> ApiResult<()> {
        self.record("upload", path)?;
        let mut data = Vec::new();
        body.read_to_end(&mut data)?;
        let total = len;
        progress(total / 2, total);
        progress(total, total);
        self.state.lock().unwrap().files.insert(path.to_string(), data);
        Ok(())
    }

    fn list_buckets(&self) -> ApiResult<Vec<String>> {
        self.record("buckets", "")?;
        Ok(self.state.lock().unwrap().buckets.clone())
    }

    fn select_bucket(&self, name: &str) -> ApiResult<()> {
        self.record("bucket", name)
    }

    fn can_upload(&self) -> ApiResult<bool> {
        self.record("can_upload", "")?;
        Ok(self.state.lock().unwrap().can_upload)
    }

    fn can_delete(&self) -> ApiResult<bool> {
        self.record("can_delete", "")?;
        Ok(self.state.lock().unwrap().can_delete)
    }

    fn is_admin(&self) -> ApiResult<bool> {
        self.record("is_admin", "")?;
        Ok(false)
    }

    fn download(&self, path: &str) -> ApiResult<Vec<u8>> {
        self.record("download", path)?;
        self.state.lock().unwrap().files.get(path).cloned()
            .ok_or_else(|| ApiError::Status { code: 404, message: "Not found".to_string() })
    }

    fn download_url(&self, path: &str) -> String {
        format!("http://mock/api/download/{}", super::encode_path(path))
    }
}
