//! HTTP implementation of the storage API (reqwest, blocking)

use std::io::Read;
use std::sync::RwLock;
use std::time::Duration;

use reqwest::blocking::{Body, Client, RequestBuilder, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{encode_path, ApiError, ApiResult, Entry, ProgressFn, StorageApi, UploadBody};

/// Cookie the server reads to pick the active bucket
const BUCKET_COOKIE: &str = "bucket.name";

/// Bucket server client
pub struct HttpApi {
    client: Client,
    /// Server URL joined with the API prefix, no trailing '/'
    base_url: String,
    timeout: Duration,
    upload_timeout: Duration,
    /// Bucket sent with every request once selected
    bucket: RwLock<Option<String>>,
}

impl HttpApi {
    pub fn new(server_url: &str, api_prefix: &str, timeout_secs: u64, upload_timeout_secs: u64) -> ApiResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: join_base(server_url, api_prefix),
            timeout: Duration::from_secs(timeout_secs.max(1)),
            upload_timeout: Duration::from_secs(upload_timeout_secs.max(1)),
            bucket: RwLock::new(None),
        })
    }

    fn endpoint(&self, tail: &str) -> String {
        format!("{}/{}", self.base_url, tail)
    }

    /// Create a request builder with the bucket cookie and the metadata timeout
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self.client.request(method, url).timeout(self.timeout);
        self.with_bucket(req)
    }

    fn with_bucket(&self, req: RequestBuilder) -> RequestBuilder {
        let bucket = self.bucket.read().ok().and_then(|b| b.clone());
        match bucket {
            Some(name) => req.header(
                reqwest::header::COOKIE,
                format!("{}={}", BUCKET_COOKIE, urlencoding::encode(&name)),
            ),
            None => req,
        }
    }

    fn send(&self, req: RequestBuilder) -> ApiResult<Response> {
        let response = req.send().map_err(|e| ApiError::Transport(e.to_string()))?;
        check_status(response)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        debug!(url, "GET");
        let response = self.send(self.request(Method::GET, url))?;
        let body = response.text().map_err(|e| ApiError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl StorageApi for HttpApi {
    fn list_files(&self, path: &str) -> ApiResult<Vec<Entry>> {
        let url = if path.is_empty() {
            self.endpoint("list")
        } else {
            self.endpoint(&format!("list/{}", encode_path(&format!("{}/", path))))
        };
        self.get_json(&url)
    }

    fn search_files(&self, pattern: &str) -> ApiResult<Vec<Entry>> {
        let url = format!("{}?pattern={}", self.endpoint("search"), urlencoding::encode(pattern));
        self.get_json(&url)
    }

    fn create_folder(&self, path: &str) -> ApiResult<()> {
        let url = self.endpoint(&format!("mkdir/{}", encode_path(path)));
        self.send(self.request(Method::POST, &url))?;
        Ok(())
    }

    fn delete_file(&self, path: &str) -> ApiResult<()> {
        let url = self.endpoint(&format!("delete/{}", encode_path(path)));
        self.send(self.request(Method::DELETE, &url))?;
        Ok(())
    }

    fn delete_folder(&self, path: &str) -> ApiResult<()> {
        let url = self.endpoint(&format!("deleteFolder/{}", encode_path(path)));
        self.send(self.request(Method::DELETE, &url))?;
        Ok(())
    }

    fn upload_file(&self, path: &str, body: UploadBody, len: u64, progress: ProgressFn) -> ApiResult<()> {
        let url = self.endpoint(&format!("upload/{}", encode_path(path)));
        let total = len;
        let reader = ProgressReader {
            inner: body,
            sent: 0,
            total,
            progress,
        };

        let req = self.client.request(Method::PUT, &url)
            .timeout(self.upload_timeout)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(Body::sized(reader, total));
        self.send(self.with_bucket(req))?;
        Ok(())
    }

    fn list_buckets(&self) -> ApiResult<Vec<String>> {
        self.get_json(&self.endpoint("buckets"))
    }

    fn select_bucket(&self, name: &str) -> ApiResult<()> {
        let req = self.request(Method::POST, &self.endpoint("bucket"))
            .form(&[("bucket", name)]);
        self.send(req)?;
        if let Ok(mut bucket) = self.bucket.write() {
            *bucket = Some(name.to_string());
        }
        Ok(())
    }

    fn can_upload(&self) -> ApiResult<bool> {
        self.get_json(&self.endpoint("can_upload"))
    }

    fn can_delete(&self) -> ApiResult<bool> {
        self.get_json(&self.endpoint("can_delete"))
    }

    fn is_admin(&self) -> ApiResult<bool> {
        self.get_json(&self.endpoint("is_admin"))
    }

    fn download(&self, path: &str) -> ApiResult<Vec<u8>> {
        let url = self.download_url(path);
        let req = self.with_bucket(self.client.request(Method::GET, &url).timeout(self.upload_timeout));
        let response = self.send(req)?;
        let bytes = response.bytes().map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn download_url(&self, path: &str) -> String {
        self.endpoint(&format!("download/{}", encode_path(path)))
    }
}

/// Join server URL and API prefix with exactly one '/' between them
fn join_base(server_url: &str, api_prefix: &str) -> String {
    let server = server_url.trim_end_matches('/');
    let prefix = api_prefix.trim_matches('/');
    if prefix.is_empty() {
        server.to_string()
    } else {
        format!("{}/{}", server, prefix)
    }
}

/// Turn a non-2xx response into `ApiError::Status` carrying the body text
fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let message = body.trim();
    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        message.to_string()
    };
    Err(ApiError::Status { code: status.as_u16(), message })
}

/// Request body that reports how much of it has been read
struct ProgressReader<R> {
    inner: R,
    sent: u64,
    total: u64,
    progress: ProgressFn,
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.sent += n as u64;
            (self.progress)(self.sent, self.total);
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_join_base() {
        assert_eq!(join_base("http://host:8080/", "/api/"), "http://host:8080/api");
        assert_eq!(join_base("http://host", ""), "http://host");
    }

    #[test]
    fn test_endpoints() {
        let api = HttpApi::new("http://host", "api", 15, 600).unwrap();
        assert_eq!(api.endpoint("buckets"), "http://host/api/buckets");
        assert_eq!(api.download_url("a b/c.txt"), "http://host/api/download/a%20b%2Fc.txt");
    }

    #[test]
    fn test_progress_reader_reports_bytes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut reader = ProgressReader {
            inner: std::io::Cursor::new(vec![0u8; 10]),
            sent: 0,
            total: 10,
            progress: Box::new(move |sent, total| sink.lock().unwrap().push((sent, total))),
        };

        let mut buf = [0u8; 4];
        while reader.read(&mut buf).unwrap() > 0 {}

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![(4, 10), (8, 10), (10, 10)]);
    }
}
