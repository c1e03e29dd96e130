//! Fragment transports.
//!
//! A [`FragmentSource`] turns one candidate path into fragment text or a
//! [`FetchError`]. Every error is treated as a failed candidate by the
//! loader.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use reqwest::Client;
use thiserror::Error;

/// Failure of a single candidate path.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("{path} not found")]
    NotFound { path: String },

    #[error("{path} timed out after {timeout_ms}ms")]
    Timeout { path: String, timeout_ms: u64 },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Something that can fetch fragment text by path.
pub trait FragmentSource: Send + Sync {
    /// Fetch the text at one candidate path.
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String>> + Send;

    /// What `path` resolves to. Candidates resolving to the same location
    /// are fetched once per round.
    fn location(&self, path: &str) -> String {
        path.to_string()
    }
}

/// User agent sent by [`HttpSource::new`].
pub const USER_AGENT: &str = concat!("component-loader/", env!("CARGO_PKG_VERSION"));

/// Strip the leading `/` or `./` that candidate paths carry.
fn relative_path(path: &str) -> &str {
    path.trim_start_matches("./").trim_start_matches('/')
}

/// Fetches fragments with HTTP GET relative to a base URL.
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a candidate path.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, relative_path(path))
    }
}

impl FragmentSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let url = self.url_for(path);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    fn location(&self, path: &str) -> String {
        self.url_for(path)
    }
}

/// Reads fragments from a directory on disk.
///
/// Useful for assembling pages at build time from the same tree a dev
/// server would serve.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a candidate path under the root, rejecting escapes.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(relative_path(path));
        if relative.as_os_str().is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(FetchError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl FragmentSource for FileSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let full_path = self.resolve(path)?;
        match tokio::fs::read_to_string(&full_path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::NotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(FetchError::Io(e)),
        }
    }

    fn location(&self, path: &str) -> String {
        match self.resolve(path) {
            Ok(full_path) => full_path.display().to_string(),
            Err(_) => path.to_string(),
        }
    }
}

/// Fragments held in memory, keyed by exact candidate path.
#[derive(Default)]
pub struct MemorySource {
    fragments: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fragment(mut self, path: impl Into<String>, html: impl Into<String>) -> Self {
        self.insert(path, html);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, html: impl Into<String>) {
        self.fragments.insert(path.into(), html.into());
    }

    /// Every path requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl FragmentSource for MemorySource {
    async fn fetch(&self, path: &str) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(path.to_string());
        }
        self.fragments
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                path: path.to_string(),
            })
    }
}
