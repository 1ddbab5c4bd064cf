//! Object storage: resolves a file key to a document on the local filesystem.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Source of raw document files, addressed by file key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Make the object behind `file_key` available locally and return its path.
    ///
    /// Fails when the object is missing or inaccessible.
    async fn download(&self, file_key: &str) -> anyhow::Result<PathBuf>;

    /// Store name for logging.
    fn name(&self) -> &str;
}

/// Reject keys that could escape the store root.
fn validate_key(file_key: &str) -> anyhow::Result<&Path> {
    let path = Path::new(file_key);
    anyhow::ensure!(!file_key.trim().is_empty(), "empty file key");
    anyhow::ensure!(
        path.components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir)),
        "file key `{file_key}` must be a relative path without `..`"
    );
    Ok(path)
}

/// Object store backed by a local directory. Keys are paths relative to the
/// root; nothing is copied.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn download(&self, file_key: &str) -> anyhow::Result<PathBuf> {
        let path = self.root.join(validate_key(file_key)?);
        let meta = tokio::fs::metadata(&path)
            .await
            .with_context(|| format!("object `{file_key}` not found in {}", self.root.display()))?;
        anyhow::ensure!(meta.is_file(), "object `{file_key}` is not a file");
        debug!(file_key = %file_key, path = %path.display(), "Resolved local object");
        Ok(path)
    }

    fn name(&self) -> &str {
        "local-dir"
    }
}

/// Object store that fetches `{base_url}/{file_key}` over HTTP(S), e.g. a
/// public S3 bucket endpoint, and writes the body into `download_dir`.
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    download_dir: PathBuf,
}

impl HttpObjectStore {
    pub fn new(
        base_url: &str,
        download_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            base_url.starts_with("http://") || base_url.starts_with("https://"),
            "object store URL must be an http(s) URL"
        );
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build object store HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            download_dir: download_dir.into(),
        })
    }

    fn object_url(&self, file_key: &str) -> String {
        format!("{}/{}", self.base_url, file_key.trim_start_matches('/'))
    }

    /// Local file name for a key: hex SHA-256 of the whole key plus its
    /// extension, so distinct keys never share a file in the download dir.
    fn local_name(file_key: &str) -> String {
        let digest = format!("{:x}", Sha256::digest(file_key.as_bytes()));
        match Path::new(file_key).extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{digest}.{ext}"),
            None => digest,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn download(&self, file_key: &str) -> anyhow::Result<PathBuf> {
        validate_key(file_key)?;
        let url = self.object_url(file_key);
        debug!(file_key = %file_key, url = %url, "Downloading object");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request for `{file_key}` failed"))?;
        let status = response.status();
        anyhow::ensure!(
            status.is_success(),
            "object store returned {status} for `{file_key}`"
        );
        let body = response
            .bytes()
            .await
            .with_context(|| format!("failed to read body of `{file_key}`"))?;

        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .with_context(|| format!("failed to create {}", self.download_dir.display()))?;
        let path = self.download_dir.join(Self::local_name(file_key));
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        debug!(
            file_key = %file_key,
            path = %path.display(),
            bytes = body.len(),
            "Downloaded object"
        );
        Ok(path)
    }

    fn name(&self) -> &str {
        "http"
    }
}
