//! File download capability.
//!
//! The transfer client never writes files itself. It hands a
//! [`DownloadSource`] and a file name to a [`FileDownloader`], which decides
//! how the bytes end up with the user.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, trace};

use layerkit_core::validate_file_name;

use crate::error::ClientError;
use crate::routes::resolve_against;

/// Binary response body held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Bytes,
    content_type: Option<String>,
}

impl Blob {
    /// Create a blob from bytes and the response content type.
    pub fn new(bytes: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
        }
    }

    /// Blob contents.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Content type reported by the server, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// What a downloader is asked to save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    /// Bytes already fetched by the client.
    Blob(Blob),
    /// A resource the downloader retrieves on its own.
    Url {
        /// Location of the resource, absolute or root-relative.
        url: String,
        /// Whether a browser-like downloader should open it in a new context.
        new_context: bool,
    },
}

/// Saves downloads on behalf of the transfer client.
#[async_trait]
pub trait FileDownloader: Send + Sync {
    /// Save `source` under `file_name`.
    async fn save(&self, source: DownloadSource, file_name: &str) -> Result<(), ClientError>;
}

/// Writes downloads into a directory on the local filesystem.
///
/// Every file is written to a staging file next to its target and renamed
/// into place once complete, so a failed download leaves nothing behind.
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    dir: PathBuf,
    http: reqwest::Client,
    origin: Option<Url>,
}

impl DirectoryDownloader {
    /// Create a downloader writing into `dir`. The directory is created on
    /// first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            http: reqwest::Client::new(),
            origin: None,
        }
    }

    /// Builder method to set the origin root-relative URL sources resolve
    /// against.
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Path a file with this name is saved to.
    pub fn target_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    async fn save_blob(&self, blob: Blob, target: &Path, file_name: &str) -> Result<(), ClientError> {
        let (staged, mut file) = StagedFile::create(&self.dir, file_name).await?;
        file.write_all(blob.bytes()).await?;
        file.flush().await?;
        drop(file);

        staged.persist(target).await?;
        info!(path = %target.display(), bytes = blob.len(), "Saved download");
        Ok(())
    }

    async fn save_url(
        &self,
        url: &str,
        new_context: bool,
        target: &Path,
        file_name: &str,
    ) -> Result<(), ClientError> {
        let url = resolve_against(self.origin.as_ref(), url)?;
        debug!(url = %url, new_context, "Fetching download");

        let mut response = self.http.get(url).send().await?.error_for_status()?;

        let (staged, mut file) = StagedFile::create(&self.dir, file_name).await?;
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;
        drop(file);

        staged.persist(target).await?;
        info!(path = %target.display(), bytes = written, "Saved download");
        Ok(())
    }
}

#[async_trait]
impl FileDownloader for DirectoryDownloader {
    async fn save(&self, source: DownloadSource, file_name: &str) -> Result<(), ClientError> {
        validate_file_name(file_name)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let target = self.target_path(file_name);

        match source {
            DownloadSource::Blob(blob) => self.save_blob(blob, &target, file_name).await,
            DownloadSource::Url { url, new_context } => {
                self.save_url(&url, new_context, &target, file_name).await
            }
        }
    }
}

static STAGE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary file holding a download until it is complete.
///
/// Removed on drop unless it was persisted.
struct StagedFile {
    path: PathBuf,
    persisted: bool,
}

impl StagedFile {
    async fn create(dir: &Path, file_name: &str) -> std::io::Result<(Self, tokio::fs::File)> {
        let seq = STAGE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = dir.join(format!(".{}.{}-{}.part", file_name, std::process::id(), seq));

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        trace!(path = %path.display(), "Staging file created");

        Ok((
            Self {
                path,
                persisted: false,
            },
            file,
        ))
    }

    async fn persist(mut self, target: &Path) -> std::io::Result<()> {
        tokio::fs::rename(&self.path, target).await?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.persisted {
            trace!(path = %self.path.display(), "Releasing staging file");
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// A `save` call recorded by [`MemoryDownloader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub file_name: String,
    pub source: DownloadSource,
}

/// Downloader that only records what it was asked to save.
#[derive(Debug, Clone, Default)]
pub struct MemoryDownloader {
    saved: Arc<Mutex<Vec<SavedFile>>>,
}

impl MemoryDownloader {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded calls, oldest first.
    pub fn saved(&self) -> Vec<SavedFile> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl FileDownloader for MemoryDownloader {
    async fn save(&self, source: DownloadSource, file_name: &str) -> Result<(), ClientError> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SavedFile {
                file_name: file_name.to_string(),
                source,
            });
        Ok(())
    }
}
