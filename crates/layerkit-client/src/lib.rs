//! Transfer client for the LayerKit image-layering service.
//!
//! Uploads an image, reads task snapshots, and saves the resulting PSD and
//! layer PNGs through a [`FileDownloader`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use layerkit_client::{ClientConfig, DirectoryDownloader, TransferClient, UploadFile, UploadRequest};
//!
//! async fn split() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = Arc::new(DirectoryDownloader::new("./out"));
//!     let client = TransferClient::new(ClientConfig::development(), downloader)?;
//!
//!     let file = UploadFile::from_path("poster.png").await?;
//!     let upload = client
//!         .upload_image(UploadRequest::new(file).with_num_layers(6))
//!         .await?;
//!
//!     let task = client.get_task_status(&upload.task_id).await?;
//!     if task.is_terminal() {
//!         client.download_psd(&upload.task_id).await?;
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod downloader;
mod error;
mod http;
mod routes;
mod upload;

pub use config::{BuildMode, ClientConfig, DownloadPolicy, DEFAULT_TIMEOUT, DEV_ORIGIN};
pub use downloader::{
    Blob, DirectoryDownloader, DownloadSource, FileDownloader, MemoryDownloader, SavedFile,
};
pub use error::ClientError;
pub use http::TransferClient;
pub use routes::Routes;
pub use upload::{UploadFile, UploadRequest, DEFAULT_NUM_LAYERS};

pub use layerkit_core::{
    HealthResponse, LayerInfo, Nullable, TaskId, TaskResponse, TaskStatus, UploadResponse,
};
pub use reqwest::Url;
