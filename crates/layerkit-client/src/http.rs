//! HTTP transfer client for the layering service.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use layerkit_core::{
    layer_file_name, psd_file_name, HealthResponse, TaskId, TaskResponse, UploadResponse,
};

use crate::config::{ClientConfig, DownloadPolicy};
use crate::downloader::{Blob, DownloadSource, FileDownloader};
use crate::error::ClientError;
use crate::routes::Routes;
use crate::upload::UploadRequest;

/// Client for the upload, status and download endpoints.
///
/// Every call issues a fresh request: nothing is cached and concurrent calls
/// are not coordinated. Cloning is cheap and clones share connection pools.
#[derive(Clone)]
pub struct TransferClient {
    /// Routed calls, bounded by the configured timeout.
    api: reqwest::Client,
    /// Direct fetch for the PSD, no timeout.
    direct: reqwest::Client,
    routes: Routes,
    download_policy: DownloadPolicy,
    downloader: Arc<dyn FileDownloader>,
}

impl TransferClient {
    /// Create a new transfer client.
    pub fn new(
        config: ClientConfig,
        downloader: Arc<dyn FileDownloader>,
    ) -> Result<Self, ClientError> {
        let api = reqwest::Client::builder().timeout(config.timeout).build()?;
        let direct = reqwest::Client::builder().build()?;

        debug!(
            mode = %config.mode,
            api_base = %config.api_base(),
            timeout_ms = config.timeout.as_millis() as u64,
            "Transfer client configured"
        );

        Ok(Self {
            api,
            direct,
            routes: Routes::new(&config),
            download_policy: config.download_policy,
            downloader,
        })
    }

    /// Check if the service is up.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = self.routes.resolve(&self.routes.health_path())?;
        self.get_json(url).await
    }

    /// Upload an image and start a layering task.
    ///
    /// Sends one `POST` with the `file`, `num_layers` and `prompt` fields and
    /// returns the response body as the service sent it.
    pub async fn upload_image(
        &self,
        request: UploadRequest,
    ) -> Result<UploadResponse, ClientError> {
        let url = self.routes.resolve(&self.routes.upload_path())?;
        debug!(
            url = %url,
            file = request.file.file_name(),
            bytes = request.file.len(),
            num_layers = request.num_layers,
            "POST request"
        );

        let form = request.into_form()?;
        let response = self
            .api
            .post(url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let upload: UploadResponse = response.json().await?;
        info!(task_id = %upload.task_id, "Image uploaded");
        Ok(upload)
    }

    /// Fetch a fresh snapshot of a task.
    pub async fn get_task_status(&self, task_id: &TaskId) -> Result<TaskResponse, ClientError> {
        let url = self.routes.resolve(&self.routes.task_path(task_id.as_str()))?;
        self.get_json(url).await
    }

    /// Fetch the composite PSD of a task and hand it to the downloader as
    /// `layered_<task_id>.psd`.
    ///
    /// With [`DownloadPolicy::Passthrough`] the body is saved whatever the
    /// response status was.
    pub async fn download_psd(&self, task_id: &TaskId) -> Result<(), ClientError> {
        let url = self
            .routes
            .resolve(&self.routes.download_path(task_id.as_str()))?;
        debug!(url = %url, "Direct download");

        let response = self.direct.get(url).send().await?;
        let status = response.status();
        let response = match self.download_policy {
            DownloadPolicy::Strict => response.error_for_status()?,
            DownloadPolicy::Passthrough => {
                if !status.is_success() {
                    warn!(
                        task_id = %task_id,
                        status = status.as_u16(),
                        "Download returned an error status, saving body anyway"
                    );
                }
                response
            }
        };

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        let blob = Blob::new(bytes, content_type);
        self.downloader
            .save(DownloadSource::Blob(blob), &psd_file_name(task_id.as_str()))
            .await
    }

    /// Ask the downloader to save one layer image as `<name>.png`.
    ///
    /// The client makes no request; retrieving `url` is up to the downloader.
    pub async fn download_layer_png(&self, url: &str, name: &str) -> Result<(), ClientError> {
        debug!(url = %url, name = %name, "Layer download");
        let source = DownloadSource::Url {
            url: url.to_string(),
            new_context: true,
        };
        self.downloader.save(source, &layer_file_name(name)).await
    }

    /// Get JSON from an endpoint.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        debug!(url = %url, "GET request");

        let response = self.api.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}
