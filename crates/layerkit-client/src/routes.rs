//! Endpoint paths of the layering service.

use reqwest::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Builds the request URLs for a [`ClientConfig`].
///
/// Paths are rendered first (absolute in development, root-relative in
/// production) and resolved against the configured origin only when a
/// request is about to be sent.
#[derive(Debug, Clone)]
pub struct Routes {
    api_base: String,
    download_base: String,
    origin: Option<Url>,
}

impl Routes {
    /// Create the routes for a configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            api_base: config.api_base().trim_end_matches('/').to_string(),
            download_base: config.download_base().trim_end_matches('/').to_string(),
            origin: config.origin.clone(),
        }
    }

    /// `POST` target for image uploads.
    pub fn upload_path(&self) -> String {
        format!("{}/upload", self.api_base)
    }

    /// `GET` target for a task snapshot.
    pub fn task_path(&self, task_id: &str) -> String {
        format!("{}/task/{}", self.api_base, task_id)
    }

    /// Direct-fetch target for the composite PSD.
    pub fn download_path(&self, task_id: &str) -> String {
        format!("{}/api/download/{}", self.download_base, task_id)
    }

    /// `GET` target for the health check.
    pub fn health_path(&self) -> String {
        format!("{}/health", self.api_base)
    }

    /// Turn a rendered path into a request URL.
    pub fn resolve(&self, path: &str) -> Result<Url, ClientError> {
        resolve_against(self.origin.as_ref(), path)
    }
}

/// Parse `path` as an absolute URL, or join it onto `origin` when relative.
pub(crate) fn resolve_against(origin: Option<&Url>, path: &str) -> Result<Url, ClientError> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Url::parse(path)
            .map_err(|e| ClientError::Config(format!("invalid URL '{}': {}", path, e)));
    }

    let origin = origin.ok_or_else(|| {
        ClientError::Config(format!("relative route '{}' needs an origin", path))
    })?;

    origin
        .join(path)
        .map_err(|e| ClientError::Config(format!("cannot resolve '{}': {}", path, e)))
}
