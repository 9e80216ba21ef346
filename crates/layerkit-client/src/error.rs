//! Error types for the transfer client.

use layerkit_core::CoreError;
use thiserror::Error;

/// Errors that can occur when using the transfer client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure, non-success status, or undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A route could not be turned into a request URL.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem error while saving a download.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The downloader refused a file.
    #[error("download failed: {0}")]
    Download(#[from] CoreError),
}

impl ClientError {
    /// HTTP status of the failed response, if the server answered.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Returns true if the request hit the client timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}
