//! Core domain errors.

use thiserror::Error;

/// Core domain errors for LayerKit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A download file name was empty.
    #[error("File name is empty")]
    EmptyFileName,

    /// A download file name would escape the target directory.
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),
}
