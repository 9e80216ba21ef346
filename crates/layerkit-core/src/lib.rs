//! LayerKit Core Domain Types
//!
//! This crate contains the wire types shared with the image-layering service
//! and has no dependencies on:
//! - Network/HTTP
//! - Filesystem
//! - Runtime specifics

pub mod error;
pub mod files;
pub mod ids;
pub mod layer;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use error::CoreError;
pub use files::{layer_file_name, psd_file_name, validate_file_name};
pub use ids::TaskId;
pub use layer::LayerInfo;
pub use status::TaskStatus;
pub use task::{HealthResponse, Nullable, TaskResponse, UploadResponse};
