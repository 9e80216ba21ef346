//! Response bodies of the layering service.
//!
//! Fields the service adds beyond the documented ones are kept in `extra`, and
//! optional fields remember whether they were absent or an explicit `null`, so
//! a response re-serializes to the JSON object it was parsed from.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{LayerInfo, TaskId, TaskStatus};

/// Optional field that may also be present as `null`.
///
/// `None` means the key was absent, `Some(None)` means it was sent as `null`.
pub type Nullable<T> = Option<Option<T>>;

fn nullable<'de, T, D>(deserializer: D) -> Result<Nullable<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body returned by `POST /upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Handle for the status and download calls.
    pub task_id: TaskId,

    /// Initial task status, when the service reports one.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Nullable<TaskStatus>,

    /// Any other fields of the body.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UploadResponse {
    /// Initial task status, if the service sent a non-null one.
    pub fn status(&self) -> Option<TaskStatus> {
        self.status.flatten()
    }
}

/// Snapshot of a task returned by `GET /task/{task_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Current task status.
    pub status: TaskStatus,

    /// Human-readable progress message.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Nullable<String>,

    /// Layers, meaningful only when the task is completed.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub layers: Nullable<Vec<LayerInfo>>,

    /// Error message, meaningful only when the task failed.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Nullable<String>,

    /// Any other fields of the body.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskResponse {
    /// Create a TaskResponse with only a status.
    pub fn new(status: TaskStatus) -> Self {
        Self {
            status,
            message: None,
            layers: None,
            error: None,
            extra: Map::new(),
        }
    }

    /// Builder method to attach layers.
    pub fn with_layers(mut self, layers: Vec<LayerInfo>) -> Self {
        self.layers = Some(Some(layers));
        self
    }

    /// Builder method to attach an error message.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(Some(error.into()));
        self
    }

    /// Check if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Progress message, if the service sent a non-null one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().and_then(Option::as_deref)
    }

    /// Layers of the task, empty unless the service sent some.
    pub fn layers(&self) -> &[LayerInfo] {
        self.layers
            .as_ref()
            .and_then(Option::as_deref)
            .unwrap_or_default()
    }

    /// Error message if the task failed and the service gave a non-empty one.
    pub fn failure(&self) -> Option<&str> {
        match self.status {
            TaskStatus::Failed => self
                .error
                .as_ref()
                .and_then(Option::as_deref)
                .filter(|e| !e.is_empty()),
            _ => None,
        }
    }

    /// Size of the composite document: the largest width and height among
    /// all layers.
    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        let layers = self.layers();
        if layers.is_empty() {
            return None;
        }
        let width = layers.iter().map(|l| l.width).max().unwrap_or(0);
        let height = layers.iter().map(|l| l.height).max().unwrap_or(0);
        Some((width, height))
    }
}

/// Body returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" when the service is up.
    pub status: String,
}

impl HealthResponse {
    /// Returns true if the service reported itself healthy.
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
