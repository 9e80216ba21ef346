//! Status of a layering task as reported by the service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a Task on the layering service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task accepted but not yet picked up.
    #[default]
    Pending,
    /// Image is being split into layers.
    Processing,
    /// Layers are available.
    Completed,
    /// Task failed; the response carries an error message.
    Failed,
}

impl TaskStatus {
    /// Returns true if the task will not change state anymore.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
