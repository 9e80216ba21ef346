//! File naming rules for downloaded artifacts.

use crate::error::CoreError;

/// Name of the composite document for a task: `layered_<task_id>.psd`.
pub fn psd_file_name(task_id: &str) -> String {
    format!("layered_{}.psd", task_id)
}

/// Name of a single layer image: `<name>.png`.
pub fn layer_file_name(name: &str) -> String {
    format!("{}.png", name)
}

/// Check that a file name can be written inside a target directory.
///
/// Rejects empty names, path separators and the special `.` / `..` entries.
pub fn validate_file_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::EmptyFileName);
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(CoreError::InvalidFileName(name.to_string()));
    }
    Ok(())
}
