//! Human and JSON output for CLI commands.

use serde::Serialize;

use layerkit_core::{HealthResponse, TaskResponse, UploadResponse};

/// JSON event types emitted by `run`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonEventType {
    Uploaded,
    Status,
    Saved,
}

/// One line of `run --json` output.
#[derive(Debug, Clone, Serialize)]
pub struct JsonEvent {
    pub event: JsonEventType,
    pub timestamp: String,
    pub data: serde_json::Value,
}

impl JsonEvent {
    /// Create a new JSON event with the current timestamp.
    pub fn new<T: Serialize>(event: JsonEventType, data: &T) -> serde_json::Result<Self> {
        Ok(Self {
            event,
            timestamp: chrono::Utc::now().to_rfc3339(),
            data: serde_json::to_value(data)?,
        })
    }

    /// Output this event as a JSON line to stdout.
    pub fn emit(&self) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string(self)?);
        Ok(())
    }
}

/// Pretty-print a response body.
pub fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_upload(upload: &UploadResponse) {
    println!("Task created:");
    println!("  ID:         {}", upload.task_id);
    if let Some(status) = upload.status() {
        println!("  Status:     {}", status);
    }
}

pub fn print_task(task_id: &str, task: &TaskResponse) {
    println!("  ID:         {}", task_id);
    println!("  Status:     {}", task.status);

    if let Some(message) = task.message().filter(|m| !m.is_empty()) {
        println!("  Message:    {}", message);
    }
    if let Some(error) = task.failure() {
        println!("  Error:      {}", error);
    }
    if let Some((width, height)) = task.canvas_size() {
        println!("  Canvas:     {}x{}", width, height);
    }

    let layers = task.layers();
    if !layers.is_empty() {
        println!("  Layers ({}):", layers.len());
        println!("    {:<16}  {:>11}  {}", "NAME", "SIZE", "URL");
        for layer in layers {
            let size = format!("{}x{}", layer.width, layer.height);
            println!("    {:<16}  {:>11}  {}", layer.name, size, layer.url);
        }
    }
}

pub fn print_health(health: &HealthResponse) {
    let verdict = if health.is_ok() { "healthy" } else { "unhealthy" };
    println!("Service {} (status: {})", verdict, health.status);
}
