//! Upload payload and multipart form.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::error::ClientError;

/// Layer count requested when the caller does not pick one.
pub const DEFAULT_NUM_LAYERS: u32 = 4;

/// Binary file payload sent as the `file` form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    file_name: String,
    bytes: Vec<u8>,
    content_type: Option<String>,
}

impl UploadFile {
    /// Create an upload from in-memory bytes.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            content_type: None,
        }
    }

    /// Read a file from disk, guessing the content type from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.png".to_string());

        Ok(Self::new(file_name, bytes).with_content_type(content_type_for(path)))
    }

    /// Builder method to set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Name the file is uploaded under.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn into_part(self) -> Result<Part, ClientError> {
        let part = Part::bytes(self.bytes).file_name(self.file_name);
        match self.content_type {
            Some(content_type) => Ok(part.mime_str(&content_type)?),
            None => Ok(part),
        }
    }
}

/// Content type of an image file judged by its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Arguments of an upload: the file, the layer count and the prompt.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Image to split.
    pub file: UploadFile,

    /// Desired number of layers. Sent as-is, no bounds are enforced.
    pub num_layers: u32,

    /// Free-text hint for the layering model.
    pub prompt: String,
}

impl UploadRequest {
    /// Create a request with [`DEFAULT_NUM_LAYERS`] and an empty prompt.
    pub fn new(file: UploadFile) -> Self {
        Self {
            file,
            num_layers: DEFAULT_NUM_LAYERS,
            prompt: String::new(),
        }
    }

    /// Builder method to set the layer count.
    pub fn with_num_layers(mut self, num_layers: u32) -> Self {
        self.num_layers = num_layers;
        self
    }

    /// Builder method to set the prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Multipart body with the `file`, `num_layers` and `prompt` fields.
    pub fn into_form(self) -> Result<Form, ClientError> {
        Ok(Form::new()
            .part("file", self.file.into_part()?)
            .text("num_layers", self.num_layers.to_string())
            .text("prompt", self.prompt))
    }
}
