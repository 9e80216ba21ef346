//! Layer descriptors returned for a completed task.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::files::layer_file_name;

/// One decomposed layer of a processed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Layer name (e.g., "Layer_0").
    pub name: String,

    /// Where the layer PNG can be retrieved from.
    pub url: String,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,

    /// Per-layer fields beyond the documented four (offsets, opacity, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LayerInfo {
    /// Create a new LayerInfo.
    pub fn new(name: impl Into<String>, url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            width,
            height,
            extra: Map::new(),
        }
    }

    /// File name this layer is saved under.
    pub fn png_file_name(&self) -> String {
        layer_file_name(&self.name)
    }
}
