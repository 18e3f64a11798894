pub mod loader;
pub mod scan;

use serde::Serialize;

pub use loader::{ChartLoader, LoadError};
pub use scan::find_images;

/// A parsed YAML document. No schema is enforced.
pub type Document = serde_yaml::Value;

/// A container image reference discovered in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerImage {
    /// Image reference, either `repository:tag` or the raw string from the document
    pub name: String,

    /// Value of the sibling `name` field, if the image was declared as a string
    #[serde(skip_serializing_if = "String::is_empty")]
    pub container: String,

    /// Human-readable size, filled in by the registry lookup
    #[serde(skip_serializing_if = "String::is_empty")]
    pub size: String,

    /// Number of layers (always 0 until layer counting exists)
    pub layers: u32,
}

impl ContainerImage {
    pub fn new(name: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            container: container.into(),
            ..Default::default()
        }
    }
}
