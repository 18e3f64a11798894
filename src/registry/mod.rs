pub mod dockerhub;
pub mod reference;

use async_trait::async_trait;
use thiserror::Error;

pub use dockerhub::DockerHub;
pub use reference::RepositoryRef;

/// Size metadata for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    /// Formatted with [`format_size`]
    pub size: String,
    pub layers: u32,
}

/// Messages say which stage failed: fetching the tag metadata or reading a size from it.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to get DockerHub response: error requesting Docker Hub: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to get DockerHub response: error getting image information: {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to get DockerHub response: error reading response: {0}")]
    Body(#[source] reqwest::Error),

    #[error("failed to get image size: error parsing JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("failed to get image size: invalid response: full_size field is missing or zero")]
    MissingSize,
}

/// Looks up size metadata for image references.
#[async_trait]
pub trait ImageRegistry: Send + Sync {
    async fn image_info(&self, image: &str) -> Result<ImageInfo, RegistryError>;
}

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Base-1024 size with two decimals for anything above bytes.
pub fn format_size(bytes: u64) -> String {
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_thresholds() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_size(104_857_600), "100.00 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.00 GB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024 * 1024), "5120.00 GB");
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            RegistryError::Status(reqwest::StatusCode::NOT_FOUND).to_string(),
            "failed to get DockerHub response: error getting image information: 404 Not Found"
        );
        assert_eq!(
            RegistryError::MissingSize.to_string(),
            "failed to get image size: invalid response: full_size field is missing or zero"
        );

        let json_err = serde_json::from_slice::<serde_json::Value>(b"not json").unwrap_err();
        assert!(
            RegistryError::from(json_err)
                .to_string()
                .starts_with("failed to get image size: error parsing JSON:")
        );
    }
}
