use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{ImageInfo, ImageRegistry, RegistryError, RepositoryRef, format_size};

pub const DEFAULT_BASE_URL: &str = "https://hub.docker.com";

/// Tag metadata as returned by `GET /v2/repositories/<repo>/tags/<tag>`.
/// Only the fields we read are declared.
#[derive(Deserialize)]
struct TagResponse {
    #[serde(default)]
    full_size: Option<u64>,
}

/// Docker Hub's repository API.
#[derive(Debug, Clone)]
pub struct DockerHub {
    client: reqwest::Client,
    base_url: String,
}

impl DockerHub {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn tag_url(&self, image: &str) -> String {
        format!("{}{}", self.base_url, RepositoryRef::parse(image).tag_path())
    }

    /// Fetch the raw tag metadata body for an image.
    pub async fn tag_metadata(&self, image: &str) -> Result<Vec<u8>, RegistryError> {
        let url = self.tag_url(image);
        debug!(image, %url, "querying registry");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(RegistryError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status(status));
        }

        let body = response.bytes().await.map_err(RegistryError::Body)?;
        Ok(body.to_vec())
    }

    /// Extract `full_size` in bytes. Missing, null, and zero are all rejected.
    pub fn image_size(body: &[u8]) -> Result<u64, RegistryError> {
        let tag: TagResponse = serde_json::from_slice(body)?;
        match tag.full_size {
            Some(size) if size > 0 => Ok(size),
            _ => Err(RegistryError::MissingSize),
        }
    }

    /// Layer count for an image.
    // TODO: resolve the manifest digest from the tag metadata and count layers
    // in the registry manifest (v2 schema 1, v2 schema 2 and OCI formats).
    pub fn image_layers(_body: &[u8]) -> Result<u32, RegistryError> {
        Ok(0)
    }
}

#[async_trait]
impl ImageRegistry for DockerHub {
    async fn image_info(&self, image: &str) -> Result<ImageInfo, RegistryError> {
        let body = self.tag_metadata(image).await?;
        let size = Self::image_size(&body)?;
        let layers = Self::image_layers(&body)?;

        debug!(image, size, "resolved image size");
        Ok(ImageInfo {
            size: format_size(size),
            layers,
        })
    }
}
