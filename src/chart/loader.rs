use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::Document;

/// Failure to turn a URL into a parsed document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch YAML document: {0}")]
    Fetch(#[source] reqwest::Error),

    /// Only produced when strict fetching is enabled.
    #[error("failed to fetch YAML document: server returned {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to read YAML content: {0}")]
    Read(#[source] reqwest::Error),

    #[error("invalid YAML format: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Fetches YAML documents over HTTP.
#[derive(Debug, Clone)]
pub struct ChartLoader {
    client: reqwest::Client,
    strict: bool,
}

impl ChartLoader {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            strict: false,
        }
    }

    /// Treat non-2xx responses as fetch failures instead of parsing their body.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub async fn load(&self, url: &str) -> Result<Document, LoadError> {
        let response = self.client.get(url).send().await.map_err(LoadError::Fetch)?;

        let status = response.status();
        if !status.is_success() {
            if self.strict {
                return Err(LoadError::Status(status));
            }
            warn!(url, %status, "document host returned non-success status, parsing body anyway");
        }

        let body = response.bytes().await.map_err(LoadError::Read)?;
        debug!(url, bytes = body.len(), "fetched document");

        parse_document(&body)
    }
}

/// Parse the first YAML document in `bytes`, with merge keys (`<<`) applied.
/// Later documents in a `---` stream are ignored. Empty input is `null`.
pub fn parse_document(bytes: &[u8]) -> Result<Document, LoadError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::Null);
    }
    let Some(first) = serde_yaml::Deserializer::from_slice(bytes).next() else {
        return Ok(Document::Null);
    };

    let mut document = Document::deserialize(first)?;
    document.apply_merge()?;
    Ok(document)
}
