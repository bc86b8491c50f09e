//! Where calendar documents come from: HTTP(S) URLs, `file://` URLs or local paths.

use crate::error::ImportError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::path::PathBuf;
use url::Url;

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the raw text of the document at `location`.
    async fn fetch_document_text(&self, location: &str) -> Result<String, ImportError>;
}

/// Resolves a location string to an HTTP request or a file read.
#[derive(Debug, Clone, Default)]
pub struct LocationSource {
    client: Client,
}

impl LocationSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch_http(&self, url: Url) -> Result<String, ImportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ImportError::Fetch(format!("{url}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::Fetch(format!("{url}: HTTP {status}")));
        }
        response.text().await.map_err(|e| ImportError::Fetch(format!("{url}: {e}")))
    }

    async fn read_file(&self, path: PathBuf) -> Result<String, ImportError> {
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ImportError::Fetch(format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl DocumentSource for LocationSource {
    async fn fetch_document_text(&self, location: &str) -> Result<String, ImportError> {
        debug!("Fetching calendar document from {}", location);
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => self.fetch_http(url).await,
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| ImportError::Fetch(format!("not a local file URL: {url}")))?;
                self.read_file(path).await
            }
            // Anything else, including Windows drive letters parsed as schemes, is a path.
            _ => self.read_file(PathBuf::from(location)).await,
        }
    }
}
