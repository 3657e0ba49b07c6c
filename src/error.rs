// ⚠️ Error taxonomy for the ingestion pipeline
//
// Transport failures are item- or page-scoped. Page failures end a
// pipeline's pagination. Storage failures abort the current commit.
// Reference resolution failures and normalization drops never surface here.

use thiserror::Error;

/// Failure talking to an external source (network, timeout, status, body).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} could not be decoded: {reason}")]
    Decode { url: String, reason: String },
}

impl TransportError {
    /// URL the failed request targeted
    pub fn url(&self) -> &str {
        match self {
            TransportError::Network { url, .. }
            | TransportError::Status { url, .. }
            | TransportError::Decode { url, .. } => url,
        }
    }
}

/// Error that ends one pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("listing page {url} could not be fetched: {source}")]
    PageFetch {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    #[error("failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn page_fetch(source: TransportError) -> Self {
        PipelineError::PageFetch {
            url: source.url().to_string(),
            source,
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
