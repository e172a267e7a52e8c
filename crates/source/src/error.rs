//! Error types for source operations.

use thiserror::Error;

/// Errors from the pricing data source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("source returned HTTP {0}")]
    Status(u16),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

impl SourceError {
    /// Returns true if this error is transient and the next poll cycle
    /// is likely to succeed without intervention.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Http(_) => true,
            SourceError::Status(code) => *code >= 500 || *code == 429,
            SourceError::Parse(_) | SourceError::Url(_) => false,
        }
    }
}
