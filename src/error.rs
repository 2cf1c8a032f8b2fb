use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DigestError>;

#[derive(Debug, Error)]
pub enum DigestError {
    /// Missing or malformed configuration. Fatal, raised before any network call.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("discord request failed: {0}")]
    Discord(#[from] serenity::Error),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected {service} response: {detail}")]
    MalformedResponse {
        service: &'static str,
        detail: String,
    },

    /// Summarization succeeded but at least one distributor failed.
    #[error("delivery failed via {0}")]
    Delivery(String),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl DigestError {
    pub fn is_config(&self) -> bool {
        matches!(self, DigestError::Config(_))
    }
}
