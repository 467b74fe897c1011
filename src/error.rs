use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tinify API error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("No API keys configured. Pass --api-key or set COMPRESS_IMAGE_API_KEYS (comma separated)")]
    NoCredentials,

    #[error("API key {0} was rejected: {1}")]
    CredentialRejected(String, String),

    #[error("Not a directory: {0}")]
    InvalidDirectory(PathBuf),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Failed to start async runtime: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, CompressionError>;
