use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutobufferError {
    #[error("Failed to connect to {url}: {source}")]
    ConnectionError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {0}")]
    HttpError(reqwest::StatusCode),

    #[error("Missing or invalid Content-Length header")]
    MissingContentLength,

    #[error("Failed to create output file {}: {source}", path.display())]
    FileCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Network read error: {0}")]
    NetworkReadError(#[source] std::io::Error),

    #[error("Failed to write output: {0}")]
    FileWriteError(#[source] std::io::Error),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

pub type AutobufferResult<T> = Result<T, AutobufferError>;
