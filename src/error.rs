//! Error types for the Dossier pipeline.

use thiserror::Error;

/// Errors that can occur during a pipeline run.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error (completion, search, or page fetch)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote API rejected the request
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Search provider returned an unusable response
    #[error("Search error: {0}")]
    Search(String),

    /// Deserialization error when decoding model output into typed data
    #[error("Decode error: {0}")]
    Decode(String),

    /// Run was cancelled between stage boundaries
    #[error("run cancelled")]
    Cancelled,

    /// Filesystem error while exporting the report
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Dossier operations.
pub type Result<T> = std::result::Result<T, Error>;
