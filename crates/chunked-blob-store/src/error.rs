//! Blob store error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobStoreError {
    /// No committed object has this identifier.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// The identifier is not a well-formed blob id.
    #[error("invalid blob id: {0}")]
    InvalidId(String),

    /// The caller's body stream failed; the partial write was discarded.
    #[error("upload aborted: {0}")]
    Aborted(#[source] std::io::Error),

    /// Storage-side IO failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest could not be encoded or decoded.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

pub type BlobStoreResult<T> = Result<T, BlobStoreError>;
