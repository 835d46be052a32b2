use chunked_blob_store::BlobStoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    /// The upload carried no file payload.
    #[error("no file uploaded")]
    MissingFile,

    /// The payload exceeded the configured limit; nothing was stored.
    #[error("file exceeds the {limit} byte upload limit")]
    PayloadTooLarge { limit: u64 },

    /// Unknown or malformed object identifier.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The client's body stream failed before the upload completed.
    #[error("upload interrupted: {0}")]
    Interrupted(#[source] std::io::Error),

    /// The blob store failed.
    #[error("storage error: {0}")]
    Store(#[from] BlobStoreError),
}

pub type TransferResult<T> = Result<T, TransferError>;
