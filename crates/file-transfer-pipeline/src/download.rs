//! Download pipeline: resolve an identifier and relay its chunk stream.

use crate::error::{TransferError, TransferResult};
use chunked_blob_store::{BlobId, BlobInfo, BlobStore, BlobStoreError, ByteStream};
use futures_util::TryStreamExt;
use tracing::{debug, warn};

/// A resolved object ready to be streamed to the caller.
pub struct Download {
    pub info: BlobInfo,
    pub body: ByteStream<'static>,
}

/// Resolve `raw_id` before any byte is sent.
///
/// Malformed and unknown identifiers both yield [`TransferError::NotFound`].
/// Errors raised by the returned body happen after the transfer started and
/// are only logged here; the caller terminates the response.
pub async fn open_download(store: &dyn BlobStore, raw_id: &str) -> TransferResult<Download> {
    let id: BlobId = raw_id
        .parse()
        .map_err(|_| TransferError::NotFound(raw_id.to_string()))?;

    let reader = store.get(&id).await.map_err(|err| match err {
        BlobStoreError::NotFound(_) | BlobStoreError::InvalidId(_) => {
            TransferError::NotFound(raw_id.to_string())
        }
        other => TransferError::Store(other),
    })?;

    debug!(blob_id = %id, bytes = reader.info.length, "download started");

    let body: ByteStream<'static> = Box::pin(reader.body.inspect_err(move |err| {
        warn!(blob_id = %id, error = %err, "download stream failed");
    }));

    Ok(Download {
        info: reader.info,
        body,
    })
}
