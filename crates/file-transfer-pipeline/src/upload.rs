//! Upload pipeline: limit, name, and stream a payload into the blob store.

use crate::category::sanitize_category;
use crate::error::{TransferError, TransferResult};
use crate::links::RetrievalLinks;
use crate::storage_name::generate_storage_name;
use chunked_blob_store::{BlobMetadata, BlobStore, BlobStoreError, ByteStream, NewBlob};
use futures_util::StreamExt;
use serde::Serialize;
use std::fmt;
use std::io;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    /// Largest accepted payload in bytes, inclusive.
    pub max_bytes: u64,
}

/// File part of an upload request.
pub struct IncomingFile<'a> {
    pub original_name: String,
    pub content_type: Option<String>,
    pub body: ByteStream<'a>,
}

pub struct UploadRequest<'a> {
    pub file: Option<IncomingFile<'a>>,
    pub category: Option<String>,
}

/// Response returned once the object is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    pub id: String,
    pub name: String,
    pub category: String,
    pub url: String,
}

/// Stream an upload into `store`.
///
/// Fails with [`TransferError::PayloadTooLarge`] as soon as the streamed
/// byte count passes `limits.max_bytes`; the store discards the partial
/// object in that case.
pub async fn upload(
    store: &dyn BlobStore,
    links: &RetrievalLinks,
    limits: UploadLimits,
    request: UploadRequest<'_>,
) -> TransferResult<UploadReceipt> {
    let file = request.file.ok_or(TransferError::MissingFile)?;
    let category = sanitize_category(request.category.as_deref().unwrap_or_default());
    let storage_name = generate_storage_name(&file.original_name);

    let blob = NewBlob {
        filename: storage_name,
        content_type: file.content_type,
        metadata: BlobMetadata {
            category: category.clone(),
            original_name: file.original_name.clone(),
        },
    };

    let body = enforce_limit(file.body, limits.max_bytes);
    let info = store.put(blob, body).await.map_err(|err| match err {
        BlobStoreError::Aborted(cause) if is_limit_exceeded(&cause) => {
            warn!(limit = limits.max_bytes, "upload rejected: payload too large");
            TransferError::PayloadTooLarge {
                limit: limits.max_bytes,
            }
        }
        BlobStoreError::Aborted(cause) => TransferError::Interrupted(cause),
        other => TransferError::Store(other),
    })?;

    info!(
        blob_id = %info.id,
        category = %category,
        bytes = info.length,
        "upload stored"
    );

    Ok(UploadReceipt {
        id: info.id.to_string(),
        name: file.original_name,
        category,
        url: links.file_url(&info.id),
    })
}

#[derive(Debug)]
struct LimitExceeded {
    limit: u64,
}

impl fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "payload exceeds {} bytes", self.limit)
    }
}

impl std::error::Error for LimitExceeded {}

fn enforce_limit(body: ByteStream<'_>, limit: u64) -> ByteStream<'_> {
    let mut seen: u64 = 0;
    body.map(move |piece| {
        let piece = piece?;
        seen += piece.len() as u64;
        if seen > limit {
            Err(io::Error::other(LimitExceeded { limit }))
        } else {
            Ok(piece)
        }
    })
    .boxed()
}

fn is_limit_exceeded(err: &io::Error) -> bool {
    err.get_ref()
        .is_some_and(|inner| inner.is::<LimitExceeded>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures_util::{stream, TryStreamExt};

    #[tokio::test]
    async fn limit_allows_exact_size_and_rejects_one_more() {
        let pieces = || {
            stream::iter(vec![
                Ok::<_, io::Error>(Bytes::from_static(b"abc")),
                Ok(Bytes::from_static(b"de")),
            ])
            .boxed()
        };

        let within: Vec<Bytes> = enforce_limit(pieces(), 5).try_collect().await.unwrap();
        assert_eq!(within.concat(), b"abcde");

        let err = enforce_limit(pieces(), 4)
            .try_collect::<Vec<Bytes>>()
            .await
            .unwrap_err();
        assert!(is_limit_exceeded(&err));
    }

    #[test]
    fn unrelated_io_errors_are_not_limit_errors() {
        let err = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        assert!(!is_limit_exceeded(&err));
    }
}
