//! Chunked blob storage.
//!
//! Objects are written from a byte stream and read back as a byte stream,
//! one chunk at a time, so neither direction holds a whole object in memory.
//! Every object carries a small [`BlobMetadata`] record that listings can
//! filter on.
//!
//! [`FsBlobStore`] keeps each object as a directory of chunk files plus a
//! JSON manifest. Writes land in a staging area and are renamed into place
//! only once the body stream has completed, so a failed or abandoned upload
//! is never visible to readers.

mod error;
mod fs_store;
mod types;

pub use error::{BlobStoreError, BlobStoreResult};
pub use fs_store::FsBlobStore;
pub use types::{BlobId, BlobInfo, BlobListing, BlobMetadata, BlobReader, ByteStream, MetadataField, NewBlob};

use async_trait::async_trait;

/// Storage backend for immutable binary objects.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stream `body` into a new object and return its manifest.
    ///
    /// The object becomes retrievable only if this returns `Ok`.
    async fn put(&self, blob: NewBlob, body: ByteStream<'_>) -> BlobStoreResult<BlobInfo>;

    /// Open an object for streamed reading.
    async fn get(&self, id: &BlobId) -> BlobStoreResult<BlobReader>;

    /// Lazily list objects whose metadata `field` equals `value` exactly.
    /// Order is unspecified.
    async fn list_by_metadata(
        &self,
        field: MetadataField,
        value: &str,
    ) -> BlobStoreResult<BlobListing>;
}
