use crate::error::{BlobStoreError, BlobStoreResult};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use parking_lot::Mutex;
use std::str::FromStr;
use std::sync::OnceLock;
use ulid::{Generator, Ulid};

/// Lazy sequence of byte chunks terminated by completion or an error.
pub type ByteStream<'a> = BoxStream<'a, io::Result<Bytes>>;

/// Lazy, finite sequence of listing matches.
pub type BlobListing = BoxStream<'static, BlobStoreResult<BlobInfo>>;

/// Store-generated object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(Ulid);

/// Shared by every store in the process so ids sort in creation order,
/// including ids minted within the same millisecond.
static ID_GENERATOR: OnceLock<Mutex<Generator>> = OnceLock::new();

impl BlobId {
    pub(crate) fn generate() -> Self {
        let mut generator = ID_GENERATOR
            .get_or_init(|| Mutex::new(Generator::new()))
            .lock();
        // Overflow needs 2^80 ids in one millisecond
        Self(generator.generate().unwrap_or_else(|_| Ulid::new()))
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for BlobId {
    type Err = BlobStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|_| BlobStoreError::InvalidId(s.to_string()))
    }
}

/// Metadata attached to every object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    pub category: String,
    pub original_name: String,
}

/// Metadata keys a listing can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Category,
    OriginalName,
}

impl MetadataField {
    pub fn value_of<'a>(&self, metadata: &'a BlobMetadata) -> &'a str {
        match self {
            Self::Category => &metadata.category,
            Self::OriginalName => &metadata.original_name,
        }
    }
}

/// Description of an object about to be written.
#[derive(Debug, Clone)]
pub struct NewBlob {
    /// Storage name recorded in the manifest.
    pub filename: String,
    pub content_type: Option<String>,
    pub metadata: BlobMetadata,
}

/// Manifest of a committed object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobInfo {
    pub id: BlobId,
    pub filename: String,
    pub length: u64,
    pub chunk_size: usize,
    pub chunk_count: u64,
    pub content_type: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub metadata: BlobMetadata,
}

/// An object opened for reading.
pub struct BlobReader {
    pub info: BlobInfo,
    pub body: ByteStream<'static>,
}

impl fmt::Debug for BlobReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobReader")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}
