//! Filesystem-backed chunked blob store.
//!
//! Layout under the store root:
//!
//! ```text
//! objects/<id>/manifest.json
//! objects/<id>/00000000.chunk
//! objects/<id>/00000001.chunk
//! staging/<id>/...            (in-progress uploads)
//! ```
//!
//! An upload is assembled in `staging/<id>` and renamed into `objects/`
//! after its manifest is synced. Only directories under `objects/` are
//! ever read or listed.

use crate::error::{BlobStoreError, BlobStoreResult};
use crate::types::{BlobId, BlobInfo, BlobListing, BlobReader, ByteStream, MetadataField, NewBlob};
use crate::BlobStore;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{stream, StreamExt};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

const OBJECTS_DIR: &str = "objects";
const STAGING_DIR: &str = "staging";
const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    chunk_size: usize,
}

impl FsBlobStore {
    /// Open (or create) a store rooted at `root`.
    ///
    /// Leftover staging directories from a previous process are removed.
    pub async fn open(root: impl Into<PathBuf>, chunk_size: usize) -> BlobStoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(OBJECTS_DIR)).await?;

        let staging = root.join(STAGING_DIR);
        if fs::try_exists(&staging).await? {
            fs::remove_dir_all(&staging).await?;
        }
        fs::create_dir_all(&staging).await?;

        info!(root = %root.display(), chunk_size, "blob store opened");
        Ok(Self {
            root,
            chunk_size: chunk_size.max(1),
        })
    }

    fn object_dir(&self, id: &BlobId) -> PathBuf {
        self.root.join(OBJECTS_DIR).join(id.to_string())
    }

    fn staging_dir(&self, id: &BlobId) -> PathBuf {
        self.root.join(STAGING_DIR).join(id.to_string())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, blob: NewBlob, mut body: ByteStream<'_>) -> BlobStoreResult<BlobInfo> {
        let id = BlobId::generate();
        let staging_path = self.staging_dir(&id);
        fs::create_dir(&staging_path).await?;
        let guard = StagingGuard::new(staging_path.clone());

        let mut buffer = BytesMut::with_capacity(self.chunk_size);
        let mut length: u64 = 0;
        let mut chunk_count: u64 = 0;

        while let Some(piece) = body.next().await {
            let piece = piece.map_err(BlobStoreError::Aborted)?;
            length += piece.len() as u64;
            buffer.extend_from_slice(&piece);

            while buffer.len() >= self.chunk_size {
                let chunk = buffer.split_to(self.chunk_size).freeze();
                write_chunk(&staging_path, chunk_count, &chunk).await?;
                chunk_count += 1;
            }
        }
        if !buffer.is_empty() {
            write_chunk(&staging_path, chunk_count, &buffer.freeze()).await?;
            chunk_count += 1;
        }

        let info = BlobInfo {
            id,
            filename: blob.filename,
            length,
            chunk_size: self.chunk_size,
            chunk_count,
            content_type: blob.content_type,
            uploaded_at: chrono::Utc::now(),
            metadata: blob.metadata,
        };
        write_manifest(&staging_path, &info).await?;

        fs::rename(&staging_path, self.object_dir(&id)).await?;
        guard.disarm();
        sync_dir(&self.root.join(OBJECTS_DIR)).await;

        debug!(blob_id = %id, length, chunk_count, "blob committed");
        Ok(info)
    }

    async fn get(&self, id: &BlobId) -> BlobStoreResult<BlobReader> {
        let dir = self.object_dir(id);
        let info = read_manifest(&dir).await.map_err(|err| match err {
            BlobStoreError::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {
                BlobStoreError::NotFound(id.to_string())
            }
            other => other,
        })?;

        let body = chunk_stream(dir, info.chunk_count);
        Ok(BlobReader { info, body })
    }

    async fn list_by_metadata(
        &self,
        field: MetadataField,
        value: &str,
    ) -> BlobStoreResult<BlobListing> {
        let entries = fs::read_dir(self.root.join(OBJECTS_DIR)).await?;
        let value = value.to_string();

        let listing = stream::try_unfold(entries, move |mut entries| {
            let value = value.clone();
            async move {
                while let Some(entry) = entries.next_entry().await? {
                    let is_object = entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| name.parse::<BlobId>().is_ok());
                    if !is_object {
                        continue;
                    }

                    let info = match read_manifest(&entry.path()).await {
                        Ok(info) => info,
                        Err(BlobStoreError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                            continue
                        }
                        Err(err) => return Err(err),
                    };
                    if field.value_of(&info.metadata) == value {
                        return Ok::<_, BlobStoreError>(Some((info, entries)));
                    }
                }
                Ok(None)
            }
        })
        .boxed();

        Ok(listing)
    }
}

/// Removes an uncommitted staging directory when dropped.
///
/// Covers both error returns and cancellation of the `put` future.
struct StagingGuard {
    path: PathBuf,
    armed: bool,
}

impl StagingGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "discarded partial upload"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(
                path = %self.path.display(),
                error = %err,
                "failed to discard partial upload"
            ),
        }
    }
}

fn chunk_file_name(index: u64) -> String {
    format!("{:08}.chunk", index)
}

async fn write_chunk(dir: &Path, index: u64, chunk: &[u8]) -> BlobStoreResult<()> {
    let mut file = fs::File::create(dir.join(chunk_file_name(index))).await?;
    file.write_all(chunk).await?;
    file.flush().await?;
    Ok(())
}

async fn write_manifest(dir: &Path, info: &BlobInfo) -> BlobStoreResult<()> {
    let json = serde_json::to_vec_pretty(info)?;
    let mut file = fs::File::create(dir.join(MANIFEST_FILE)).await?;
    file.write_all(&json).await?;
    file.sync_all().await?;
    Ok(())
}

async fn read_manifest(dir: &Path) -> BlobStoreResult<BlobInfo> {
    let raw = fs::read(dir.join(MANIFEST_FILE)).await?;
    Ok(serde_json::from_slice(&raw)?)
}

async fn sync_dir(dir: &Path) {
    if let Ok(handle) = fs::File::open(dir).await {
        let _ = handle.sync_all().await;
    }
}

/// Stream an object's chunks in order, reading one chunk file at a time.
fn chunk_stream(dir: PathBuf, chunk_count: u64) -> ByteStream<'static> {
    stream::try_unfold(0u64, move |index| {
        let path = dir.join(chunk_file_name(index));
        async move {
            if index >= chunk_count {
                return Ok::<_, io::Error>(None);
            }
            let chunk = fs::read(&path).await?;
            Ok(Some((Bytes::from(chunk), index + 1)))
        }
    })
    .boxed()
}
