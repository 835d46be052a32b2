//! Upload and download pipelines for coffer.
//!
//! Both directions are plain streams of byte chunks: uploads are piped from
//! the request body into [`BlobStore::put`], downloads hand the store's
//! chunk stream straight back to the caller.

mod category;
mod download;
mod error;
mod links;
mod listing;
mod storage_name;
mod upload;

pub use category::{list_categories, sanitize_category, CATEGORIES, DEFAULT_CATEGORY};
pub use download::{open_download, Download};
pub use error::{TransferError, TransferResult};
pub use links::RetrievalLinks;
pub use listing::{list_files_in_category, FileEntry};
pub use storage_name::generate_storage_name;
pub use upload::{upload, IncomingFile, UploadLimits, UploadReceipt, UploadRequest};

pub use chunked_blob_store::{BlobStore, ByteStream};
