//! Shared request state.

use access_approval_registry::AccessApproval;
use chunked_blob_store::BlobStore;
use file_transfer_pipeline::{RetrievalLinks, UploadLimits};
use std::sync::Arc;

/// State handed to every handler (cheap to clone).
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlobStore>,
    pub links: Arc<RetrievalLinks>,
    pub limits: UploadLimits,
    /// Approval registry and operator notification.
    pub approvals: Arc<AccessApproval>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn BlobStore>,
        links: RetrievalLinks,
        limits: UploadLimits,
        approvals: Arc<AccessApproval>,
    ) -> Self {
        Self {
            store,
            links: Arc::new(links),
            limits,
            approvals,
        }
    }
}
