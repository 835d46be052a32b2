use crate::category::sanitize_category;
use crate::error::TransferResult;
use crate::links::RetrievalLinks;
use chunked_blob_store::{BlobInfo, BlobStore, MetadataField};
use futures_util::TryStreamExt;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// Files stored under `category`, newest first.
pub async fn list_files_in_category(
    store: &dyn BlobStore,
    links: &RetrievalLinks,
    category: &str,
) -> TransferResult<Vec<FileEntry>> {
    let category = sanitize_category(category);
    let mut matches: Vec<BlobInfo> = store
        .list_by_metadata(MetadataField::Category, &category)
        .await?
        .try_collect()
        .await?;

    matches.sort_by(|a, b| b.id.cmp(&a.id));

    Ok(matches
        .into_iter()
        .map(|info| FileEntry {
            id: info.id.to_string(),
            url: links.file_url(&info.id),
            name: info.metadata.original_name,
        })
        .collect())
}
