//! Upload, download, and listing handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::{
    CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS,
};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use file_transfer_pipeline::{
    list_categories, list_files_in_category, open_download, upload, ByteStream, FileEntry,
    IncomingFile, UploadReceipt, UploadRequest,
};
use futures_util::TryStreamExt;
use serde::Deserialize;
use std::io;
use tracing::debug;

const OCTET_STREAM: &str = "application/octet-stream";

/// Types a browser would execute if rendered on our origin.
const ACTIVE_TYPES: [&str; 7] = [
    "text/html",
    "application/xhtml+xml",
    "image/svg+xml",
    "text/xml",
    "application/xml",
    "text/javascript",
    "application/javascript",
];

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub category: Option<String>,
}

/// `POST /upload`
///
/// Multipart body with a `file` part. The category comes from a `category`
/// text part sent before the file, or from the `category` query parameter.
/// The file part is streamed straight into the store.
pub async fn upload_file(
    State(state): State<AppState>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadReceipt>, ApiError> {
    let Query(query) = query?;
    let mut multipart = multipart?;
    let mut category = query.category;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("category") => {
                category = Some(field.text().await?);
            }
            Some("file") => {
                let original_name = field.file_name().unwrap_or("file").to_string();
                let content_type = field.content_type().map(str::to_string);
                let body: ByteStream<'_> = Box::pin(field.map_err(io::Error::other));

                let request = UploadRequest {
                    file: Some(IncomingFile {
                        original_name,
                        content_type,
                        body,
                    }),
                    category,
                };
                let receipt =
                    upload(state.store.as_ref(), &state.links, state.limits, request).await?;
                return Ok(Json(receipt));
            }
            other => {
                debug!(field = ?other, "Ignoring unexpected multipart field");
            }
        }
    }

    let request = UploadRequest {
        file: None,
        category,
    };
    let receipt = upload(state.store.as_ref(), &state.links, state.limits, request).await?;
    Ok(Json(receipt))
}

/// `GET /file/{id}`: stream the stored bytes back.
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let download = open_download(state.store.as_ref(), &id).await?;
    let info = &download.info;

    let mut headers = HeaderMap::new();
    let content_type = info.content_type.as_deref().unwrap_or(OCTET_STREAM);
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(content_type).unwrap_or(HeaderValue::from_static(OCTET_STREAM)),
    );
    headers.insert(CONTENT_LENGTH, HeaderValue::from(info.length));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    if let Ok(disposition) = HeaderValue::from_str(&format!(
        "{}; filename*=UTF-8''{}",
        disposition_kind(content_type),
        urlencoding::encode(&info.metadata.original_name)
    )) {
        headers.insert(CONTENT_DISPOSITION, disposition);
    }

    Ok((headers, Body::from_stream(download.body)).into_response())
}

/// Active content is only ever offered as a download.
fn disposition_kind(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if ACTIVE_TYPES.contains(&essence.as_str()) {
        "attachment"
    } else {
        "inline"
    }
}

/// `GET /categories`
pub async fn categories() -> Json<&'static [&'static str]> {
    Json(list_categories())
}

/// `GET /files/{category}`: newest first.
pub async fn files_in_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<FileEntry>>, ApiError> {
    let entries = list_files_in_category(state.store.as_ref(), &state.links, &category).await?;
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_content_is_served_as_attachment() {
        assert_eq!(disposition_kind("text/html"), "attachment");
        assert_eq!(disposition_kind("Text/HTML; charset=utf-8"), "attachment");
        assert_eq!(disposition_kind("image/svg+xml"), "attachment");
        assert_eq!(disposition_kind("text/plain"), "inline");
        assert_eq!(disposition_kind("image/png"), "inline");
    }
}
