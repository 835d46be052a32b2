//! Translation of internal failures into HTTP responses.

use access_approval_registry::ApprovalError;
use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use file_transfer_pipeline::TransferError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error returned by every JSON endpoint, rendered as `{"error": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("invalid secret")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// Details are logged where the error is produced, never sent.
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::MissingFile => ApiError::BadRequest(err.to_string()),
            TransferError::PayloadTooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            TransferError::NotFound(_) => ApiError::NotFound("file not found".to_string()),
            TransferError::Interrupted(cause) => match body_limit_hit(&cause) {
                Some(rejection) => rejection,
                None => ApiError::BadRequest(format!("upload interrupted: {}", cause)),
            },
            TransferError::Store(source) => {
                error!(error = %source, "Blob store failure");
                ApiError::Internal
            }
        }
    }
}

impl From<ApprovalError> for ApiError {
    fn from(err: ApprovalError) -> Self {
        match err {
            ApprovalError::Unauthorized => ApiError::Unauthorized,
            ApprovalError::NotFound => ApiError::NotFound(err.to_string()),
            ApprovalError::InvalidSubject => ApiError::BadRequest(err.to_string()),
            ApprovalError::Dispatch(source) => {
                error!(error = %source, "Approval notification failed");
                ApiError::Internal
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// The outer request-size guard surfaces as a multipart read error inside
/// the upload body stream.
fn body_limit_hit(cause: &std::io::Error) -> Option<ApiError> {
    let multipart = cause.get_ref()?.downcast_ref::<MultipartError>()?;
    (multipart.status() == StatusCode::PAYLOAD_TOO_LARGE)
        .then(|| ApiError::PayloadTooLarge(multipart.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval_notifier::NotifyError;
    use chunked_blob_store::BlobStoreError;

    #[test]
    fn transfer_errors_map_to_statuses() {
        let cases = [
            (TransferError::MissingFile, StatusCode::BAD_REQUEST),
            (
                TransferError::PayloadTooLarge { limit: 10 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                TransferError::NotFound("x".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                TransferError::Interrupted(std::io::Error::other("reset")),
                StatusCode::BAD_REQUEST,
            ),
            (
                TransferError::Store(BlobStoreError::Io(std::io::Error::other("disk"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn approval_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(ApprovalError::Unauthorized).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(ApprovalError::NotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        let dispatch = ApprovalError::Dispatch(NotifyError::Config("no transport".to_string()));
        assert_eq!(
            ApiError::from(dispatch).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = ApiError::from(TransferError::Store(BlobStoreError::Io(
            std::io::Error::other("/var/lib/secret/path"),
        )));
        assert_eq!(err.to_string(), "internal server error");
    }
}
