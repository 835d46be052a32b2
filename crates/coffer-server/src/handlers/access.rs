//! Access-approval handlers: request, operator approval, and polling.

use crate::error::ApiError;
use crate::pages;
use crate::state::AppState;
use access_approval_registry::{ApprovalError, PollOutcome};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    pub subject_id: String,
    pub secret: String,
}

#[derive(Debug, Serialize)]
pub struct AccessTicket {
    pub token: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStatus {
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}

/// `POST /verify-access`
pub async fn verify_access(
    State(state): State<AppState>,
    payload: Result<Json<AccessRequest>, JsonRejection>,
) -> Result<Json<AccessTicket>, ApiError> {
    let Json(request) = payload?;
    let token = state
        .approvals
        .request_access(&request.subject_id, &request.secret)
        .await?;

    Ok(Json(AccessTicket {
        token,
        message: "Approval request sent to the operator".to_string(),
    }))
}

/// `GET /approve/{token}`: reached from the operator's notification.
pub async fn approve(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> (StatusCode, Html<String>) {
    match state.approvals.record_approval(&token) {
        Ok(subject_id) => (StatusCode::OK, Html(pages::approved(&subject_id))),
        Err(ApprovalError::NotFound) => {
            debug!(token = token_prefix(&token), "Approval link for unknown token");
            (StatusCode::NOT_FOUND, Html(pages::unknown_token()))
        }
        Err(err) => {
            error!(error = %err, "Failed to record approval");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::failure()),
            )
        }
    }
}

/// `GET /check-approval/{token}`
pub async fn check_approval(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ApprovalStatus>, ApiError> {
    let status = match state.approvals.check_approval(&token)? {
        PollOutcome::Pending => ApprovalStatus {
            approved: false,
            subject_id: None,
        },
        PollOutcome::Approved { subject_id } => ApprovalStatus {
            approved: true,
            subject_id: Some(subject_id),
        },
    };
    Ok(Json(status))
}

/// Tokens are bearer credentials; only a short prefix goes to the log.
fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}
