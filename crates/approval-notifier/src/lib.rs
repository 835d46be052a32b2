//! Notification dispatch for access approvals.
//!
//! The approval flow only needs to know whether the operator was reached:
//! [`Notifier::send`] resolves once the transport accepted the message and
//! fails otherwise.

mod error;
mod log_notifier;
pub mod testing;
mod webhook;

pub use error::{NotifyError, NotifyResult};
pub use log_notifier::LogNotifier;
pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use serde::Serialize;

/// One approval link addressed to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalNotice {
    pub operator_address: String,
    pub subject_id: String,
    pub approval_link: String,
}

impl ApprovalNotice {
    pub fn subject_line(&self) -> String {
        format!("Access request for {}", self.subject_id)
    }

    pub fn body_text(&self) -> String {
        format!(
            "Someone has requested access to {}.\n\nOpen this link to approve the request:\n{}\n\nIgnore this message to deny it.",
            self.subject_id, self.approval_link
        )
    }
}

/// Outbound transport for approval notices.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notice: &ApprovalNotice) -> NotifyResult<()>;
}
