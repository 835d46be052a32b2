//! Notifier doubles for tests.

use crate::{ApprovalNotice, Notifier, NotifyError, NotifyResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Accepts every notice and keeps a copy.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<ApprovalNotice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<ApprovalNotice> {
        self.sent.lock().clone()
    }

    /// Approval link of the most recent notice.
    pub fn last_link(&self) -> Option<String> {
        self.sent().last().map(|notice| notice.approval_link.clone())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notice: &ApprovalNotice) -> NotifyResult<()> {
        self.sent.lock().push(notice.clone());
        Ok(())
    }
}

/// Rejects every notice.
#[derive(Debug, Clone, Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _notice: &ApprovalNotice) -> NotifyResult<()> {
        Err(NotifyError::Rejected {
            status: 502,
            message: "transport unavailable".to_string(),
        })
    }
}
