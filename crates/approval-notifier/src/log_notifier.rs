use crate::{ApprovalNotice, Notifier, NotifyResult};
use async_trait::async_trait;
use tracing::info;

/// Writes the approval link to the service log.
///
/// Used when no webhook is configured; the operator reads the link from the
/// log stream.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notice: &ApprovalNotice) -> NotifyResult<()> {
        info!(
            operator = %notice.operator_address,
            subject_id = %notice.subject_id,
            approval_link = %notice.approval_link,
            "access approval requested"
        );
        Ok(())
    }
}
