use crate::error::{ApprovalError, ApprovalResult};
use crate::registry::{ApprovalRegistry, PollOutcome};
use approval_notifier::{ApprovalNotice, Notifier};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Static inputs for [`AccessApproval`].
#[derive(Debug, Clone)]
pub struct AccessApprovalSettings {
    /// Shared secret requesters must present. `None` rejects every request.
    pub access_secret: Option<String>,
    pub operator_address: String,
    /// Public origin used to build approval links, without trailing slash.
    pub base_url: String,
    pub ttl: Duration,
}

/// Approval flow: secret check, token issue, operator notification,
/// approval and single-use consumption.
pub struct AccessApproval {
    registry: ApprovalRegistry,
    notifier: Arc<dyn Notifier>,
    secret_digest: Option<[u8; 32]>,
    operator_address: String,
    base_url: String,
}

impl AccessApproval {
    pub fn new(settings: AccessApprovalSettings, notifier: Arc<dyn Notifier>) -> Self {
        if settings.access_secret.is_none() {
            warn!("No access secret configured; all access requests will be rejected");
        }
        Self {
            registry: ApprovalRegistry::new(settings.ttl),
            notifier,
            secret_digest: settings.access_secret.as_deref().map(digest),
            operator_address: settings.operator_address,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Issue a token for `subject_id` and send the operator its approval link.
    ///
    /// The token is only returned once the notice was accepted by the
    /// transport. If dispatch fails, or the caller goes away while it is in
    /// flight, the token is withdrawn.
    pub async fn request_access(&self, subject_id: &str, secret: &str) -> ApprovalResult<String> {
        if !self.secret_matches(secret) {
            warn!(subject_id, "Access request rejected: invalid secret");
            return Err(ApprovalError::Unauthorized);
        }
        let subject_id = subject_id.trim();
        if subject_id.is_empty() {
            return Err(ApprovalError::InvalidSubject);
        }

        let token = self.registry.insert_pending(subject_id, Instant::now());
        let guard = PendingGuard {
            registry: &self.registry,
            token: &token,
            armed: true,
        };

        let notice = ApprovalNotice {
            operator_address: self.operator_address.clone(),
            subject_id: subject_id.to_string(),
            approval_link: self.approval_link(&token),
        };
        if let Err(err) = self.notifier.send(&notice).await {
            warn!(subject_id, error = %err, "Failed to notify operator; withdrawing token");
            return Err(err.into());
        }
        guard.disarm();

        info!(subject_id, "Access requested; operator notified");
        Ok(token)
    }

    /// Mark a token approved. Returns the subject it was issued for.
    pub fn record_approval(&self, token: &str) -> ApprovalResult<String> {
        let subject_id = self.registry.approve(token, Instant::now())?;
        info!(subject_id = %subject_id, "Access approved by operator");
        Ok(subject_id)
    }

    /// Poll a token. An approved token is consumed by the first poll that
    /// observes the approval.
    pub fn check_approval(&self, token: &str) -> ApprovalResult<PollOutcome> {
        let outcome = self.registry.poll(token, Instant::now())?;
        if let PollOutcome::Approved { subject_id } = &outcome {
            info!(subject_id = %subject_id, "Approved token consumed");
        }
        Ok(outcome)
    }

    /// Drop expired tokens. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let removed = self.registry.purge_expired(Instant::now());
        if removed > 0 {
            debug!(removed, "Purged expired approval tokens");
        }
        removed
    }

    pub fn registry(&self) -> &ApprovalRegistry {
        &self.registry
    }

    fn approval_link(&self, token: &str) -> String {
        format!("{}/approve/{}", self.base_url, token)
    }

    fn secret_matches(&self, submitted: &str) -> bool {
        match &self.secret_digest {
            Some(expected) => digest(submitted) == *expected,
            None => false,
        }
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// Withdraws a freshly issued token unless disarmed.
struct PendingGuard<'a> {
    registry: &'a ApprovalRegistry,
    token: &'a str,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.registry.remove(self.token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval_notifier::testing::{FailingNotifier, RecordingNotifier};

    const SECRET: &str = "open-sesame";

    fn settings() -> AccessApprovalSettings {
        AccessApprovalSettings {
            access_secret: Some(SECRET.to_string()),
            operator_address: "ops@example.com".to_string(),
            base_url: "https://files.example.com/".to_string(),
            ttl: Duration::from_secs(60),
        }
    }

    fn service() -> (AccessApproval, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let service = AccessApproval::new(settings(), Arc::new(notifier.clone()));
        (service, notifier)
    }

    fn token_from_link(link: &str) -> &str {
        link.rsplit('/').next().unwrap()
    }

    #[tokio::test]
    async fn full_approval_flow() {
        let (service, notifier) = service();

        let token = service.request_access("payroll.xlsx", SECRET).await.unwrap();
        assert_eq!(
            service.check_approval(&token).unwrap(),
            PollOutcome::Pending
        );

        let link = notifier.last_link().unwrap();
        assert_eq!(
            link,
            format!("https://files.example.com/approve/{}", token)
        );
        assert_eq!(
            service.record_approval(token_from_link(&link)).unwrap(),
            "payroll.xlsx"
        );

        assert_eq!(
            service.check_approval(&token).unwrap(),
            PollOutcome::Approved {
                subject_id: "payroll.xlsx".to_string()
            }
        );
        assert!(matches!(
            service.check_approval(&token),
            Err(ApprovalError::NotFound)
        ));
    }

    #[tokio::test]
    async fn notice_is_addressed_to_operator() {
        let (service, notifier) = service();
        service.request_access("report.pdf", SECRET).await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].operator_address, "ops@example.com");
        assert_eq!(sent[0].subject_id, "report.pdf");
    }

    #[tokio::test]
    async fn wrong_secret_creates_nothing() {
        let (service, notifier) = service();

        assert!(matches!(
            service.request_access("payroll.xlsx", "guess").await,
            Err(ApprovalError::Unauthorized)
        ));
        assert!(service.registry().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_secret_rejects_everything() {
        let mut settings = settings();
        settings.access_secret = None;
        let service = AccessApproval::new(settings, Arc::new(RecordingNotifier::new()));

        assert!(matches!(
            service.request_access("payroll.xlsx", "").await,
            Err(ApprovalError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn blank_subject_is_rejected() {
        let (service, _) = service();
        assert!(matches!(
            service.request_access("   ", SECRET).await,
            Err(ApprovalError::InvalidSubject)
        ));
        assert!(service.registry().is_empty());
    }

    #[tokio::test]
    async fn failed_dispatch_withdraws_token() {
        let service = AccessApproval::new(settings(), Arc::new(FailingNotifier));

        assert!(matches!(
            service.request_access("payroll.xlsx", SECRET).await,
            Err(ApprovalError::Dispatch(_))
        ));
        assert!(service.registry().is_empty());
    }

    #[tokio::test]
    async fn approving_unknown_token_fails() {
        let (service, _) = service();
        assert!(matches!(
            service.record_approval("nonexistent"),
            Err(ApprovalError::NotFound)
        ));
    }

    #[tokio::test]
    async fn repeated_approval_is_harmless() {
        let (service, _) = service();
        let token = service.request_access("a.txt", SECRET).await.unwrap();

        service.record_approval(&token).unwrap();
        service.record_approval(&token).unwrap();

        assert!(matches!(
            service.check_approval(&token),
            Ok(PollOutcome::Approved { .. })
        ));
    }

    #[tokio::test]
    async fn independent_tokens_per_request() {
        let (service, _) = service();
        let first = service.request_access("a.txt", SECRET).await.unwrap();
        let second = service.request_access("a.txt", SECRET).await.unwrap();
        assert_ne!(first, second);

        service.record_approval(&first).unwrap();
        assert_eq!(
            service.check_approval(&second).unwrap(),
            PollOutcome::Pending
        );
    }
}
