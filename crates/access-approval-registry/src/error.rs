use approval_notifier::NotifyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApprovalError {
    /// The submitted secret does not match the configured one.
    #[error("invalid secret")]
    Unauthorized,

    /// Unknown, expired, or already consumed token.
    #[error("unknown or expired token")]
    NotFound,

    #[error("subject id must not be empty")]
    InvalidSubject,

    /// The operator could not be notified; no token was issued.
    #[error("failed to notify operator: {0}")]
    Dispatch(#[from] NotifyError),
}

pub type ApprovalResult<T> = Result<T, ApprovalError>;
