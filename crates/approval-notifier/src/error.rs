//! Error types for notification dispatch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Network or transport-level HTTP error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The transport answered with a non-success status.
    #[error("notification rejected: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// The notifier could not be constructed.
    #[error("notifier configuration error: {0}")]
    Config(String),
}

pub type NotifyResult<T> = Result<T, NotifyError>;
