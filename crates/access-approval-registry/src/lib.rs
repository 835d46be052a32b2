//! Operator-approved access to protected files.
//!
//! A requester who knows the shared secret receives a one-time token while
//! the operator receives an approval link for the same token. The requester
//! polls until the operator has followed the link; the first poll that sees
//! the approval consumes the token.
//!
//! ```text
//! request_access ──► Pending ──record_approval──► Approved ──check_approval──► (removed)
//!                       │                            │
//!                       └────────── ttl ─────────────┴──► (removed)
//! ```

mod error;
mod registry;
mod service;

pub use error::{ApprovalError, ApprovalResult};
pub use registry::{ApprovalRegistry, PollOutcome, DEFAULT_APPROVAL_TTL};
pub use service::{AccessApproval, AccessApprovalSettings};
