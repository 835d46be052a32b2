//! In-memory registry of approval requests keyed by one-time token.
//!
//! Every operation takes the registry lock once, so creating, approving and
//! consuming a token are each atomic with respect to one another.

use crate::error::{ApprovalError, ApprovalResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Lifetime of an unconsumed request.
pub const DEFAULT_APPROVAL_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApprovalState {
    Pending,
    Approved,
}

#[derive(Debug, Clone)]
struct Entry {
    subject_id: String,
    state: ApprovalState,
    expires_at: Instant,
}

/// Result of a poll on a live token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Not approved yet; the token stays live.
    Pending,
    /// Approved; the token has been consumed by this poll.
    Approved { subject_id: String },
}

#[derive(Debug)]
pub struct ApprovalRegistry {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl Default for ApprovalRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_APPROVAL_TTL)
    }
}

impl ApprovalRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Register a pending request and return its fresh token.
    pub fn insert_pending(&self, subject_id: &str, now: Instant) -> String {
        let mut entries = self.entries.lock();
        purge(&mut entries, now);

        let token = loop {
            let candidate = Uuid::new_v4().simple().to_string();
            if !entries.contains_key(&candidate) {
                break candidate;
            }
        };
        entries.insert(
            token.clone(),
            Entry {
                subject_id: subject_id.to_string(),
                state: ApprovalState::Pending,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// Drop a token regardless of state.
    pub fn remove(&self, token: &str) -> bool {
        self.entries.lock().remove(token).is_some()
    }

    /// Mark a token approved and return its subject. Repeat calls are no-ops.
    pub fn approve(&self, token: &str, now: Instant) -> ApprovalResult<String> {
        let mut entries = self.entries.lock();
        purge(&mut entries, now);

        let entry = entries.get_mut(token).ok_or(ApprovalError::NotFound)?;
        entry.state = ApprovalState::Approved;
        Ok(entry.subject_id.clone())
    }

    /// Report a token's state, consuming it if approved.
    pub fn poll(&self, token: &str, now: Instant) -> ApprovalResult<PollOutcome> {
        let mut entries = self.entries.lock();
        purge(&mut entries, now);

        match entries.get(token).map(|entry| entry.state) {
            None => Err(ApprovalError::NotFound),
            Some(ApprovalState::Pending) => Ok(PollOutcome::Pending),
            Some(ApprovalState::Approved) => {
                let entry = entries.remove(token).ok_or(ApprovalError::NotFound)?;
                Ok(PollOutcome::Approved {
                    subject_id: entry.subject_id,
                })
            }
        }
    }

    /// Current state of a live token, without side effects beyond expiry.
    #[cfg(test)]
    fn state(&self, token: &str, now: Instant) -> Option<ApprovalState> {
        let mut entries = self.entries.lock();
        purge(&mut entries, now);
        entries.get(token).map(|entry| entry.state)
    }

    /// Remove expired entries and return how many were dropped.
    pub fn purge_expired(&self, now: Instant) -> usize {
        purge(&mut self.entries.lock(), now)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

fn purge(entries: &mut HashMap<String, Entry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.expires_at > now);
    before - entries.len()
}
