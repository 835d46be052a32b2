//! Route handlers, grouped by concern.

pub mod access;
pub mod files;
pub mod health;
