//! HTTP surface for the coffer file service.
//!
//! Routes are thin: each handler extracts its inputs, calls into the
//! pipeline or approval crates, and converts failures through [`ApiError`].

mod app;
mod error;
mod handlers;
mod pages;
mod router;
mod state;

pub use app::{run_server, spawn_expiry_sweeper};
pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
