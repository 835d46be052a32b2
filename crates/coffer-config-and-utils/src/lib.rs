//! Core types, configuration, and utilities for the coffer service.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_APPROVAL_TTL_SECS, DEFAULT_BASE_URL, DEFAULT_BIND_ADDR, DEFAULT_CHUNK_SIZE,
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_UPLOAD_BYTES,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
