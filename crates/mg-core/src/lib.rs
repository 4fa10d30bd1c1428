//! mg-core: shared types, errors, and configuration.
//!
//! This crate is the foundational dependency for the other mg-* crates,
//! providing the unified error type, the target media formats, the incoming
//! download request and its validation, and application configuration.

pub mod config;
pub mod error;
pub mod media;
pub mod request;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use media::TargetFormat;
pub use request::{DownloadRequest, ValidatedRequest};
