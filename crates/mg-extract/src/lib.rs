//! # mg-extract
//!
//! Orchestration of the external extraction toolchain for mediagrab.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to yt-dlp
//!   and ffmpeg.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support; the child process is killed when the invocation is dropped.
//! - **Working directories** ([`WorkDir`]) -- per-request temporary directory
//!   with best-effort, idempotent release.
//! - **Extraction** ([`Extractor`], [`YtDlpExtractor`]) -- builds the yt-dlp
//!   invocation for a target format and reports content metadata.
//! - **Artifact lookup** ([`locate_artifact`]) -- finds the file the engine
//!   produced, whose name it chose itself.

pub mod auth;
pub mod command;
pub mod extractor;
pub mod locate;
pub mod options;
pub mod tools;
pub mod workdir;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use extractor::{ExtractionJob, Extractor, MediaMetadata, YtDlpExtractor};
pub use locate::locate_artifact;
pub use options::ExtractionOptions;
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use workdir::WorkDir;
