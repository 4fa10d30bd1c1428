//! Unified error type for mediagrab.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`].

/// Message returned when the extractor finished but no output file was found.
pub const ARTIFACT_NOT_FOUND_MESSAGE: &str =
    "Failed to produce output file. Ensure the URL is valid and try again.";

/// Unified error type covering all failure modes in mediagrab.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request data failed validation. The message is shown to the caller
    /// verbatim.
    #[error("{0}")]
    InvalidRequest(String),

    /// The extraction engine failed (network failure, unavailable content,
    /// authentication required, ...).
    #[error("{0}")]
    Extraction(String),

    /// The extraction engine succeeded but its output could not be located.
    #[error("{}", ARTIFACT_NOT_FOUND_MESSAGE)]
    ArtifactNotFound,

    /// An external tool (yt-dlp, ffmpeg) could not be run.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidRequest(_) => 400,
            Error::Extraction(_) => 500,
            Error::ArtifactNotFound => 500,
            Error::Tool { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::InvalidRequest`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidRequest(message.into())
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_display_is_verbatim() {
        let err = Error::invalid("Missing URL");
        assert_eq!(err.to_string(), "Missing URL");
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn extraction_display() {
        let err = Error::Extraction("Video unavailable".into());
        assert_eq!(err.to_string(), "Video unavailable");
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn artifact_not_found_display() {
        let err = Error::ArtifactNotFound;
        assert_eq!(err.to_string(), ARTIFACT_NOT_FOUND_MESSAGE);
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn tool_display() {
        let err = Error::tool("yt-dlp", "exit code 1");
        assert_eq!(err.to_string(), "Tool error [yt-dlp]: exit code 1");
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn internal_display() {
        let err = Error::Internal("unexpected state".into());
        assert_eq!(err.to_string(), "Internal error: unexpected state");
        assert_eq!(err.http_status(), 500);
    }
}
