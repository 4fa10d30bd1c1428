//! The [`Extractor`] trait and its yt-dlp implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mg_core::TargetFormat;
use serde::{Deserialize, Serialize};

use crate::auth::classify_failure;
use crate::command::ToolCommand;
use crate::options::ExtractionOptions;
use crate::tools::{ToolRegistry, FFMPEG, YTDLP};

/// Everything the engine needs for one request.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub url: String,
    pub format: TargetFormat,
    /// Working directory the engine writes into.
    pub output_dir: PathBuf,
    /// Materialized cookie file, if authentication material was supplied.
    pub cookies_file: Option<PathBuf>,
    pub audio_quality_kbps: u32,
    pub timeout: Duration,
}

/// Content metadata reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaMetadata {
    pub title: Option<String>,
    pub ext: Option<String>,
    /// Path the engine planned to write before post-processing.
    #[serde(rename = "_filename")]
    pub planned_filename: Option<String>,
    pub filename: Option<String>,
}

impl MediaMetadata {
    /// Title to present to the user, `"download"` when unknown.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("download")
    }

    /// File name the engine reported, whichever key it used.
    pub fn reported_filename(&self) -> Option<&str> {
        self.planned_filename
            .as_deref()
            .or(self.filename.as_deref())
            .filter(|f| !f.is_empty())
    }

    /// Parse the engine's JSON output. yt-dlp prints one JSON object per
    /// line; the last one describes the downloaded entry.
    pub fn from_engine_output(stdout: &str) -> Option<Self> {
        stdout
            .lines()
            .rev()
            .map(str::trim)
            .filter(|l| l.starts_with('{'))
            .find_map(|l| serde_json::from_str(l).ok())
    }
}

/// A media extraction engine.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Human-readable name identifying this extractor implementation.
    fn name(&self) -> &'static str;

    /// Download and convert the media for `job` into `job.output_dir` and
    /// report its metadata.
    async fn extract(&self, job: &ExtractionJob) -> mg_core::Result<MediaMetadata>;
}

/// [`Extractor`] backed by the yt-dlp command-line tool.
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    tools: Arc<ToolRegistry>,
}

impl YtDlpExtractor {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    fn ffmpeg(&self) -> Option<&Path> {
        self.tools.path(FFMPEG)
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        YTDLP
    }

    async fn extract(&self, job: &ExtractionJob) -> mg_core::Result<MediaMetadata> {
        let ytdlp = self.tools.require(YTDLP)?;
        let options = ExtractionOptions::build(job, self.ffmpeg());

        tracing::info!(url = %job.url, format = %job.format, "Starting extraction");

        let output = ToolCommand::new(ytdlp.path.clone())
            .args(options.args().iter().cloned())
            .timeout(job.timeout)
            .current_dir(&job.output_dir)
            .output()
            .await?;

        if !output.status.success() {
            let err = classify_failure(&output.stderr, output.status);
            tracing::warn!(url = %job.url, status = %output.status, "Extraction failed: {err}");
            return Err(err);
        }

        let metadata = MediaMetadata::from_engine_output(&output.stdout).unwrap_or_else(|| {
            tracing::warn!(url = %job.url, "Extractor reported no metadata");
            MediaMetadata::default()
        });

        tracing::info!(
            url = %job.url,
            title = metadata.display_title(),
            "Extraction finished"
        );

        Ok(metadata)
    }
}
