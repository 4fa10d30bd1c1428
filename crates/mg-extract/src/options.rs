//! yt-dlp argument construction.
//!
//! [`ExtractionOptions`] is derived deterministically from an
//! [`ExtractionJob`]: the same job always yields the same argument list.

use std::path::Path;

use mg_core::TargetFormat;

use crate::extractor::ExtractionJob;

/// Format selector for audio downloads.
pub const AUDIO_FORMAT_SELECTOR: &str = "bestaudio/best";

/// Format selector for video downloads: an MP4 video stream plus an M4A audio
/// stream, falling back to a single MP4 file and then to anything.
pub const VIDEO_FORMAT_SELECTOR: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Output template; the engine fills in title and extension.
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Command-line options for one yt-dlp invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOptions {
    args: Vec<String>,
}

impl ExtractionOptions {
    /// Build the argument list for a job. `ffmpeg` is passed through as
    /// `--ffmpeg-location` when known.
    pub fn build(job: &ExtractionJob, ffmpeg: Option<&Path>) -> Self {
        let mut args: Vec<String> = Vec::new();

        args.push("-f".into());
        args.push(format_selector(job.format).into());

        if job.format.is_audio() {
            args.extend([
                "--extract-audio".to_string(),
                "--audio-format".to_string(),
                job.format.extension().to_string(),
                "--audio-quality".to_string(),
                format!("{}K", job.audio_quality_kbps),
            ]);
        } else {
            args.push("--merge-output-format".into());
            args.push(job.format.extension().into());
        }

        args.push("-o".into());
        args.push(output_template(&job.output_dir));

        args.extend(
            [
                "--no-playlist",
                "--quiet",
                "--no-progress",
                "--no-warnings",
                "--dump-json",
                "--no-simulate",
            ]
            .map(String::from),
        );

        if let Some(ref cookies) = job.cookies_file {
            args.push("--cookies".into());
            args.push(cookies.to_string_lossy().to_string());
        }

        if let Some(ffmpeg) = ffmpeg {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.to_string_lossy().to_string());
        }

        // Keep a URL starting with '-' from being read as an option.
        args.push("--".into());
        args.push(job.url.clone());

        Self { args }
    }

    /// The full argument list, URL last.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Value following `flag`, if present.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Whether the bare flag is present.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }
}

/// yt-dlp `-f` selector for a target format.
pub fn format_selector(format: TargetFormat) -> &'static str {
    match format {
        TargetFormat::Mp3 => AUDIO_FORMAT_SELECTOR,
        TargetFormat::Mp4 => VIDEO_FORMAT_SELECTOR,
    }
}

/// Output template rooted at `dir`.
pub fn output_template(dir: &Path) -> String {
    dir.join(OUTPUT_TEMPLATE).to_string_lossy().to_string()
}
