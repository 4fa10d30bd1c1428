//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server, extraction, and tool sections. Every section defaults sensibly so
//! a completely empty `{}` file is valid. Environment variables are applied
//! on top of the file via [`Config::apply_env`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::request::decode_blob;
use crate::Error;

/// Listen port.
pub const ENV_PORT: &str = "PORT";
/// Listen address.
pub const ENV_HOST: &str = "MEDIAGRAB_HOST";
/// Process-wide default cookie blob (base64, Netscape format).
pub const ENV_COOKIES: &str = "YTDLP_COOKIES_B64";
/// Maximum number of concurrent extractions.
pub const ENV_MAX_CONCURRENT: &str = "MEDIAGRAB_MAX_CONCURRENT";
/// Per-extraction timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "MEDIAGRAB_TIMEOUT_SECS";

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub extraction: ExtractionConfig,
    pub tools: ToolsConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::invalid(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_process_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides using the given lookup.
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = parse_env(&lookup, ENV_PORT) {
            self.server.port = port;
        }
        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            self.server.host = host.trim().to_string();
        }
        if let Some(blob) = lookup(ENV_COOKIES).filter(|b| !b.trim().is_empty()) {
            self.extraction.default_cookies_b64 = Some(blob);
        }
        if let Some(n) = parse_env(&lookup, ENV_MAX_CONCURRENT) {
            self.extraction.max_concurrent = n;
        }
        if let Some(secs) = parse_env(&lookup, ENV_TIMEOUT_SECS) {
            self.extraction.timeout_secs = secs;
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.extraction.max_concurrent == 0 {
            warnings.push("extraction.max_concurrent is 0; using 1".into());
        }

        if self.extraction.timeout_secs == 0 {
            warnings.push("extraction.timeout_secs is 0; extractions will time out immediately".into());
        }

        if self.extraction.default_cookies_b64.is_some() && self.extraction.default_cookies().is_none() {
            warnings.push("default cookies are set but are not valid base64; ignoring them".into());
        }

        warnings
    }
}

fn parse_env<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring {key}={raw:?}: not a valid value");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

/// Extraction settings shared by every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Kill the extractor after this many seconds.
    pub timeout_secs: u64,
    /// Upper bound on extractions running at the same time.
    pub max_concurrent: usize,
    /// Target bitrate for MP3 transcoding.
    pub audio_quality_kbps: u32,
    /// Prefix for per-request working directories.
    pub temp_prefix: String,
    /// Cookie blob used when a request does not carry its own.
    #[serde(skip_serializing)]
    pub default_cookies_b64: Option<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 900,
            max_concurrent: 4,
            audio_quality_kbps: 320,
            temp_prefix: "ytdl_".into(),
            default_cookies_b64: None,
        }
    }
}

impl ExtractionConfig {
    /// The decoded process-wide cookie blob, if configured and valid.
    pub fn default_cookies(&self) -> Option<Vec<u8>> {
        self.default_cookies_b64
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .and_then(decode_blob)
    }

    /// Pick the cookie blob for a request: the per-request blob wins over
    /// the process default.
    pub fn resolve_cookies(&self, per_request: Option<Vec<u8>>) -> Option<Vec<u8>> {
        per_request.or_else(|| self.default_cookies())
    }

    /// Effective concurrency limit (never zero).
    pub fn worker_slots(&self) -> usize {
        self.max_concurrent.max(1)
    }
}

/// Paths to external CLI tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ytdlp_path: Option<PathBuf>,
    pub ffmpeg_path: Option<PathBuf>,
}
