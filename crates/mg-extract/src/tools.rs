//! External tool detection and management.
//!
//! The [`ToolRegistry`] discovers and caches the locations of the external
//! CLI tools mediagrab drives (yt-dlp, and the ffmpeg binary it uses for
//! transcoding and merging) and provides lookup methods for the rest of the
//! crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the extraction engine binary.
pub const YTDLP: &str = "yt-dlp";
/// Name of the transcoder binary.
pub const FFMPEG: &str = "ffmpeg";

/// Known tool names that the registry manages.
const KNOWN_TOOLS: &[&str] = &[YTDLP, FFMPEG];

/// Configuration for a single external tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Human-readable tool name (e.g. "yt-dlp").
    pub name: String,
    /// Resolved path to the executable.
    pub path: PathBuf,
}

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Version string (first line of `--version` output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry holding discovered tool configurations.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolConfig>,
}

impl ToolRegistry {
    /// Discover tools by searching `PATH` (or using overrides from config).
    ///
    /// For each known tool, if the [`mg_core::config::ToolsConfig`] supplies a
    /// custom path **and** that path exists, it is used directly. Otherwise
    /// [`which::which`] is used to locate the tool in `PATH`. Tools that are
    /// not found are silently omitted from the registry.
    pub fn discover(tools_config: &mg_core::config::ToolsConfig) -> Self {
        let mut registry = Self::default();

        for &name in KNOWN_TOOLS {
            let custom_path = match name {
                YTDLP => tools_config.ytdlp_path.as_deref(),
                FFMPEG => tools_config.ffmpeg_path.as_deref(),
                _ => None,
            };

            let resolved = match custom_path {
                Some(p) if p.exists() => Some(p.to_path_buf()),
                Some(p) => {
                    tracing::warn!(
                        "Configured path for {name} does not exist: {}; searching PATH",
                        p.display()
                    );
                    which::which(name).ok()
                }
                None => which::which(name).ok(),
            };

            if let Some(path) = resolved {
                registry = registry.with_tool(name, path);
            }
        }

        registry
    }

    /// Register a tool at an explicit path.
    pub fn with_tool(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.tools.insert(
            name.to_string(),
            ToolConfig {
                name: name.to_string(),
                path: path.into(),
            },
        );
        self
    }

    /// Return a reference to the [`ToolConfig`] for the given tool, or an
    /// [`mg_core::Error::Tool`] if the tool was not found during discovery.
    pub fn require(&self, name: &str) -> mg_core::Result<&ToolConfig> {
        self.tools.get(name).ok_or_else(|| {
            mg_core::Error::tool(name, format!("{name} not found; is it installed and in PATH?"))
        })
    }

    /// Path of a tool, if it was found.
    pub fn path(&self, name: &str) -> Option<&Path> {
        self.tools.get(name).map(|t| t.path.as_path())
    }

    /// Check all known tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        KNOWN_TOOLS
            .iter()
            .map(|&name| match self.tools.get(name) {
                Some(cfg) => ToolInfo {
                    name: name.to_string(),
                    available: true,
                    version: detect_version(name, &cfg.path),
                    path: Some(cfg.path.clone()),
                },
                None => ToolInfo {
                    name: name.to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            })
            .collect()
    }
}

/// Run `<tool> --version` (or `-version` for ffmpeg) and return the first
/// line of stdout.
fn detect_version(name: &str, path: &Path) -> Option<String> {
    let version_arg = match name {
        FFMPEG => "-version",
        _ => "--version",
    };

    let output = std::process::Command::new(path)
        .arg(version_arg)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mg_core::config::ToolsConfig;

    #[test]
    fn empty_registry_requires_fail() {
        let registry = ToolRegistry::default();
        let err = registry.require(YTDLP).unwrap_err();
        assert!(err.to_string().contains("yt-dlp not found"));
        assert!(registry.path(FFMPEG).is_none());
    }

    #[test]
    fn explicit_tool_is_returned() {
        let registry = ToolRegistry::default().with_tool(YTDLP, "/opt/bin/yt-dlp");
        assert_eq!(
            registry.require(YTDLP).unwrap().path,
            PathBuf::from("/opt/bin/yt-dlp")
        );
    }

    #[test]
    fn check_all_lists_every_known_tool() {
        let registry = ToolRegistry::default();
        let infos = registry.check_all();
        assert_eq!(infos.len(), KNOWN_TOOLS.len());
        assert!(infos.iter().all(|i| !i.available && i.path.is_none()));
    }

    #[test]
    fn missing_configured_path_falls_back_to_path_lookup() {
        let config = ToolsConfig {
            ytdlp_path: Some(PathBuf::from("/definitely/not/here/yt-dlp")),
            ffmpeg_path: None,
        };
        let registry = ToolRegistry::discover(&config);
        if let Some(path) = registry.path(YTDLP) {
            assert_ne!(path, Path::new("/definitely/not/here/yt-dlp"));
        }
    }

    #[test]
    fn existing_configured_path_is_used() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let config = ToolsConfig {
            ytdlp_path: Some(tmp.path().to_path_buf()),
            ffmpeg_path: None,
        };
        let registry = ToolRegistry::discover(&config);
        assert_eq!(registry.path(YTDLP), Some(tmp.path()));
    }
}
