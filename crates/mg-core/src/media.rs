//! Output formats accepted by the download endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Message returned for any format outside the allow-list.
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid format. Use 'mp3' or 'mp4'.";

/// The media format a caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// Audio only, transcoded to MP3.
    #[default]
    Mp3,
    /// Video and audio merged into an MP4 container.
    Mp4,
}

impl TargetFormat {
    /// File extension of the produced artifact (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Mp3 => "mp3",
            TargetFormat::Mp4 => "mp4",
        }
    }

    /// MIME type used for the download response.
    pub fn mime_type(self) -> &'static str {
        match self {
            TargetFormat::Mp3 => "audio/mpeg",
            TargetFormat::Mp4 => "video/mp4",
        }
    }

    /// Whether this format only keeps the audio stream.
    pub fn is_audio(self) -> bool {
        matches!(self, TargetFormat::Mp3)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(TargetFormat::Mp3),
            "mp4" => Ok(TargetFormat::Mp4),
            _ => Err(Error::invalid(INVALID_FORMAT_MESSAGE)),
        }
    }
}
