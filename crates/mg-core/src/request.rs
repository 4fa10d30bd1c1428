//! Download request parsing and validation.
//!
//! Every field is optional. A body that is not valid JSON reads as an empty
//! request and fails validation on the URL.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::media::{TargetFormat, INVALID_FORMAT_MESSAGE};
use crate::Error;

const URL_KEY: &str = "url";
const FORMAT_KEY: &str = "format";
const COOKIES_KEY: &str = "cookies_b64";

/// Message returned when the URL is absent or blank.
pub const MISSING_URL_MESSAGE: &str = "Missing URL";

/// Message returned when the supplied cookie blob cannot be decoded.
pub const INVALID_COOKIES_MESSAGE: &str = "Invalid cookies_b64: not valid base64";

/// Body of `POST /api/download` as sent by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadRequest {
    pub url: Option<String>,
    pub format: Option<String>,
    /// Netscape-format cookie file, base64 encoded.
    #[serde(alias = "cookies")]
    pub cookies_b64: Option<String>,
    /// Keys that were present in the body with a non-string value.
    #[serde(skip)]
    mistyped: Vec<&'static str>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Trimmed, non-empty source URL.
    pub url: String,
    pub format: TargetFormat,
    /// Decoded per-request authentication blob, if one was supplied.
    pub cookies: Option<Vec<u8>>,
}

impl DownloadRequest {
    /// Parse a raw request body, falling back to an empty request when the
    /// body is not a JSON object.
    ///
    /// Fields are read one by one, so a wrongly typed field only affects
    /// the check for that field.
    pub fn from_body(body: &[u8]) -> Self {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Ignoring unparseable download body: {e}");
                return Self::default();
            }
        };
        let Some(object) = value.as_object() else {
            tracing::debug!("Ignoring non-object download body");
            return Self::default();
        };

        let mut request = Self::default();
        request.url = request.string_field(object, URL_KEY, &[]);
        request.format = request.string_field(object, FORMAT_KEY, &[]);
        request.cookies_b64 = request.string_field(object, COOKIES_KEY, &["cookies"]);
        request
    }

    /// String value of `key` (or its first present alias). Null counts as
    /// absent; any other non-string value is recorded as mistyped.
    fn string_field(
        &mut self,
        object: &Map<String, Value>,
        key: &'static str,
        aliases: &[&str],
    ) -> Option<String> {
        let value = std::iter::once(key)
            .chain(aliases.iter().copied())
            .find_map(|k| object.get(k).filter(|v| !v.is_null()))?;

        match value.as_str() {
            Some(text) => Some(text.to_string()),
            None => {
                tracing::debug!("Download field {key} is not a string: {value}");
                self.mistyped.push(key);
                None
            }
        }
    }

    fn is_mistyped(&self, key: &str) -> bool {
        self.mistyped.contains(&key)
    }

    /// Check the request and normalize its fields.
    ///
    /// The URL is checked first, then the format, then the cookie blob.
    pub fn validate(self) -> Result<ValidatedRequest> {
        let url = self.url.as_deref().map(str::trim).unwrap_or_default();
        if url.is_empty() {
            return Err(Error::invalid(MISSING_URL_MESSAGE));
        }

        if self.is_mistyped(FORMAT_KEY) {
            return Err(Error::invalid(INVALID_FORMAT_MESSAGE));
        }
        let format = match self.format.as_deref() {
            Some(f) => f.parse::<TargetFormat>()?,
            None => TargetFormat::default(),
        };

        if self.is_mistyped(COOKIES_KEY) {
            return Err(Error::invalid(INVALID_COOKIES_MESSAGE));
        }
        let cookies = match self.cookies_b64.as_deref() {
            Some(blob) if !blob.trim().is_empty() => {
                Some(decode_blob(blob).ok_or_else(|| Error::invalid(INVALID_COOKIES_MESSAGE))?)
            }
            _ => None,
        };

        Ok(ValidatedRequest {
            url: url.to_string(),
            format,
            cookies,
        })
    }
}

/// Decode a base64 blob, tolerating embedded whitespace and line breaks.
pub fn decode_blob(blob: &str) -> Option<Vec<u8>> {
    let compact: String = blob.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .ok()
}
