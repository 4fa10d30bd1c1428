//! Classification of extraction failures.
//!
//! yt-dlp reports failures as free text on stderr. Messages that indicate the
//! source wants a signed-in session are replaced with a hint telling the
//! caller how to supply cookies; everything else is reduced to the engine's
//! final `ERROR:` line.

use std::process::ExitStatus;

/// Hint returned instead of the raw engine message when authentication is
/// required.
pub const AUTH_REQUIRED_HINT: &str = "This content requires authentication. \
Export your browser cookies for the site in Netscape format, base64-encode them, \
and send them as cookies_b64 (or set YTDLP_COOKIES_B64 on the server), then try again.";

/// Lower-cased fragments of engine messages that mean "sign in first".
const AUTH_PATTERNS: &[&str] = &[
    "sign in to confirm",
    "not a bot",
    "--cookies",
    "cookies-from-browser",
    "login required",
    "log in to",
    "requires authentication",
    "account authentication",
    "members-only",
    "private video",
    "confirm your age",
    "age-restricted",
];

/// Whether an engine message indicates that authentication material is
/// needed.
pub fn requires_auth(message: &str) -> bool {
    let lower = message.to_lowercase();
    AUTH_PATTERNS.iter().any(|p| lower.contains(p))
}

/// The user-facing part of an engine failure: the last `ERROR:` line without
/// its prefix, else the last non-empty line.
pub fn summarize(stderr: &str) -> Option<String> {
    let lines = || stderr.lines().map(str::trim).filter(|l| !l.is_empty());

    lines()
        .filter_map(|l| l.split_once("ERROR:").map(|(_, rest)| rest.trim()))
        .filter(|l| !l.is_empty())
        .last()
        .or_else(|| lines().last())
        .map(String::from)
}

/// Turn a failed engine run into an [`mg_core::Error::Extraction`].
pub fn classify_failure(stderr: &str, status: ExitStatus) -> mg_core::Error {
    if requires_auth(stderr) {
        tracing::info!("Extraction needs authentication: {}", stderr.trim());
        return mg_core::Error::Extraction(AUTH_REQUIRED_HINT.to_string());
    }

    let message = summarize(stderr)
        .unwrap_or_else(|| format!("extraction failed ({status})"));
    mg_core::Error::Extraction(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn failed_status() -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(1 << 8)
    }

    #[test]
    fn detects_bot_check() {
        let stderr = "ERROR: [youtube] abc: Sign in to confirm you’re not a bot. \
                      Use --cookies-from-browser or --cookies for the authentication.";
        assert!(requires_auth(stderr));
    }

    #[test]
    fn detects_private_and_members_only() {
        assert!(requires_auth("ERROR: [youtube] x: Private video. Sign in if you've been granted access"));
        assert!(requires_auth("ERROR: Join this channel to get access to members-only content"));
        assert!(requires_auth("ERROR: This video is age-restricted"));
    }

    #[test]
    fn ordinary_failures_are_not_auth() {
        assert!(!requires_auth("ERROR: [generic] Unable to download webpage: HTTP Error 404"));
        assert!(!requires_auth("ERROR: Unsupported URL: https://valid.example/x"));
    }

    #[test]
    fn summarize_takes_last_error_line() {
        let stderr = "WARNING: something\nERROR: first\nnoise\nERROR: [generic] Unsupported URL: x\n";
        assert_eq!(summarize(stderr).as_deref(), Some("[generic] Unsupported URL: x"));
    }

    #[test]
    fn summarize_falls_back_to_last_line() {
        assert_eq!(summarize("boom\n\n").as_deref(), Some("boom"));
        assert_eq!(summarize("   \n"), None);
    }

    #[cfg(unix)]
    #[test]
    fn classify_rewrites_auth_failures() {
        let err = classify_failure("ERROR: [youtube] abc: Sign in to confirm you're not a bot", failed_status());
        let msg = err.to_string();
        assert_eq!(msg, AUTH_REQUIRED_HINT);
        assert!(msg.contains("cookies"));
        assert!(!msg.contains("[youtube]"));
        assert_eq!(err.http_status(), 500);
    }

    #[cfg(unix)]
    #[test]
    fn classify_keeps_other_messages() {
        let err = classify_failure("ERROR: Video unavailable", failed_status());
        assert_eq!(err.to_string(), "Video unavailable");
    }

    #[cfg(unix)]
    #[test]
    fn classify_with_empty_stderr_mentions_status() {
        let err = classify_failure("", failed_status());
        assert!(err.to_string().starts_with("extraction failed"));
    }
}
