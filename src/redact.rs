//! Error-text redaction
//!
//! Upstream error strings can carry filesystem paths, API keys embedded in
//! URLs, and host addresses. Everything that might be logged or echoed to a
//! client goes through [`scrub`] first.

use std::sync::LazyLock;

use regex::Regex;

static RE_UNIX_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:/[\w.\-]+){2,}").unwrap());

static RE_WINDOWS_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]:\\[^\s'\x22]+").unwrap());

static RE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9]{20,}").unwrap());

static RE_IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b").unwrap());

/// Replaces secret-shaped substrings with bracketed placeholders.
///
/// Paths are scrubbed before tokens so a long path segment is reported as
/// `[PATH]` rather than `[REDACTED]`.
pub fn scrub(message: &str) -> String {
    let scrubbed = RE_UNIX_PATH.replace_all(message, "[PATH]");
    let scrubbed = RE_WINDOWS_PATH.replace_all(&scrubbed, "[PATH]");
    let scrubbed = RE_TOKEN.replace_all(&scrubbed, "[REDACTED]");
    let scrubbed = RE_IPV4.replace_all(&scrubbed, "[IP]");
    scrubbed.into_owned()
}
