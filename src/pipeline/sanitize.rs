//! Prompt sanitization
//!
//! Second gate: defangs instruction-like phrasing in titles before they are
//! interpolated into a model prompt. Sanitized text is for prompts only; the
//! user always sees the original spelling.

use crate::pipeline::validate::MAX_TITLE_CHARS;

/// Phrases that read as instructions to the model, matched case-insensitively.
/// Spaces inside a match are replaced with underscores so the phrase no longer
/// parses as an imperative while the title stays recognizable.
const TRIGGER_PHRASES: &[&str] = &[
    "ignore previous",
    "ignore above",
    "disregard",
    "forget everything",
    "new instructions",
    "you are now",
    "act as",
    "pretend",
    "roleplay",
    "override",
    "system:",
    "assistant:",
    "###",
    "---",
];

/// A title that has been made safe for prompt interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedTitle(String);

impl SanitizedTitle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SanitizedTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sanitizes one title for use inside a model prompt.
///
/// Order matters: trigger phrases are defused first, then the result is
/// truncated to [`MAX_TITLE_CHARS`] characters, then whitespace runs are
/// collapsed to single spaces and the ends trimmed.
pub fn sanitize_for_prompt(title: &str) -> SanitizedTitle {
    let defused = defuse_trigger_phrases(title);
    let truncated: String = defused.chars().take(MAX_TITLE_CHARS).collect();
    let collapsed = truncated.split_whitespace().collect::<Vec<_>>().join(" ");
    SanitizedTitle(collapsed)
}

fn defuse_trigger_phrases(input: &str) -> String {
    let mut defused = input.to_string();
    for phrase in TRIGGER_PHRASES {
        defused = defuse_phrase(&defused, phrase);
    }
    defused
}

/// Replaces spaces inside every case-insensitive occurrence of `phrase`,
/// leaving the original casing of the matched span intact.
///
/// Phrases are ASCII, so the byte-wise ASCII comparison is sound on UTF-8
/// input: a matched window consists of ASCII bytes and both ends land on
/// character boundaries.
fn defuse_phrase(input: &str, phrase: &str) -> String {
    let bytes = input.as_bytes();
    let needle = phrase.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < bytes.len() {
        if i + needle.len() <= bytes.len() && bytes[i..i + needle.len()].eq_ignore_ascii_case(needle)
        {
            let matched = &input[i..i + needle.len()];
            out.push_str(&matched.replace(' ', "_"));
            i += needle.len();
        } else {
            match input[i..].chars().next() {
                Some(c) => {
                    out.push(c);
                    i += c.len_utf8();
                }
                None => break,
            }
        }
    }

    out
}

/// Escapes the five HTML-significant characters.
///
/// Applied to every externally sourced string headed for the response
/// boundary; provider metadata gets no more trust than user input.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
