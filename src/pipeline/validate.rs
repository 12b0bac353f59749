//! Title validation
//!
//! First gate of the pipeline: rejects malformed or hostile titles before
//! anything downstream (prompt assembly, provider lookups) ever sees them.
//! Pure functions, no side effects.

/// Maximum accepted length for a single movie title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Markup and script fragments a movie title has no business containing.
/// Matched case-insensitively.
const SUSPICIOUS_FRAGMENTS: &[&str] = &[
    "<script",
    "javascript:",
    "onerror=",
    "onload=",
    "onclick=",
    "onmouseover=",
    "<iframe",
    "<object",
    "<embed",
    "data:text/html",
];

/// Punctuation accepted in titles beyond Unicode letters, digits and whitespace.
const ALLOWED_PUNCTUATION: &[char] = &['-', '.', ',', '\'', ':', '!', '?', '&', '(', ')'];

/// Which partner's list a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partner {
    A,
    B,
}

impl std::fmt::Display for Partner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Partner::A => write!(f, "Partner A"),
            Partner::B => write!(f, "Partner B"),
        }
    }
}

/// Why a submitted title or list was rejected. Messages are surfaced to the
/// user verbatim.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("Movie title is too long ({MAX_TITLE_CHARS} characters max)")]
    TooLong,

    #[error("Movie title contains disallowed markup")]
    SuspiciousContent,

    #[error("Movie title contains unsupported characters")]
    InvalidCharacters,

    #[error("{partner} must list at least one movie")]
    TooFew { partner: Partner },
}

/// Validates a single raw title.
///
/// Empty and whitespace-only input is valid: empty form slots are filtered
/// out upstream, they are not errors.
pub fn validate_title(title: &str) -> Result<(), ValidationFailure> {
    if title.trim().is_empty() {
        return Ok(());
    }

    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationFailure::TooLong);
    }

    let lowered = title.to_lowercase();
    if SUSPICIOUS_FRAGMENTS
        .iter()
        .any(|fragment| lowered.contains(fragment))
    {
        return Err(ValidationFailure::SuspiciousContent);
    }

    let allowed = |c: char| c.is_alphanumeric() || c.is_whitespace() || ALLOWED_PUNCTUATION.contains(&c);
    if !title.chars().all(allowed) {
        return Err(ValidationFailure::InvalidCharacters);
    }

    Ok(())
}

/// Validates both partners' lists as one submission.
///
/// Scans partner A's titles left to right, then partner B's, and returns the
/// first per-title failure. Afterwards fails with `TooFew` when a side has no
/// non-empty entries left (A checked before B).
pub fn validate_pair(partner_a: &[String], partner_b: &[String]) -> Result<(), ValidationFailure> {
    for title in partner_a.iter().chain(partner_b.iter()) {
        validate_title(title)?;
    }

    if count_non_empty(partner_a) == 0 {
        return Err(ValidationFailure::TooFew {
            partner: Partner::A,
        });
    }
    if count_non_empty(partner_b) == 0 {
        return Err(ValidationFailure::TooFew {
            partner: Partner::B,
        });
    }

    Ok(())
}

fn count_non_empty(titles: &[String]) -> usize {
    titles.iter().filter(|t| !t.trim().is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(titles: &[&str]) -> Vec<String> {
        titles.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_plain_titles_are_valid() {
        for title in [
            "The Matrix",
            "Amelie",
            "Oceans 11",
            "What's Eating Gilbert Grape?",
            "Monsters, Inc.",
            "Fast & Furious (2009)",
            "W.",
        ] {
            assert_eq!(validate_title(title), Ok(()), "{title} should be valid");
        }
    }

    #[test]
    fn test_unicode_letters_are_valid() {
        assert_eq!(validate_title("Am\u{e9}lie"), Ok(()));
        assert_eq!(validate_title("\u{5343}\u{3068}\u{5343}\u{5c0b}\u{306e}\u{795e}\u{96a0}\u{3057}"), Ok(()));
    }

    #[test]
    fn test_empty_and_whitespace_only_are_valid() {
        assert_eq!(validate_title(""), Ok(()));
        assert_eq!(validate_title("   "), Ok(()));
        assert_eq!(validate_title("\t\n"), Ok(()));
    }

    #[test]
    fn test_too_long_rejected() {
        let title = "a".repeat(MAX_TITLE_CHARS + 1);
        assert_eq!(validate_title(&title), Err(ValidationFailure::TooLong));

        let exactly = "a".repeat(MAX_TITLE_CHARS);
        assert_eq!(validate_title(&exactly), Ok(()));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 200 two-byte characters: fine by character count.
        let title = "\u{e9}".repeat(MAX_TITLE_CHARS);
        assert_eq!(validate_title(&title), Ok(()));
    }

    #[test]
    fn test_script_tag_rejected() {
        assert_eq!(
            validate_title("<script>alert(1)</script>"),
            Err(ValidationFailure::SuspiciousContent)
        );
    }

    #[test]
    fn test_suspicious_fragments_rejected_case_insensitively() {
        for title in [
            "<SCRIPT>alert(1)</SCRIPT>",
            "click JavaScript:alert(1)",
            "x onerror=alert(1)",
            "x ONLOAD=steal()",
            "<IFrame src=x>",
            "<object data=x>",
            "<embed src=x>",
            "data:text/html,payload",
            "x onclick=evil()",
            "x onmouseover=evil()",
        ] {
            assert_eq!(
                validate_title(title),
                Err(ValidationFailure::SuspiciousContent),
                "{title} should be flagged"
            );
        }
    }

    #[test]
    fn test_invalid_characters_rejected() {
        for title in ["movie;drop", "a/b", "title<>", "50% off", "cat \u{1f431}", "a=b"] {
            assert_eq!(
                validate_title(title),
                Err(ValidationFailure::InvalidCharacters),
                "{title} should be rejected"
            );
        }
    }

    #[test]
    fn test_pair_reports_partner_a_failure_first() {
        let a = list(&["ok", &"x".repeat(201)]);
        let b = list(&["<script>alert(1)</script>"]);
        assert_eq!(validate_pair(&a, &b), Err(ValidationFailure::TooLong));
    }

    #[test]
    fn test_pair_scans_left_to_right() {
        let a = list(&["fine", "also fine"]);
        let b = list(&["a=b", &"x".repeat(201)]);
        assert_eq!(
            validate_pair(&a, &b),
            Err(ValidationFailure::InvalidCharacters)
        );
    }

    #[test]
    fn test_pair_too_few_partner_a() {
        let a = list(&["", "  "]);
        let b = list(&["The Matrix"]);
        assert_eq!(
            validate_pair(&a, &b),
            Err(ValidationFailure::TooFew {
                partner: Partner::A
            })
        );
    }

    #[test]
    fn test_pair_too_few_partner_b() {
        let a = list(&["The Matrix"]);
        let b = list(&[]);
        assert_eq!(
            validate_pair(&a, &b),
            Err(ValidationFailure::TooFew {
                partner: Partner::B
            })
        );
    }

    #[test]
    fn test_pair_title_failures_take_precedence_over_too_few() {
        // A is all-empty, but B holds an invalid title: the per-title scan
        // reports first.
        let a = list(&["", ""]);
        let b = list(&["bad;title"]);
        assert_eq!(
            validate_pair(&a, &b),
            Err(ValidationFailure::InvalidCharacters)
        );
    }

    #[test]
    fn test_pair_accepts_valid_lists() {
        let a = list(&["Heat", "Collateral", ""]);
        let b = list(&["Drive", "Ronin"]);
        assert_eq!(validate_pair(&a, &b), Ok(()));
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            ValidationFailure::TooLong.to_string(),
            "Movie title is too long (200 characters max)"
        );
        assert_eq!(
            ValidationFailure::TooFew {
                partner: Partner::A
            }
            .to_string(),
            "Partner A must list at least one movie"
        );
    }
}
