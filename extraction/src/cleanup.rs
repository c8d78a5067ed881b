//! Best-effort removal of markdown artefacts from model-produced text.
//!
//! The model is asked for plain text but does not always comply. The rules
//! below run in order over the input; each is a plain regex substitution, so
//! the result is lossy (a literal `*` pair in prose is eaten too) and nothing
//! guarantees every marker is gone. Use it for display only.

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered `(pattern, replacement)` rules.
///
/// 1. `**bold**` → `bold`
/// 2. `*italic*` → `italic`
/// 3. `__bold__` → `bold`
/// 4. `` `code` `` → `code`
/// 5. `#`..`######` followed by whitespace → removed
/// 6. three or more newlines → exactly two
pub const CLEANUP_RULES: &[(&str, &str)] = &[
    (r"\*\*(.*?)\*\*", "$1"),
    (r"\*(.*?)\*", "$1"),
    (r"__(.*?)__", "$1"),
    (r"`(.*?)`", "$1"),
    (r"#{1,6}\s", ""),
    (r"\n{3,}", "\n\n"),
];

static COMPILED_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    CLEANUP_RULES
        .iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), *replacement))
        .collect()
});

/// Apply every rule in [`CLEANUP_RULES`] in sequence, then trim.
///
/// ```
/// use pdf_extraction::clean_text;
///
/// assert_eq!(
///     clean_text("**bold** and # heading\n\n\n\nline"),
///     "bold and heading\n\nline"
/// );
/// ```
pub fn clean_text(text: &str) -> String {
    let mut cleaned = text.to_string();
    for (regex, replacement) in COMPILED_RULES.iter() {
        cleaned = regex.replace_all(&cleaned, *replacement).into_owned();
    }
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markers_and_collapses_blank_lines() {
        assert_eq!(
            clean_text("**bold** and # heading\n\n\n\nline"),
            "bold and heading\n\nline"
        );
    }

    #[test]
    fn idempotent_on_plain_text() {
        let inputs = [
            "plain sentence",
            "  padded  ",
            "first\n\n\n\n\nsecond",
            "a\n\nb\nc",
            "",
        ];
        for input in inputs {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn handles_each_marker_kind() {
        assert_eq!(clean_text("*emphasis*"), "emphasis");
        assert_eq!(clean_text("__strong__ text"), "strong text");
        assert_eq!(clean_text("run `cargo` now"), "run cargo now");
        assert_eq!(clean_text("###### Deep heading"), "Deep heading");
    }

    #[test]
    fn heading_marker_needs_trailing_whitespace() {
        assert_eq!(clean_text("issue #42"), "issue #42");
    }

    #[test]
    fn markers_do_not_span_lines() {
        assert_eq!(clean_text("**open\nclose**"), "open\nclose");
    }

    #[test]
    fn two_newlines_are_kept() {
        assert_eq!(clean_text("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn rules_compile() {
        assert_eq!(COMPILED_RULES.len(), CLEANUP_RULES.len());
    }
}
