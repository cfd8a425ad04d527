//! Commit message normalization ahead of issue-key scanning.

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n\t]+").expect("valid regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s:/_.\-]").expect("valid regex"));

/// An issue key glued to `_`/`-` suffixes, e.g. `ABC-123_foo-bar`.
static KEY_WITH_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([A-Z]+-\d+)(?:[_-]\w+)+").expect("valid regex"));

/// Literal six-character escape some exporters leave in place of `'`.
const ESCAPED_APOSTROPHE: &str = "\\u0027";

/// Flatten a raw commit message to single-line text made of letters, digits,
/// whitespace and `:/_.-`.
pub fn clean(raw: &str) -> String {
    let message = LINE_BREAKS.replace_all(raw, " ");
    let message = WHITESPACE_RUN.replace_all(&message, " ");
    let message = message.replace('\'', "").replace(ESCAPED_APOSTROPHE, "");
    let message = DISALLOWED.replace_all(&message, "");
    message.trim().to_string()
}

/// Collapse `KEY_suffix-more` runs down to `KEY`.
pub fn preprocess(cleaned: &str) -> String {
    let collapsed = KEY_WITH_SUFFIX.replace_all(cleaned, "${1}");
    if collapsed != cleaned {
        tracing::debug!("Preprocessed '{}' to '{}'", cleaned, collapsed);
    }
    collapsed.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_collapses_line_breaks_and_spaces() {
        assert_eq!(
            clean("Fix ABC-123: null pointer\n on save"),
            "Fix ABC-123: null pointer on save"
        );
        assert_eq!(clean("a\r\n\tb     c"), "a b c");
    }

    #[test]
    fn clean_strips_apostrophes_and_escapes() {
        assert_eq!(clean("don't"), "dont");
        assert_eq!(clean("can\\u0027t stop"), "cant stop");
    }

    #[test]
    fn clean_drops_disallowed_characters() {
        assert_eq!(clean("[ABC-1] (wip) #42 feat/x_y.z"), "ABC-1 wip 42 feat/x_y.z");
        assert_eq!(clean("  padded  "), "padded");
    }

    #[test]
    fn clean_is_idempotent_on_clean_text() {
        let msg = "Merge pull request ABC-9 from feature/ABC-9_login";
        assert_eq!(clean(msg), msg);
        assert_eq!(clean(&clean(msg)), clean(msg));
    }

    #[test]
    fn preprocess_collapses_suffixes() {
        assert_eq!(preprocess("ABC-123_hotfix applied"), "ABC-123 applied");
        assert_eq!(preprocess("feature/abc-77_foo-bar done"), "feature/abc-77 done");
        assert_eq!(preprocess("ABC-123 plain"), "ABC-123 plain");
    }
}
