//! Transcript normalization: raw blob → ordered list of cleaned questions.

use once_cell::sync::Lazy;
use regex::Regex;

/// Questions kept per transcript.
pub const MAX_QUESTIONS: usize = 200;

/// Leading numbering such as `12.`, `3)`, `4-`, `5:` or full-width `6：`.
static NUMBER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\s*[.)\-:：]\s*").unwrap());

/// Leading bullet: hyphen, katakana middle dot, en dash, em dash.
static BULLET_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[・\-–—]\s*").unwrap());

/// Lines containing any of these are assistant boilerplate, not questions.
const BOILERPLATE_FRAGMENTS: &[&str] = &["Claude は AI"];

/// Lines exactly equal to one of these are dropped.
const BOILERPLATE_EXACT: &[&str] = &["Claude"];

/// Normalize a transcript, keeping at most [`MAX_QUESTIONS`] questions.
pub fn normalize_transcript(text: &str) -> Vec<String> {
    normalize_transcript_with_limit(text, MAX_QUESTIONS)
}

/// Normalize a transcript, keeping at most `limit` questions.
///
/// Order is preserved and duplicates are kept. A blank transcript yields an
/// empty list.
pub fn normalize_transcript_with_limit(text: &str, limit: usize) -> Vec<String> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    text.lines()
        .filter_map(clean_line)
        .take(limit)
        .collect()
}

/// Clean one line. Returns `None` for lines that are not questions.
fn clean_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let without_number = NUMBER_PREFIX.replace(trimmed, "");
    let stripped = BULLET_PREFIX.replace(&without_number, "");
    let stripped = stripped.trim();

    if stripped.is_empty() || is_boilerplate(stripped) {
        return None;
    }
    Some(stripped.to_string())
}

fn is_boilerplate(line: &str) -> bool {
    BOILERPLATE_FRAGMENTS.iter().any(|f| line.contains(f))
        || BOILERPLATE_EXACT.iter().any(|e| line == *e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_numbering_blank_and_boilerplate() {
        let input = ["1. foo", "", "・bar", "Claude"].join("\n");
        assert_eq!(normalize_transcript(&input), vec!["foo", "bar"]);
    }

    #[test]
    fn test_numbering_forms() {
        let input = "12. alpha\n3) beta\n4- gamma\n5: delta\n6：epsilon";
        assert_eq!(
            normalize_transcript(input),
            vec!["alpha", "beta", "gamma", "delta", "epsilon"]
        );
    }

    #[test]
    fn test_bullet_forms() {
        let input = "- one\n– two\n— three\n・four";
        assert_eq!(normalize_transcript(input), vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn test_number_then_bullet() {
        assert_eq!(normalize_transcript("7. - nested"), vec!["nested"]);
    }

    #[test]
    fn test_bullet_only_line_dropped() {
        assert!(normalize_transcript("・\n-\n 3. ").is_empty());
    }

    #[test]
    fn test_blank_blob() {
        assert!(normalize_transcript("  \n\r\n\t\n").is_empty());
    }

    #[test]
    fn test_disclaimer_fragment_dropped() {
        let input = "Claude は AI のため、誤りを含む可能性があります。\nなぜ型エラーになる?";
        assert_eq!(normalize_transcript(input), vec!["なぜ型エラーになる?"]);
    }

    #[test]
    fn test_claude_inside_question_kept() {
        assert_eq!(
            normalize_transcript("Claude API の使い方"),
            vec!["Claude API の使い方"]
        );
    }

    #[test]
    fn test_crlf_and_order_and_duplicates() {
        let input = "b\r\na\rb";
        assert_eq!(normalize_transcript(input), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_truncation() {
        let input: String = (0..250).map(|i| format!("q{}\n", i)).collect();
        let questions = normalize_transcript(&input);
        assert_eq!(questions.len(), MAX_QUESTIONS);
        assert_eq!(questions[199], "q199");

        assert_eq!(normalize_transcript_with_limit(&input, 3).len(), 3);
    }

    #[test]
    fn test_bare_number_is_not_stripped_without_delimiter() {
        assert_eq!(normalize_transcript("2024 年の話"), vec!["2024 年の話"]);
    }
}
