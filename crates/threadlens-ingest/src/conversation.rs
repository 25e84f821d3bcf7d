//! Question extraction from a full pasted conversation.
//!
//! Chat exports print a timestamp (`12:03`) or a date (`2月6日`) on the line
//! right after each user message. The line before such a marker is taken as
//! a question.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static TIME_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}$").unwrap());

static DATE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}月\d{1,2}日$").unwrap());

/// Extract questions from a conversation dump.
///
/// Only the first occurrence of each question is kept. A marker directly
/// after another marker is not a question, so stacked timestamps yield none.
pub fn extract_questions_from_conversation(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut questions: Vec<String> = Vec::new();

    for (i, line) in lines.iter().enumerate().skip(1) {
        if !is_marker(line) {
            continue;
        }
        let prev = lines[i - 1];
        if prev.is_empty() || is_marker(prev) {
            continue;
        }
        if !questions.iter().any(|q| q == prev) {
            questions.push(prev.to_string());
        }
    }

    debug!("Extracted {} questions from conversation", questions.len());
    questions
}

fn is_marker(line: &str) -> bool {
    TIME_LINE.is_match(line) || DATE_LINE.is_match(line)
}
