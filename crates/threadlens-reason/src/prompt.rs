//! Prompt construction for external engines.

use serde_json::{json, Value};

use threadlens_ingest::Thread;

pub const SYSTEM_PROMPT: &str = "You are not a hiring judge. You are an analyst helping \
an applicant understand themselves. Describe the tendencies visible in their question log \
instead of ranking or grading them.";

/// Structured payload sent as the user message.
pub fn build_payload(threads: &[Thread]) -> Value {
    json!({
        "purpose": "Produce a first-stage profile that helps the applicant discover their own strengths. Do not evaluate or make pass/fail decisions.",
        "threads": threads,
        "output_style": {
            "tone": "Do not overstate. Phrase findings as tendencies that can be seen in the log.",
            "evidence": "Always attach quoted questions. Quote the original text, kept short.",
            "avoid": ["ranking", "pass/fail judgments", "comparison with others", "treating scores as absolute"]
        }
    })
}

/// User message for one request. A `schema` is inlined for
/// providers without native structured output.
pub fn user_message(threads: &[Thread], schema: Option<&Value>) -> String {
    let mut message = String::from(
        "Analyze the following question log (multiple threads) and return only JSON \
         that matches the specified schema.\n\n",
    );
    message.push_str(&build_payload(threads).to_string());
    if let Some(schema) = schema {
        message.push_str("\n\nSchema:\n");
        message.push_str(&schema.to_string());
    }
    message
}

/// Pull the JSON document out of a model reply, tolerating Markdown fences.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_carries_threads() {
        let threads = vec![Thread::from_questions("a.txt", vec!["why?".into()])];
        let payload = build_payload(&threads);
        assert_eq!(payload["threads"][0]["threadId"], "a.txt");
        assert_eq!(payload["threads"][0]["questions"][0], "why?");
    }

    #[test]
    fn test_user_message_schema_optional() {
        let threads = vec![Thread::from_questions("a.txt", vec!["q".into()])];
        assert!(!user_message(&threads, None).contains("Schema:"));
        let schema = json!({"type": "object"});
        assert!(user_message(&threads, Some(&schema)).ends_with("{\"type\":\"object\"}"));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```\n"), "{}");
    }
}
