//! Structural validation of candidate analyses.
//!
//! Every result, engine or heuristic, passes through [`validate_analysis`]
//! before a job may be marked done. Failures name the offending path.

use serde_json::{Map, Value};

use threadlens_core::{Error, Result};

use crate::types::{AnalysisResult, Axis, InputSummary};

const COMMON_TRAITS: (usize, usize) = (2, 5);
const COMMON_EVIDENCE: (usize, usize) = (1, 4);
const SITUATIONAL_TRAITS: (usize, usize) = (1, 10);
const SITUATIONAL_LABELS: (usize, usize) = (1, 4);
const SITUATIONAL_EVIDENCE: (usize, usize) = (1, 3);
const RESUME_PHRASES: (usize, usize) = (1, 3);

/// Check `candidate` against the result shape and decode it.
///
/// Thread identifiers cited as evidence must belong to `input`.
pub fn validate_analysis(candidate: &Value, input: &InputSummary) -> Result<AnalysisResult> {
    let root = as_object(candidate, "$")?;

    string_field(root, "$", "persona_summary")?;
    string_field(root, "$", "disclaimer")?;

    let common = sized_array(root, "$", "common_traits", COMMON_TRAITS)?;
    for (i, item) in common.iter().enumerate() {
        let path = format!("common_traits[{i}]");
        let obj = as_object(item, &path)?;
        string_field(obj, &path, "title")?;
        string_field(obj, &path, "description")?;
        let evidence = sized_array(obj, &path, "evidence", COMMON_EVIDENCE)?;
        for (j, ev) in evidence.iter().enumerate() {
            let ev_path = format!("{path}.evidence[{j}]");
            let ev_obj = as_object(ev, &ev_path)?;
            let thread_id = string_field(ev_obj, &ev_path, "threadId")?;
            known_thread(input, thread_id, &ev_path)?;
            string_field(ev_obj, &ev_path, "question")?;
        }
    }

    let situational = sized_array(root, "$", "situational_traits", SITUATIONAL_TRAITS)?;
    for (i, item) in situational.iter().enumerate() {
        let path = format!("situational_traits[{i}]");
        let obj = as_object(item, &path)?;
        let thread_id = string_field(obj, &path, "threadId")?;
        known_thread(input, thread_id, &path)?;
        string_field(obj, &path, "theme")?;

        let labels = sized_array(obj, &path, "traits", SITUATIONAL_LABELS)?;
        for (j, label) in labels.iter().enumerate() {
            if !label.is_string() {
                return Err(violation(format!("{path}.traits[{j}] must be a string")));
            }
        }

        let evidence = sized_array(obj, &path, "evidence", SITUATIONAL_EVIDENCE)?;
        for (j, ev) in evidence.iter().enumerate() {
            let ev_path = format!("{path}.evidence[{j}]");
            let ev_obj = as_object(ev, &ev_path)?;
            string_field(ev_obj, &ev_path, "question")?;
        }
    }

    let radar = root
        .get("radar_llm")
        .ok_or_else(|| violation("radar_llm is missing".to_string()))?;
    let radar = as_object(radar, "radar_llm")?;
    for axis in Axis::ALL {
        let value = radar
            .get(axis.key())
            .and_then(Value::as_f64)
            .ok_or_else(|| violation(format!("radar_llm.{axis} must be a number")))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(violation(format!(
                "radar_llm.{axis} = {value} is outside [0, 1]"
            )));
        }
    }

    let phrases = sized_array(root, "$", "resume_phrases", RESUME_PHRASES)?;
    for (i, phrase) in phrases.iter().enumerate() {
        if !phrase.is_string() {
            return Err(violation(format!("resume_phrases[{i}] must be a string")));
        }
    }

    serde_json::from_value(candidate.clone()).map_err(|e| violation(e.to_string()))
}

fn violation(msg: String) -> Error {
    Error::SchemaViolation(msg)
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| violation(format!("{path} must be an object")))
}

fn string_field<'a>(obj: &'a Map<String, Value>, path: &str, key: &str) -> Result<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| violation(format!("{path}.{key} must be a string")))
}

fn sized_array<'a>(
    obj: &'a Map<String, Value>,
    path: &str,
    key: &str,
    (min, max): (usize, usize),
) -> Result<&'a Vec<Value>> {
    let items = obj
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| violation(format!("{path}.{key} must be an array")))?;
    if items.len() < min || items.len() > max {
        return Err(violation(format!(
            "{path}.{key} has {} items, expected {min} to {max}",
            items.len()
        )));
    }
    Ok(items)
}

fn known_thread(input: &InputSummary, thread_id: &str, path: &str) -> Result<()> {
    if input.contains_thread(thread_id) {
        Ok(())
    } else {
        Err(violation(format!(
            "{path}.threadId {thread_id:?} is not one of the submitted threads"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> InputSummary {
        InputSummary {
            threads: vec!["a.txt".into(), "b.txt".into()],
            question_count: 5,
        }
    }

    fn valid() -> Value {
        json!({
            "persona_summary": "Steady debugger.",
            "common_traits": [
                {"title": "Continuity", "description": "Stays on one issue.",
                 "evidence": [{"threadId": "a.txt", "question": "why?"}]},
                {"title": "Practicality", "description": "Cares about deploys.",
                 "evidence": [{"threadId": "b.txt", "question": "deploy?"}]}
            ],
            "situational_traits": [
                {"threadId": "a.txt", "theme": "Debugging", "traits": ["persistent"],
                 "evidence": [{"question": "why?"}]}
            ],
            "radar_llm": {
                "continuity": 0.8, "exploration": 0.5, "breadth": 0.3,
                "implementation": 1.0, "practicality": 0.0, "learning": 0.5
            },
            "resume_phrases": ["Finishes what they start."],
            "disclaimer": "Not an evaluation."
        })
    }

    fn message(err: Error) -> String {
        match err {
            Error::SchemaViolation(msg) => msg,
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_candidate_decodes() {
        let result = validate_analysis(&valid(), &input()).unwrap();
        assert_eq!(result.common_traits.len(), 2);
        assert_eq!(result.radar_llm.implementation, 1.0);
        assert!(result.radar_heuristic.is_none());
    }

    #[test]
    fn test_missing_radar_rejected() {
        let mut candidate = valid();
        candidate.as_object_mut().unwrap().remove("radar_llm");
        let msg = message(validate_analysis(&candidate, &input()).unwrap_err());
        assert!(msg.contains("radar_llm"));
    }

    #[test]
    fn test_radar_out_of_range_rejected() {
        let mut candidate = valid();
        candidate["radar_llm"]["learning"] = json!(1.2);
        let msg = message(validate_analysis(&candidate, &input()).unwrap_err());
        assert!(msg.contains("radar_llm.learning"));

        candidate["radar_llm"]["learning"] = json!("high");
        assert!(validate_analysis(&candidate, &input()).is_err());
    }

    #[test]
    fn test_common_trait_count_bounds() {
        let mut candidate = valid();
        let one = candidate["common_traits"][0].clone();
        candidate["common_traits"] = json!([one.clone()]);
        let msg = message(validate_analysis(&candidate, &input()).unwrap_err());
        assert!(msg.contains("common_traits has 1 items"));

        candidate["common_traits"] = json!(vec![one; 6]);
        assert!(validate_analysis(&candidate, &input()).is_err());
    }

    #[test]
    fn test_unknown_thread_rejected() {
        let mut candidate = valid();
        candidate["common_traits"][0]["evidence"][0]["threadId"] = json!("c.txt");
        let msg = message(validate_analysis(&candidate, &input()).unwrap_err());
        assert!(msg.contains("c.txt"));

        let mut candidate = valid();
        candidate["situational_traits"][0]["threadId"] = json!("zzz");
        assert!(validate_analysis(&candidate, &input()).is_err());
    }

    #[test]
    fn test_evidence_limits() {
        let mut candidate = valid();
        candidate["situational_traits"][0]["evidence"] =
            json!([{"question": "1"}, {"question": "2"}, {"question": "3"}, {"question": "4"}]);
        assert!(validate_analysis(&candidate, &input()).is_err());

        let mut candidate = valid();
        candidate["common_traits"][1]["evidence"] = json!([]);
        assert!(validate_analysis(&candidate, &input()).is_err());
    }

    #[test]
    fn test_resume_phrase_limits_and_types() {
        let mut candidate = valid();
        candidate["resume_phrases"] = json!(["a", "b", "c", "d"]);
        assert!(validate_analysis(&candidate, &input()).is_err());

        candidate["resume_phrases"] = json!(["a", 2]);
        let msg = message(validate_analysis(&candidate, &input()).unwrap_err());
        assert!(msg.contains("resume_phrases[1]"));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(validate_analysis(&json!("text"), &input()).is_err());
        assert!(validate_analysis(&json!([]), &input()).is_err());
    }
}
