//! JSON schema of the analysis document requested from external engines.

use serde_json::{json, Value};

pub const SCHEMA_NAME: &str = "candidate_profile_v1";

fn radar_axis() -> Value {
    json!({"type": "number", "minimum": 0, "maximum": 1})
}

/// Schema body (without the `name` wrapper).
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "persona_summary": {
                "type": "string",
                "description": "Two to four sentences describing the person across all threads, phrased as tendencies rather than judgments."
            },
            "common_traits": {
                "type": "array",
                "description": "Behavioral traits shared across threads. Each cites at least one question.",
                "minItems": 2,
                "maxItems": 5,
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["title", "description", "evidence"],
                    "properties": {
                        "title": {"type": "string"},
                        "description": {"type": "string"},
                        "evidence": {
                            "type": "array",
                            "description": "Short verbatim quotes of the supporting questions.",
                            "minItems": 1,
                            "maxItems": 4,
                            "items": {
                                "type": "object",
                                "additionalProperties": false,
                                "required": ["threadId", "question"],
                                "properties": {
                                    "threadId": {"type": "string"},
                                    "question": {"type": "string"}
                                }
                            }
                        }
                    }
                }
            },
            "situational_traits": {
                "type": "array",
                "description": "Traits that show up strongly in one thread, about one entry per thread.",
                "minItems": 1,
                "maxItems": 10,
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["threadId", "theme", "traits", "evidence"],
                    "properties": {
                        "threadId": {"type": "string"},
                        "theme": {"type": "string"},
                        "traits": {
                            "type": "array",
                            "minItems": 1,
                            "maxItems": 4,
                            "items": {"type": "string"}
                        },
                        "evidence": {
                            "type": "array",
                            "minItems": 1,
                            "maxItems": 3,
                            "items": {
                                "type": "object",
                                "additionalProperties": false,
                                "required": ["question"],
                                "properties": {"question": {"type": "string"}}
                            }
                        }
                    }
                }
            },
            "radar_llm": {
                "type": "object",
                "description": "Tendency strength per axis in [0, 1]. Use 0.5 for an axis that cannot be estimated.",
                "additionalProperties": false,
                "required": ["continuity", "exploration", "breadth", "implementation", "practicality", "learning"],
                "properties": {
                    "continuity": radar_axis(),
                    "exploration": radar_axis(),
                    "breadth": radar_axis(),
                    "implementation": radar_axis(),
                    "practicality": radar_axis(),
                    "learning": radar_axis()
                }
            },
            "resume_phrases": {
                "type": "array",
                "description": "Short sentences the person could reuse in an application, faithful to the log.",
                "minItems": 1,
                "maxItems": 3,
                "items": {"type": "string"}
            },
            "disclaimer": {
                "type": "string",
                "description": "A note that this describes tendencies and is not an evaluation."
            }
        },
        "required": [
            "persona_summary",
            "common_traits",
            "situational_traits",
            "radar_llm",
            "resume_phrases",
            "disclaimer"
        ]
    })
}
