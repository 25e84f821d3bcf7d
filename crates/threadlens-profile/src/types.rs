//! Profile types. Field names match the JSON document stored and served.

use serde::{Deserialize, Serialize};

use threadlens_ingest::Thread;

/// Six-axis trait vector. Every axis lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarVector {
    pub continuity: f64,
    pub exploration: f64,
    pub breadth: f64,
    pub implementation: f64,
    pub practicality: f64,
    pub learning: f64,
}

impl RadarVector {
    /// Value used for an axis that cannot be scored.
    pub const NEUTRAL: f64 = 0.5;

    /// All axes at the neutral midpoint.
    pub fn neutral() -> Self {
        Self {
            continuity: Self::NEUTRAL,
            exploration: Self::NEUTRAL,
            breadth: Self::NEUTRAL,
            implementation: Self::NEUTRAL,
            practicality: Self::NEUTRAL,
            learning: Self::NEUTRAL,
        }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Continuity => self.continuity,
            Axis::Exploration => self.exploration,
            Axis::Breadth => self.breadth,
            Axis::Implementation => self.implementation,
            Axis::Practicality => self.practicality,
            Axis::Learning => self.learning,
        }
    }

    /// Axes ordered by score, strongest first. Ties keep axis order.
    pub fn ranked(&self) -> Vec<(Axis, f64)> {
        let mut items: Vec<(Axis, f64)> = Axis::ALL.iter().map(|&a| (a, self.get(a))).collect();
        items.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        items
    }

    /// Largest absolute per-axis difference to `other`.
    pub fn max_divergence(&self, other: &RadarVector) -> f64 {
        Axis::ALL
            .iter()
            .map(|&a| (self.get(a) - other.get(a)).abs())
            .fold(0.0, f64::max)
    }
}

/// Radar axis identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Continuity,
    Exploration,
    Breadth,
    Implementation,
    Practicality,
    Learning,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::Continuity,
        Axis::Exploration,
        Axis::Breadth,
        Axis::Implementation,
        Axis::Practicality,
        Axis::Learning,
    ];

    /// JSON key of the axis.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Continuity => "continuity",
            Self::Exploration => "exploration",
            Self::Breadth => "breadth",
            Self::Implementation => "implementation",
            Self::Practicality => "practicality",
            Self::Learning => "learning",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Continuity => "Problem continuity",
            Self::Exploration => "Exploration and depth",
            Self::Breadth => "Technical breadth",
            Self::Implementation => "Implementation specificity",
            Self::Practicality => "Operational realism",
            Self::Learning => "Learning orientation",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// What was submitted: thread identifiers and the total question count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSummary {
    pub threads: Vec<String>,
    #[serde(rename = "questionCount")]
    pub question_count: usize,
}

impl InputSummary {
    pub fn from_threads(threads: &[Thread]) -> Self {
        Self {
            threads: threads.iter().map(|t| t.thread_id().to_string()).collect(),
            question_count: threads.iter().map(Thread::len).sum(),
        }
    }

    pub fn contains_thread(&self, thread_id: &str) -> bool {
        self.threads.iter().any(|t| t == thread_id)
    }

    /// Display title: thread identifiers joined by a space.
    pub fn title(&self) -> String {
        self.threads.join(" ")
    }
}

/// A question quoted to justify a common trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(rename = "threadId")]
    pub thread_id: String,
    pub question: String,
}

/// A question quoted within a situational trait (the thread is implied).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionExcerpt {
    pub question: String,
}

/// Trait observed across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonTrait {
    pub title: String,
    pub description: String,
    pub evidence: Vec<Evidence>,
}

/// Trait that shows up strongly in one thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationalTrait {
    #[serde(rename = "threadId")]
    pub thread_id: String,
    pub theme: String,
    pub traits: Vec<String>,
    pub evidence: Vec<QuestionExcerpt>,
}

/// A finished analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub persona_summary: String,
    pub common_traits: Vec<CommonTrait>,
    pub situational_traits: Vec<SituationalTrait>,
    pub radar_llm: RadarVector,
    /// Deterministic scorer output kept next to the engine's radar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radar_heuristic: Option<RadarVector>,
    pub resume_phrases: Vec<String>,
    pub disclaimer: String,
}

pub const DISCLAIMER: &str = "This profile visualizes tendencies found in the question log. \
It is not an evaluation, a ranking, or a hiring judgment.";
