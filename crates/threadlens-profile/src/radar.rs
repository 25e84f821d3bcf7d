//! Heuristic radar scorer.
//!
//! Pure and deterministic: the same questions always give the same vector.
//! Every axis is clamped to `[0, 1]`.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::debug;

use threadlens_ingest::Thread;

use crate::keywords::{Category, KeywordClass};
use crate::types::RadarVector;

/// Questions per thread that count as full continuity.
const CONTINUITY_BASELINE: f64 = 3.0;
const EXPLORATION_WEIGHT: f64 = 1.5;
const IMPLEMENTATION_WEIGHT: f64 = 1.2;

/// Radar plus the counts it was computed from.
#[derive(Debug, Clone, Serialize)]
pub struct RadarScore {
    pub radar: RadarVector,
    pub breakdown: RadarBreakdown,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarBreakdown {
    pub total: usize,
    pub num_threads: usize,
    pub avg_per_thread: f64,
    pub explore_count: usize,
    pub impl_count: usize,
    pub op_count: usize,
    pub learn_count: usize,
    pub categories: Vec<Category>,
}

pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Score `(thread_id, question)` pairs.
///
/// With no questions at all every axis is neutral.
pub fn score_radar<'a, I>(pairs: I) -> RadarScore
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut threads: HashSet<&str> = HashSet::new();
    let mut categories: BTreeSet<Category> = BTreeSet::new();
    let mut b = RadarBreakdown::default();

    for (thread_id, question) in pairs {
        threads.insert(thread_id);
        b.total += 1;

        let lower = question.to_lowercase();
        if KeywordClass::Why.matches_lowercase(&lower)
            || KeywordClass::Next.matches_lowercase(&lower)
        {
            b.explore_count += 1;
        }
        if KeywordClass::Implementation.matches_lowercase(&lower) {
            b.impl_count += 1;
        }
        if KeywordClass::Operational.matches_lowercase(&lower) {
            b.op_count += 1;
        }
        if KeywordClass::Learning.matches_lowercase(&lower) {
            b.learn_count += 1;
        }
        for category in Category::ALL {
            if category.class().matches_lowercase(&lower) {
                categories.insert(category);
            }
        }
    }

    b.num_threads = threads.len();
    b.categories = categories.into_iter().collect();

    if b.total == 0 {
        return RadarScore {
            radar: RadarVector::neutral(),
            breakdown: b,
        };
    }

    let total = b.total as f64;
    b.avg_per_thread = total / b.num_threads.max(1) as f64;

    debug!(
        "Scored {} questions across {} threads ({} categories)",
        b.total,
        b.num_threads,
        b.categories.len()
    );

    let radar = RadarVector {
        continuity: clamp01(b.avg_per_thread / CONTINUITY_BASELINE),
        exploration: clamp01(b.explore_count as f64 / total * EXPLORATION_WEIGHT),
        breadth: clamp01(b.categories.len() as f64 / Category::ALL.len() as f64),
        implementation: clamp01(b.impl_count as f64 / total * IMPLEMENTATION_WEIGHT),
        practicality: clamp01(b.op_count as f64 / total),
        learning: clamp01(b.learn_count as f64 / total),
    };

    RadarScore {
        radar,
        breakdown: b,
    }
}

/// Score every question of every thread.
pub fn score_threads(threads: &[Thread]) -> RadarScore {
    score_radar(threads.iter().flat_map(|t| t.pairs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread(id: &str, questions: &[&str]) -> Thread {
        Thread::from_questions(id, questions.iter().map(|q| q.to_string()).collect())
    }

    fn in_range(r: &RadarVector) -> bool {
        crate::types::Axis::ALL
            .iter()
            .all(|&a| (0.0..=1.0).contains(&r.get(a)))
    }

    #[test]
    fn test_three_questions_full_continuity() {
        let score = score_threads(&[thread("a", &["one", "two", "three"])]);
        assert_eq!(score.radar.continuity, 1.0);
    }

    #[test]
    fn test_uneven_threads_average_three() {
        let score = score_threads(&[
            thread("a", &["1", "2", "3", "4", "5"]),
            thread("b", &["6"]),
        ]);
        assert_eq!(score.breakdown.avg_per_thread, 3.0);
        assert_eq!(score.radar.continuity, 1.0);
    }

    #[test]
    fn test_no_keywords_scores_zero() {
        let score = score_threads(&[thread(
            "a",
            &["hello there", "good morning", "see you", "thanks a lot"],
        )]);
        let r = score.radar;
        assert_eq!(r.exploration, 0.0);
        assert_eq!(r.implementation, 0.0);
        assert_eq!(r.practicality, 0.0);
        assert_eq!(r.learning, 0.0);
        assert_eq!(r.breadth, 0.0);
        assert_eq!(r.continuity, 1.0);
    }

    #[test]
    fn test_partial_continuity() {
        let score = score_threads(&[thread("a", &["x"]), thread("b", &["y"])]);
        assert!((score.radar.continuity - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_axes() {
        let score = score_threads(&[thread(
            "a",
            &[
                "なぜこのエラーが出る?",
                "hello",
                "hi",
                "ok",
            ],
        )]);
        // 1 of 4 explores, 1 of 4 is implementation
        assert!((score.radar.exploration - 0.375).abs() < 1e-9);
        assert!((score.radar.implementation - 0.3).abs() < 1e-9);
        assert_eq!(score.breakdown.categories, vec![Category::Implementation]);
        assert!((score.radar.breadth - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_adversarial_density_stays_clamped() {
        let q = "why next error build deploy cloud gpu what is difference pytorch model なぜ 次に 型 本番 とは";
        let questions: Vec<&str> = std::iter::repeat(q).take(50).collect();
        let score = score_threads(&[thread("a", &questions)]);
        assert!(in_range(&score.radar));
        assert_eq!(score.radar.exploration, 1.0);
        assert_eq!(score.radar.implementation, 1.0);
        assert_eq!(score.radar.breadth, 1.0);
        assert_eq!(score.radar.continuity, 1.0);
    }

    #[test]
    fn test_empty_input_is_neutral() {
        let score = score_radar(std::iter::empty());
        assert_eq!(score.radar, RadarVector::neutral());
    }

    #[test]
    fn test_deterministic() {
        let threads = [thread("a", &["why?", "デプロイ先は?"]), thread("b", &["型とは"])];
        let first = score_threads(&threads);
        let second = score_threads(&threads);
        assert_eq!(first.radar, second.radar);
    }

    #[test]
    fn test_breakdown_serializes_camel_case() {
        let score = score_threads(&[thread("a", &["why"])]);
        let json = serde_json::to_value(&score.breakdown).unwrap();
        assert_eq!(json["exploreCount"], 1);
        assert_eq!(json["numThreads"], 1);
    }
}
