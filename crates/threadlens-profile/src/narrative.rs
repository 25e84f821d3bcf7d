//! Heuristic narrative: persona, traits and evidence built from the scorer.
//!
//! Used when no external reasoning engine is configured. The output has the
//! same shape as an engine result and goes through the same validator.

use std::collections::HashMap;

use threadlens_ingest::Thread;

use crate::keywords::{Category, KeywordClass};
use crate::radar::score_threads;
use crate::types::*;

/// Longest evidence excerpt, in characters.
const EXCERPT_CHARS: usize = 120;
const MAX_COMMON_TRAITS: usize = 3;
const MAX_SITUATIONAL_TRAITS: usize = 10;
const EVIDENCE_PER_TRAIT: usize = 2;

/// One-sentence summary naming the two strongest axes.
pub fn summary_sentence(radar: &RadarVector) -> String {
    let top: Vec<&str> = radar
        .ranked()
        .into_iter()
        .take(2)
        .map(|(axis, _)| axis.label())
        .collect();
    format!(
        "This question log shows a relatively strong tendency toward {} and {}. \
         It visualizes tendencies and is not an evaluation.",
        top[0], top[1]
    )
}

/// Build a complete analysis from the threads alone.
///
/// Threads are expected to hold at least one question in total.
pub fn heuristic_analysis(threads: &[Thread]) -> AnalysisResult {
    let radar = score_threads(threads).radar;
    let ranked = radar.ranked();

    let mut chosen: Vec<Axis> = ranked
        .iter()
        .filter(|(_, score)| *score > 0.0)
        .take(MAX_COMMON_TRAITS)
        .map(|(axis, _)| *axis)
        .collect();
    for (axis, _) in &ranked {
        if chosen.len() >= 2 {
            break;
        }
        if !chosen.contains(axis) {
            chosen.push(*axis);
        }
    }

    let common_traits = chosen
        .iter()
        .map(|&axis| CommonTrait {
            title: axis.label().to_string(),
            description: format!(
                "{} ({} signal, {:.2}).",
                axis_description(axis),
                strength(radar.get(axis)),
                radar.get(axis)
            ),
            evidence: axis_evidence(axis, threads),
        })
        .collect();

    let situational_traits = threads
        .iter()
        .filter(|t| !t.is_empty())
        .take(MAX_SITUATIONAL_TRAITS)
        .map(situational_trait)
        .collect();

    let resume_phrases = ranked
        .iter()
        .take(2)
        .map(|(axis, _)| resume_phrase(*axis).to_string())
        .collect();

    AnalysisResult {
        persona_summary: summary_sentence(&radar),
        common_traits,
        situational_traits,
        radar_llm: radar,
        radar_heuristic: Some(radar),
        resume_phrases,
        disclaimer: DISCLAIMER.to_string(),
    }
}

fn situational_trait(thread: &Thread) -> SituationalTrait {
    let local = score_threads(std::slice::from_ref(thread)).radar;
    let traits = local
        .ranked()
        .into_iter()
        .take(2)
        .map(|(axis, _)| axis.label().to_string())
        .collect();

    let mut evidence: Vec<QuestionExcerpt> = thread
        .questions()
        .iter()
        .filter(|q| crate::keywords::matches_any_class(q))
        .take(EVIDENCE_PER_TRAIT)
        .map(|q| QuestionExcerpt {
            question: excerpt(q),
        })
        .collect();
    if evidence.is_empty() {
        evidence.extend(thread.questions().first().map(|q| QuestionExcerpt {
            question: excerpt(q),
        }));
    }

    SituationalTrait {
        thread_id: thread.thread_id().to_string(),
        theme: thread_theme(thread),
        traits,
        evidence,
    }
}

/// Theme of the category most questions in the thread fall into.
fn thread_theme(thread: &Thread) -> String {
    let mut counts: HashMap<Category, usize> = HashMap::new();
    for q in thread.questions() {
        let lower = q.to_lowercase();
        for category in Category::ALL {
            if category.class().matches_lowercase(&lower) {
                *counts.entry(category).or_insert(0) += 1;
            }
        }
    }

    // Category::ALL order breaks ties.
    Category::ALL
        .iter()
        .filter_map(|c| counts.get(c).map(|n| (*c, *n)))
        .fold(None, |best: Option<(Category, usize)>, (c, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((c, n)),
        })
        .map(|(c, _)| c.theme().to_string())
        .unwrap_or_else(|| "General questions".to_string())
}

fn axis_matches(axis: Axis, lower: &str) -> bool {
    match axis {
        Axis::Continuity => false,
        Axis::Exploration => {
            KeywordClass::Why.matches_lowercase(lower) || KeywordClass::Next.matches_lowercase(lower)
        }
        Axis::Breadth => Category::ALL
            .iter()
            .any(|c| c.class().matches_lowercase(lower)),
        Axis::Implementation => KeywordClass::Implementation.matches_lowercase(lower),
        Axis::Practicality => KeywordClass::Operational.matches_lowercase(lower),
        Axis::Learning => KeywordClass::Learning.matches_lowercase(lower),
    }
}

/// Questions supporting `axis`, falling back to the opening questions of the
/// longest thread.
fn axis_evidence(axis: Axis, threads: &[Thread]) -> Vec<Evidence> {
    let mut evidence: Vec<Evidence> = threads
        .iter()
        .flat_map(|t| t.pairs())
        .filter(|(_, q)| axis_matches(axis, &q.to_lowercase()))
        .take(EVIDENCE_PER_TRAIT)
        .map(|(thread_id, q)| Evidence {
            thread_id: thread_id.to_string(),
            question: excerpt(q),
        })
        .collect();

    if evidence.is_empty() {
        if let Some(longest) = threads.iter().max_by_key(|t| t.len()) {
            evidence.extend(longest.pairs().take(EVIDENCE_PER_TRAIT).map(|(thread_id, q)| {
                Evidence {
                    thread_id: thread_id.to_string(),
                    question: excerpt(q),
                }
            }));
        }
    }
    evidence
}

fn excerpt(question: &str) -> String {
    if question.chars().count() <= EXCERPT_CHARS {
        return question.to_string();
    }
    let mut cut: String = question.chars().take(EXCERPT_CHARS).collect();
    cut.push('…');
    cut
}

fn strength(score: f64) -> &'static str {
    if score >= 0.7 {
        "strong"
    } else if score >= 0.4 {
        "moderate"
    } else {
        "light"
    }
}

fn axis_description(axis: Axis) -> &'static str {
    match axis {
        Axis::Continuity => {
            "Stays with one problem over several follow-up questions instead of jumping between topics"
        }
        Axis::Exploration => {
            "Asks why things happen and builds each question on the previous answer"
        }
        Axis::Breadth => "Moves between modelling, code and operations topics in the same log",
        Axis::Implementation => "Brings concrete errors, builds and code into the questions",
        Axis::Practicality => "Keeps deployment, cost and production constraints in view",
        Axis::Learning => "Asks for definitions and differences to understand concepts first",
    }
}

fn resume_phrase(axis: Axis) -> &'static str {
    match axis {
        Axis::Continuity => "Works through a problem step by step until it is resolved.",
        Axis::Exploration => "Digs into root causes rather than stopping at the first working answer.",
        Axis::Breadth => "Connects modelling, implementation and operational concerns.",
        Axis::Implementation => "Grounds technical questions in concrete code and error output.",
        Axis::Practicality => "Weighs deployment and running cost alongside functionality.",
        Axis::Learning => "Builds an understanding of underlying concepts while solving tasks.",
    }
}
