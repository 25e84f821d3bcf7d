//! Fixed keyword classes used by the heuristic scorer.
//!
//! Matching is case-insensitive substring search on the whole question, so
//! Japanese terms match without tokenization.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Keyword class a question can fall into. A question may hit several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordClass {
    /// Asking for reasons.
    Why,
    /// Sequencing: building on a previous answer.
    Next,
    /// Errors, builds, code.
    Implementation,
    /// Deployment, cost, infrastructure.
    Operational,
    /// Definitions, differences, understanding.
    Learning,
    /// Modelling and ML theory. Only counts toward breadth.
    Theory,
}

const WHY_WORDS: &[&str] = &["なぜ", "理由", "どうして", "why"];

const NEXT_WORDS: &[&str] = &[
    "次", "では", "踏まえ", "続いて", "その後", "次に", "さらに", "next", "after that",
];

const IMPLEMENTATION_WORDS: &[&str] = &[
    "error", "エラー", "型", "shape", "dtype", "stack trace", "コンパイル", "ビルド", "実装",
    "コード", "route.ts", "swift", "xcode", "firebase", "firestore", "compile", "build",
    "exception",
];

const OPERATIONAL_WORDS: &[&str] = &[
    "本番", "安定", "無料", "低コスト", "コスト", "運用", "デプロイ", "vercel", "cloud", "gpu",
    "ssh", "nat", "ポート", "ios", "safari", "deploy", "production", "infra",
];

const LEARNING_WORDS: &[&str] = &[
    "意味", "違い", "理解", "とは", "なに", "何", "どういう", "教えて", "what is",
    "difference", "understand", "explain",
];

const THEORY_WORDS: &[&str] = &[
    "st-gcn", "stgcn", "pytorch", "tensor", "embedding", "model", "学習", "推論", "精度",
    "accuracy", "loss", "ラベル", "前処理",
];

impl KeywordClass {
    pub fn words(&self) -> &'static [&'static str] {
        match self {
            Self::Why => WHY_WORDS,
            Self::Next => NEXT_WORDS,
            Self::Implementation => IMPLEMENTATION_WORDS,
            Self::Operational => OPERATIONAL_WORDS,
            Self::Learning => LEARNING_WORDS,
            Self::Theory => THEORY_WORDS,
        }
    }

    /// Whether the question contains any keyword of this class.
    pub fn matches(&self, question: &str) -> bool {
        let lower = question.to_lowercase();
        self.matches_lowercase(&lower)
    }

    /// Same as [`matches`](Self::matches) for an already lowercased question.
    pub fn matches_lowercase(&self, lower: &str) -> bool {
        self.words().iter().any(|w| lower.contains(w))
    }
}

/// Topic group counted by the breadth axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Theory,
    Implementation,
    Operational,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Theory,
        Category::Implementation,
        Category::Operational,
    ];

    pub fn class(&self) -> KeywordClass {
        match self {
            Self::Theory => KeywordClass::Theory,
            Self::Implementation => KeywordClass::Implementation,
            Self::Operational => KeywordClass::Operational,
        }
    }

    /// Theme shown for a thread dominated by this category.
    pub fn theme(&self) -> &'static str {
        match self {
            Self::Theory => "Modelling and ML theory",
            Self::Implementation => "Implementation and debugging",
            Self::Operational => "Deployment and operations",
        }
    }
}

/// Every keyword, lowercased, for a quick "matches anything" check.
static ALL_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    [
        KeywordClass::Why,
        KeywordClass::Next,
        KeywordClass::Implementation,
        KeywordClass::Operational,
        KeywordClass::Learning,
        KeywordClass::Theory,
    ]
    .iter()
    .flat_map(|c| c.words().iter().copied())
    .collect()
});

/// Whether the question hits any keyword class at all.
pub fn matches_any_class(question: &str) -> bool {
    let lower = question.to_lowercase();
    ALL_WORDS.iter().any(|w| lower.contains(w))
}
