//! Keyword matcher over a fixed, ordered category table.
//!
//! Matching is deterministic: categories are tested in declaration order and
//! the first keyword hit wins. Category keyword sets are disjoint, so order
//! only matters for questions that mention several topics at once.

use deskrag_shared::text::normalize;
use serde::Serialize;

/// One built-in keyword pattern with its canned answer and fixed confidence.
#[derive(Debug, Clone, Copy)]
pub struct CategoryPattern {
    pub category: &'static str,
    pub keywords: &'static [&'static str],
    pub answer: &'static str,
    pub confidence: f64,
}

/// Built-in categories, highest priority first.
pub static CATEGORY_TABLE: [CategoryPattern; 4] = [
    CategoryPattern {
        category: "return_policy",
        keywords: &["return", "refund"],
        answer: "Our return policy allows returns within 30 days of purchase with original receipt.",
        confidence: 0.85,
    },
    CategoryPattern {
        category: "shipping",
        keywords: &["shipping", "delivery"],
        answer: "Standard shipping takes 3-5 business days. Express shipping is available for next-day delivery.",
        confidence: 0.90,
    },
    CategoryPattern {
        category: "warranty",
        keywords: &["warranty", "guarantee"],
        answer: "All products come with a 1-year manufacturer warranty. Extended warranties are available for purchase.",
        confidence: 0.88,
    },
    CategoryPattern {
        category: "payment",
        keywords: &["payment", "pay", "installment"],
        answer: "We accept all major credit cards, PayPal, and Apple Pay. Installment plans are available for purchases over $500.",
        confidence: 0.92,
    },
];

/// Generic-help pattern, tested after the specific categories and any
/// appended entries.
pub static HELP_PATTERN: CategoryPattern = CategoryPattern {
    category: "general_help",
    keywords: &["help", "support", "assist"],
    answer: "I can help you with information about our return policy, shipping, warranty, and payment options. What would you like to know?",
    confidence: 0.75,
};

/// Fixed message returned when no pattern matches.
pub const NO_MATCH_ANSWER: &str = "No matching information found for this question.";

/// Result of a knowledge lookup.
#[derive(Debug, Clone, Serialize)]
pub struct LookupResult {
    pub found: bool,
    pub answer: String,
    pub confidence: f64,
    pub source_type: String,
    pub category: Option<String>,
    pub entry_id: Option<String>,
}

impl LookupResult {
    pub(crate) fn matched(pattern: &CategoryPattern, entry_id: Option<String>) -> Self {
        Self {
            found: true,
            answer: pattern.answer.to_string(),
            confidence: pattern.confidence,
            source_type: "manual".to_string(),
            category: Some(pattern.category.to_string()),
            entry_id,
        }
    }

    pub(crate) fn not_found() -> Self {
        Self {
            found: false,
            answer: NO_MATCH_ANSWER.to_string(),
            confidence: 0.0,
            source_type: "low_confidence".to_string(),
            category: None,
            entry_id: None,
        }
    }
}

/// Tests whether any of `keywords` occurs in the normalized question.
pub(crate) fn keyword_hit(normalized_question: &str, keywords: &[impl AsRef<str>]) -> bool {
    keywords
        .iter()
        .any(|k| normalized_question.contains(k.as_ref()))
}

/// Matches a question against the built-in patterns only (the four specific
/// categories, then the generic-help pattern). Used by the memory responder,
/// which shares the matcher shape but keeps no entry list of its own.
pub fn match_builtin(question: &str) -> Option<&'static CategoryPattern> {
    let normalized = normalize(question);
    CATEGORY_TABLE
        .iter()
        .find(|p| keyword_hit(&normalized, p.keywords))
        .or_else(|| keyword_hit(&normalized, HELP_PATTERN.keywords).then_some(&HELP_PATTERN))
}
