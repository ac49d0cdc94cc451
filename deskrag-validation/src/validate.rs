//! Heuristic answer-quality rubric: seven independent per-criterion rules and
//! a fixed weighted mean.

use deskrag_shared::text::{key_terms, words};
use serde::Serialize;

/// Composite scores at or above this value pass validation.
pub const VALIDATION_THRESHOLD: f64 = 0.7;

/// Composite scores at or above this value are reported as high quality.
pub const HIGH_QUALITY_THRESHOLD: f64 = 0.85;

/// Static weight table. Completeness is deliberately weighted at zero; the
/// criterion is still computed and reported, the weight table alone silences
/// its contribution.
pub const CRITERION_WEIGHTS: [(&str, f64); 7] = [
    ("relevance_score", 1.0),
    ("accuracy_score", 1.0),
    ("completeness_score", 0.0),
    ("clarity_score", 0.9),
    ("consistency_score", 1.0),
    ("factual_accuracy", 1.0),
    ("logical_coherence", 0.5),
];

/// Human-readable description of what each criterion checks, reported by the
/// metrics endpoint.
pub const CRITERION_DESCRIPTIONS: [(&str, &str); 7] = [
    ("relevance", "Answer addresses the specific question asked"),
    ("accuracy", "Information matches the expected terms for the topic"),
    ("completeness", "Answer covers all relevant aspects"),
    ("clarity", "Answer is clear and well-structured"),
    ("consistency", "Answer is internally consistent"),
    ("factual_accuracy", "Answer is free of contradicting negation phrases"),
    ("logical_coherence", "Answer flows logically"),
];

/// Expected-term lists per question topic, used by the accuracy check.
const ACCURACY_PATTERNS: [(&[&str], &[&str]); 4] = [
    (&["return", "refund"], &["30 days", "receipt", "return", "policy"]),
    (&["shipping", "delivery"], &["business days", "express", "delivery", "shipping"]),
    (&["warranty", "guarantee"], &["warranty", "manufacturer", "extended", "purchase"]),
    (&["payment", "pay"], &["credit cards", "paypal", "apple pay", "installment"]),
];

/// Term pairs that must not co-occur in a consistent answer.
const CONTRADICTION_PAIRS: [(&str, &str); 4] = [
    ("30 days", "60 days"),
    ("1-year", "lifetime"),
    ("credit cards", "cash only"),
    ("warranty", "no warranty"),
];

/// Negation phrases whose presence marks a factually suspect answer.
const NEGATION_PHRASES: [&str; 6] = [
    "no refunds",
    "no returns",
    "not covered",
    "cash only",
    "no warranty",
    "cannot be returned",
];

/// Connector words the coherence check counts.
const LOGICAL_CONNECTORS: [&str; 6] = [
    "because",
    "therefore",
    "since",
    "as a result",
    "consequently",
    "however",
];

/// Per-criterion floor and the static suggestion emitted below it.
const SUGGESTION_FLOORS: [(&str, f64, &str); 7] = [
    ("relevance_score", 0.7, "Answer could be more relevant to the specific question asked"),
    ("accuracy_score", 0.7, "Verify factual accuracy of the information provided"),
    ("completeness_score", 0.7, "Answer could cover more aspects of the question"),
    ("clarity_score", 0.7, "Consider restructuring for better clarity and readability"),
    ("consistency_score", 0.7, "Check for internal contradictions in the response"),
    ("factual_accuracy", 0.7, "Cross-reference with authoritative knowledge sources"),
    ("logical_coherence", 0.5, "Add logical connectors to improve flow and coherence"),
];

/// The seven named criterion scores, each in [0, 1].
#[derive(Debug, Clone, Serialize)]
pub struct QualityMetrics {
    pub relevance_score: f64,
    pub accuracy_score: f64,
    pub completeness_score: f64,
    pub clarity_score: f64,
    pub consistency_score: f64,
    pub factual_accuracy: f64,
    pub logical_coherence: f64,
}

impl QualityMetrics {
    fn get(&self, name: &str) -> f64 {
        match name {
            "relevance_score" => self.relevance_score,
            "accuracy_score" => self.accuracy_score,
            "completeness_score" => self.completeness_score,
            "clarity_score" => self.clarity_score,
            "consistency_score" => self.consistency_score,
            "factual_accuracy" => self.factual_accuracy,
            "logical_coherence" => self.logical_coherence,
            _ => 0.0,
        }
    }
}

/// Full validation output returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub validation_score: f64,
    pub validation_reason: String,
    pub quality_metrics: QualityMetrics,
    pub suggestions: Vec<String>,
}

fn relevance(question: &str, answer: &str) -> f64 {
    let answer_lower = answer.to_lowercase();
    let terms = key_terms(question);
    if terms.iter().any(|t| answer_lower.contains(t.as_str())) {
        return 1.0;
    }
    let question_words = words(question);
    let answer_words = words(answer);
    if question_words.is_empty() {
        return 0.0;
    }
    let shared = question_words
        .iter()
        .filter(|w| answer_words.contains(w))
        .count();
    shared as f64 / question_words.len() as f64
}

fn accuracy(question: &str, answer: &str) -> f64 {
    let question_lower = question.to_lowercase();
    let answer_lower = answer.to_lowercase();
    for (topic_keywords, expected_terms) in &ACCURACY_PATTERNS {
        if topic_keywords.iter().any(|k| question_lower.contains(k)) {
            let matched = expected_terms
                .iter()
                .filter(|t| answer_lower.contains(**t))
                .count();
            return matched as f64 / expected_terms.len() as f64;
        }
    }
    // Unknown topic: nothing to check against.
    0.7
}

fn completeness(answer: &str) -> f64 {
    (answer.len() as f64 / 100.0).min(1.0)
}

fn clarity(answer: &str) -> f64 {
    let sentences = answer
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();
    if sentences == 0 {
        return 0.5;
    }
    let word_count = answer.split_whitespace().count();
    let avg_sentence_len = word_count as f64 / sentences as f64;
    if avg_sentence_len <= 15.0 {
        0.9
    } else if avg_sentence_len <= 25.0 {
        0.7
    } else {
        0.5
    }
}

fn consistency(answer: &str) -> f64 {
    let answer_lower = answer.to_lowercase();
    for (a, b) in &CONTRADICTION_PAIRS {
        if answer_lower.contains(a) && answer_lower.contains(b) {
            return 0.3;
        }
    }
    1.0
}

fn factual_accuracy(answer: &str) -> f64 {
    let answer_lower = answer.to_lowercase();
    if NEGATION_PHRASES.iter().any(|p| answer_lower.contains(p)) {
        0.3
    } else {
        0.9
    }
}

fn logical_coherence(answer: &str) -> f64 {
    let answer_lower = answer.to_lowercase();
    let connectors = LOGICAL_CONNECTORS
        .iter()
        .filter(|c| answer_lower.contains(**c))
        .count();
    match connectors {
        0 => 0.5,
        1 => 0.7,
        _ => 0.9,
    }
}

/// Scores an answer against every criterion.
pub fn score_answer(question: &str, answer: &str) -> QualityMetrics {
    QualityMetrics {
        relevance_score: relevance(question, answer),
        accuracy_score: accuracy(question, answer),
        completeness_score: completeness(answer),
        clarity_score: clarity(answer),
        consistency_score: consistency(answer),
        factual_accuracy: factual_accuracy(answer),
        logical_coherence: logical_coherence(answer),
    }
}

/// Weighted mean of the seven criteria, normalized by the weight sum.
pub fn composite_score(metrics: &QualityMetrics) -> f64 {
    let weight_sum: f64 = CRITERION_WEIGHTS.iter().map(|(_, w)| w).sum();
    let weighted: f64 = CRITERION_WEIGHTS
        .iter()
        .map(|(name, w)| metrics.get(name) * *w)
        .sum::<f64>();
    weighted / weight_sum
}

fn suggestions_for(metrics: &QualityMetrics) -> Vec<String> {
    SUGGESTION_FLOORS
        .iter()
        .filter(|(name, floor, _)| metrics.get(name) < *floor)
        .map(|(_, _, message)| message.to_string())
        .collect()
}

/// Runs the full rubric and applies the pass/fail threshold.
pub fn validate_answer(question: &str, answer: &str) -> ValidationReport {
    let quality_metrics = score_answer(question, answer);
    let validation_score = composite_score(&quality_metrics);
    let is_valid = validation_score >= VALIDATION_THRESHOLD;
    let validation_reason = if is_valid {
        "Answer meets quality standards".to_string()
    } else {
        format!(
            "Answer quality score ({:.2}) below threshold ({})",
            validation_score, VALIDATION_THRESHOLD
        )
    };
    let suggestions = suggestions_for(&quality_metrics);
    tracing::info!(validation_score, is_valid, "validated answer");
    ValidationReport {
        is_valid,
        validation_score,
        validation_reason,
        quality_metrics,
        suggestions,
    }
}
