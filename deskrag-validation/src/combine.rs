//! Confidence-based combination of the two upstream answers.

use deskrag_shared::clamp_confidence;
use serde::{Deserialize, Serialize};

/// Primary answers at or above this confidence are used verbatim.
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Small boost applied to the max confidence when both answers are merged.
pub const COMBINED_BOOST: f64 = 0.05;

/// Fixed sentence inserted between the primary and secondary texts.
pub const COMBINE_DELIMITER: &str = " Additionally, here is what our AI memory adds: ";

/// How the combined answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerSource {
    #[serde(rename = "high-confidence-primary")]
    HighConfidencePrimary,
    #[serde(rename = "combined")]
    Combined,
    #[serde(rename = "low-confidence-fallback")]
    LowConfidenceFallback,
}

/// One upstream answer with its claimed confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredAnswer {
    pub text: String,
    pub confidence: f64,
}

/// Output of [`combine_answers`]; produced per request, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedAnswer {
    pub text: String,
    pub source: AnswerSource,
    pub confidence: f64,
}

/// Applies the fixed combination rule:
/// primary at or above the threshold wins verbatim; otherwise a present
/// secondary is concatenated after the primary with a confidence boost;
/// otherwise the primary is passed through as a low-confidence fallback.
pub fn combine_answers(primary: &ScoredAnswer, secondary: Option<&ScoredAnswer>) -> CombinedAnswer {
    let primary_confidence = clamp_confidence(primary.confidence);

    if primary_confidence >= CONFIDENCE_THRESHOLD {
        return CombinedAnswer {
            text: primary.text.clone(),
            source: AnswerSource::HighConfidencePrimary,
            confidence: primary_confidence,
        };
    }

    match secondary {
        Some(secondary) => {
            let secondary_confidence = clamp_confidence(secondary.confidence);
            let confidence =
                clamp_confidence(primary_confidence.max(secondary_confidence) + COMBINED_BOOST);
            CombinedAnswer {
                text: format!("{}{}{}", primary.text, COMBINE_DELIMITER, secondary.text),
                source: AnswerSource::Combined,
                confidence,
            }
        }
        None => CombinedAnswer {
            text: primary.text.clone(),
            source: AnswerSource::LowConfidenceFallback,
            confidence: primary_confidence,
        },
    }
}
