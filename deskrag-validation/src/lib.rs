//! Pure decision logic for the combiner/validator service: the
//! confidence-based answer combination rule and the heuristic quality rubric.
//! No I/O, no state; every function is deterministic in its inputs.

mod combine;
mod validate;

pub use combine::{
    combine_answers, AnswerSource, CombinedAnswer, ScoredAnswer, COMBINED_BOOST,
    COMBINE_DELIMITER, CONFIDENCE_THRESHOLD,
};
pub use validate::{
    composite_score, score_answer, validate_answer, QualityMetrics, ValidationReport,
    CRITERION_DESCRIPTIONS, CRITERION_WEIGHTS, HIGH_QUALITY_THRESHOLD, VALIDATION_THRESHOLD,
};
