//! Answer composition for the memory service: independent keyword match,
//! model phrasing, fixed confidence tiers.

use crate::model::{static_phrase, LanguageModel, LlmMode, OpenAiResponder, StaticResponder};
use deskrag_knowledge::match_builtin;
use deskrag_shared::ServiceConfig;
use serde::Serialize;
use std::sync::Arc;

/// Confidence when the question matched the knowledge table.
const CONTEXT_CONFIDENCE: f64 = 0.7;
/// Confidence when only the AI-memory framing is available.
const MEMORY_ONLY_CONFIDENCE: f64 = 0.4;

/// Per-request answer from the memory-augmented responder. Not stored.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryAnswer {
    pub answer: String,
    pub confidence: f64,
    pub used_context: bool,
    pub source: String,
    pub context_found: bool,
    pub model_mode: &'static str,
}

/// Owns the active language model; one instance per service process.
pub struct MemoryResponder {
    model: Arc<dyn LanguageModel>,
    mode: LlmMode,
}

impl MemoryResponder {
    /// Builds the responder from config, selecting the model implementation
    /// at startup.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let mode = LlmMode::from_config(config);
        let model: Arc<dyn LanguageModel> = match mode {
            LlmMode::Static => Arc::new(StaticResponder),
            LlmMode::OpenAi => Arc::new(OpenAiResponder::new(config)),
        };
        Self { model, mode }
    }

    /// Test seam: inject a specific model implementation.
    pub fn with_model(model: Arc<dyn LanguageModel>, mode: LlmMode) -> Self {
        Self { model, mode }
    }

    pub fn mode(&self) -> LlmMode {
        self.mode
    }

    /// Answers a question. A knowledge-table hit becomes the context for the
    /// model phrasing; a model failure is recovered locally with the static
    /// phrasing and never surfaced as an error.
    pub async fn respond(&self, question: &str) -> MemoryAnswer {
        let context = match_builtin(question).map(|p| p.answer);

        let answer = match self.model.answer(question, context).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "language model failed, using static fallback");
                static_phrase(question, context)
            }
        };

        let context_found = context.is_some();
        MemoryAnswer {
            answer,
            confidence: if context_found {
                CONTEXT_CONFIDENCE
            } else {
                MEMORY_ONLY_CONFIDENCE
            },
            used_context: context_found,
            source: "ai_memory".to_string(),
            context_found,
            model_mode: self.mode.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LanguageModelError;

    struct FailingModel;

    #[async_trait::async_trait]
    impl LanguageModel for FailingModel {
        async fn answer(
            &self,
            _question: &str,
            _context: Option<&str>,
        ) -> Result<String, LanguageModelError> {
            Err(LanguageModelError::MissingApiKey)
        }
    }

    fn static_responder() -> MemoryResponder {
        MemoryResponder::with_model(Arc::new(StaticResponder), LlmMode::Static)
    }

    #[tokio::test]
    async fn matched_question_uses_context_at_fixed_confidence() {
        let responder = static_responder();
        let result = responder.respond("How long does shipping take?").await;
        assert!(result.used_context);
        assert_eq!(result.confidence, 0.7);
        assert_eq!(result.source, "ai_memory");
        assert!(result.answer.contains("3-5 business days"));
    }

    #[tokio::test]
    async fn unmatched_question_falls_back_to_memory_framing() {
        let responder = static_responder();
        let result = responder.respond("Tell me a joke").await;
        assert!(!result.used_context);
        assert_eq!(result.confidence, 0.4);
        assert!(result.answer.starts_with("Based on AI memory analysis:"));
    }

    #[tokio::test]
    async fn model_failure_is_recovered_with_static_phrasing() {
        let responder = MemoryResponder::with_model(Arc::new(FailingModel), LlmMode::OpenAi);
        let result = responder.respond("What is the return policy?").await;
        assert!(result.used_context);
        assert_eq!(result.confidence, 0.7);
        assert!(result.answer.starts_with("Based on our knowledge base:"));
        assert!(result.answer.contains("30 days"));
    }

    #[tokio::test]
    async fn responder_confidence_differs_from_knowledge_service() {
        // The lookup service reports 0.85 for return questions; the memory
        // responder always reports its own tier.
        let responder = static_responder();
        let result = responder.respond("Can I return this?").await;
        assert_eq!(result.confidence, 0.7);
    }
}
