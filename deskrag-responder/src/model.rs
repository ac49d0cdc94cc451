//! Language-model capability behind the responder: one trait, two
//! implementations. The static one is the permanent fallback; the OpenAI one
//! is optional and fails over to the static phrasing on any error.

use deskrag_shared::ServiceConfig;
use serde::Deserialize;
use std::time::Duration;

const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Mode for answer phrasing: static canned text or a live external API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LlmMode {
    #[default]
    Static,
    OpenAi,
}

impl LlmMode {
    /// Resolves the mode from config. "openai" requires an API key in the
    /// environment; anything else (or a missing key) means static.
    pub fn from_config(config: &ServiceConfig) -> Self {
        if config.llm_mode == "openai" && std::env::var(ENV_OPENAI_API_KEY).is_ok() {
            LlmMode::OpenAi
        } else {
            LlmMode::Static
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmMode::Static => "static",
            LlmMode::OpenAi => "openai",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LanguageModelError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed completion response")]
    MalformedResponse,
    #[error("api key not configured")]
    MissingApiKey,
}

/// Pluggable phrasing capability. The combiner/validator never depends on
/// which implementation is active.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Phrases an answer to `question`, optionally grounded in a context
    /// sentence from the knowledge table.
    async fn answer(
        &self,
        question: &str,
        context: Option<&str>,
    ) -> Result<String, LanguageModelError>;
}

/// Deterministic fallback phrasing, shared by the static model and the
/// failure path of the live one.
pub fn static_phrase(question: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("Based on our knowledge base: {}", context),
        None => format!(
            "Based on AI memory analysis: I understand you're asking about '{}'. While I don't \
             have specific information in our knowledge base, I can help you with general \
             guidance on this topic.",
            question
        ),
    }
}

/// Always answers with the canned phrasing. Never fails.
pub struct StaticResponder;

#[async_trait::async_trait]
impl LanguageModel for StaticResponder {
    async fn answer(
        &self,
        question: &str,
        context: Option<&str>,
    ) -> Result<String, LanguageModelError> {
        Ok(static_phrase(question, context))
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// Chat-completions backed phrasing. Errors here are recovered by the caller
/// with [`static_phrase`]; they never reach the HTTP client.
pub struct OpenAiResponder {
    client: reqwest::Client,
    api_url: String,
    model: String,
}

impl OpenAiResponder {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.openai_api_url.clone(),
            model: config.openai_model.clone(),
        }
    }
}

#[async_trait::async_trait]
impl LanguageModel for OpenAiResponder {
    async fn answer(
        &self,
        question: &str,
        context: Option<&str>,
    ) -> Result<String, LanguageModelError> {
        let api_key =
            std::env::var(ENV_OPENAI_API_KEY).map_err(|_| LanguageModelError::MissingApiKey)?;

        let system_prompt = "You are a support assistant backed by a manual knowledge base. \
                             Prioritize the provided context; if none is available, answer \
                             briefly and mention the limitation.";
        let user_prompt = match context {
            Some(context) => format!("Context: {}\n\nQuestion: {}", context, question),
            None => format!("Question: {}", question),
        };
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt }
            ],
            "max_tokens": 500,
            "temperature": 0.7
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatCompletionResponse>()
            .await?;

        response
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(LanguageModelError::MalformedResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_responder_phrases_context() {
        let answer = StaticResponder
            .answer("What about shipping?", Some("Standard shipping takes 3-5 business days."))
            .await
            .unwrap();
        assert_eq!(
            answer,
            "Based on our knowledge base: Standard shipping takes 3-5 business days."
        );
    }

    #[tokio::test]
    async fn static_responder_without_context_uses_memory_framing() {
        let answer = StaticResponder.answer("Do you ship to Mars?", None).await.unwrap();
        assert!(answer.starts_with("Based on AI memory analysis:"));
        assert!(answer.contains("Do you ship to Mars?"));
    }

    #[test]
    fn mode_strings_round_trip() {
        assert_eq!(LlmMode::Static.as_str(), "static");
        assert_eq!(LlmMode::OpenAi.as_str(), "openai");
    }
}
