//! Memory-augmented responder: an independent keyword match over the built-in
//! category table, phrased through a pluggable language-model capability.

mod model;
mod responder;

pub use model::{
    static_phrase, LanguageModel, LanguageModelError, LlmMode, OpenAiResponder, StaticResponder,
};
pub use responder::{MemoryAnswer, MemoryResponder};
