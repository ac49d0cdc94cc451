use serde::{Deserialize, Serialize};
use std::path::Path;

/// Global service configuration. Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Application identity shown in health responses.
    pub app_name: String,
    /// HTTP port for the knowledge lookup service.
    pub knowledge_port: u16,
    /// HTTP port for the memory-augmented responder.
    pub memory_port: u16,
    /// HTTP port for the combiner/validator service.
    pub validation_port: u16,
    /// Language-model mode for the responder: "static" or "openai".
    pub llm_mode: String,
    /// Chat-completions model name used when llm_mode = "openai".
    pub openai_model: String,
    /// Chat-completions endpoint used when llm_mode = "openai".
    pub openai_api_url: String,
}

impl ServiceConfig {
    /// Load config from file and environment.
    /// Precedence: env `DESKRAG_CONFIG` path > `config/deskrag.toml` > defaults,
    /// with `DESKRAG__*` environment variables overriding everything.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("DESKRAG_CONFIG").unwrap_or_else(|_| "config/deskrag".to_string());
        let builder = config::Config::builder()
            .set_default("app_name", "deskrag")?
            .set_default("knowledge_port", 8000_i64)?
            .set_default("memory_port", 9000_i64)?
            .set_default("validation_port", 9500_i64)?
            .set_default("llm_mode", "static")?
            .set_default("openai_model", "gpt-3.5-turbo")?
            .set_default("openai_api_url", "https://api.openai.com/v1/chat/completions")?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("DESKRAG").separator("__"))
            .build()?;

        built.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_three_services() {
        let cfg = ServiceConfig::load().expect("defaults should always load");
        assert_eq!(cfg.knowledge_port, 8000);
        assert_eq!(cfg.memory_port, 9000);
        assert_eq!(cfg.validation_port, 9500);
        assert_eq!(cfg.llm_mode, "static");
    }
}
