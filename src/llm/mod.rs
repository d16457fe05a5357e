//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Mock）

pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{
    CompletionRequest, FunctionDefinition, LlmClient, LlmError, ModelResponse, RawToolCall,
    ResponseSchema,
};

use crate::config::AppConfig;
use crate::core::AgentError;

/// 根据配置创建 LLM 后端；API Key 从 `[llm].api_key_env` 指定的环境变量读取
pub fn create_llm_from_config(cfg: &AppConfig) -> Result<Arc<dyn LlmClient>, AgentError> {
    let provider = cfg.llm.provider.to_lowercase();
    if provider != "openai" {
        return Err(AgentError::ConfigError(format!(
            "unsupported llm provider: {}",
            cfg.llm.provider
        )));
    }

    let api_key = std::env::var(&cfg.llm.api_key_env).map_err(|_| {
        AgentError::ConfigError(format!("environment variable {} is not set", cfg.llm.api_key_env))
    })?;

    tracing::info!(
        base_url = cfg.llm.base_url.as_deref().unwrap_or("default"),
        "Using OpenAI-compatible LLM"
    );
    Ok(Arc::new(OpenAiClient::new(cfg.llm.base_url.as_deref(), &api_key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_rejected() {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = "carrier-pigeon".to_string();
        let err = create_llm_from_config(&cfg).err().unwrap();
        assert!(matches!(err, AgentError::ConfigError(msg) if msg.contains("carrier-pigeon")));
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let mut cfg = AppConfig::default();
        cfg.llm.api_key_env = "HIVE_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        let err = create_llm_from_config(&cfg).err().unwrap();
        assert!(matches!(err, AgentError::ConfigError(msg) if msg.contains("HIVE_TEST_KEY")));
    }
}
