use async_trait::async_trait;
use log::{ debug, info };

use super::{ Generation, GatewayError, LlmConfig, ModelGateway };
use crate::config::ConfigError;
use rllm::chat::{ ChatMessage, ChatRole, MessageType };
use rllm::builder::{ LLMBackend, LLMBuilder };
use rllm::LLMProvider;

pub struct GeminiGateway {
    llm: Box<dyn LLMProvider + Send + Sync>,
    model: String,
    base_url: Option<String>,
}

impl GeminiGateway {
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<String>
    ) -> Result<Self, ConfigError> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }

        let mut builder = LLMBuilder::new()
            .backend(LLMBackend::Google)
            .api_key(api_key)
            .model(&model)
            .stream(false);

        if let Some(url) = &base_url {
            builder = builder.base_url(url);
        }

        let llm = builder.build().map_err(|e| ConfigError::ClientInit(e.to_string()))?;

        Ok(Self { llm, model, base_url })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        Self::new(config.api_key.clone(), config.completion_model.clone(), config.base_url.clone())
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn generate(&self, prompt: &str) -> Result<Generation, GatewayError> {
        let messages = vec![ChatMessage {
            role: ChatRole::User,
            content: prompt.to_string(),
            message_type: MessageType::Text,
        }];
        info!("GeminiGateway::generate() → model={} base_url={:?}", self.model, self.base_url);
        debug!("Prompt is {} chars", prompt.chars().count());

        let resp = self.llm
            .chat(&messages).await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Ok(Generation {
            text: resp.text().map(|s| s.to_string()),
            raw: resp.to_string(),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_fails_before_building_client() {
        let result = GeminiGateway::new(" ".to_string(), "gemini-2.5-flash".to_string(), None);
        assert!(matches!(result, Err(ConfigError::MissingCredential)));
    }
}
