pub mod gemini;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ AppConfig, ConfigError };
use self::gemini::GeminiGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Failed to generate a reply: {0}")]
    Request(String),
}

/// What came back from one generation call.
///
/// `text` is the provider's primary text field when it exists; `raw` is the
/// whole response rendered as a string and is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: Option<String>,
    pub raw: String,
}

impl Generation {
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self { raw: text.clone(), text: Some(text) }
    }

    /// Primary text, or the raw rendering when the field was missing.
    pub fn into_text(self) -> String {
        self.text.unwrap_or(self.raw)
    }
}

#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// One blocking round trip. No retries.
    async fn generate(&self, prompt: &str) -> Result<Generation, GatewayError>;

    fn model(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub completion_model: String,
    pub base_url: Option<String>,
}

impl From<&AppConfig> for LlmConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            completion_model: config.chat_model.clone(),
            base_url: config.chat_base_url.clone(),
        }
    }
}

pub fn new_gateway(config: &LlmConfig) -> Result<Arc<dyn ModelGateway>, ConfigError> {
    let gateway = GeminiGateway::from_config(config)?;
    Ok(Arc::new(gateway))
}
