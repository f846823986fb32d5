pub mod prompt;

use crate::cli::Args;
use log::info;
use prompt::{ PromptConfig, PromptError };
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";
const CONVERSATIONS_DIR_NAME: &str = "conversations";

/// Startup failures. None of these are recoverable; the process exits.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API_KEY is not set. Export your Gemini API key as API_KEY before starting.")]
    MissingCredential,
    #[error("Failed to initialize model client: {0}. Check that the API key is valid.")]
    ClientInit(String),
    #[error("Cannot resolve conversations directory: {0}")]
    StorageDir(#[source] std::io::Error),
    #[error("Failed to load prompts from '{path}': {source}")]
    Prompts {
        path: String,
        #[source]
        source: PromptError,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub chat_model: String,
    pub chat_base_url: Option<String>,
    pub conversations_dir: PathBuf,
    pub prompts: Arc<PromptConfig>,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let api_key = args.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingCredential)?
            .to_string();

        let chat_model = args.chat_model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

        let conversations_dir = match &args.conversations_dir {
            Some(dir) => dir.clone(),
            None => default_conversations_dir()?,
        };

        let prompts = match &args.prompts_path {
            Some(path) =>
                prompt::load_prompts(path).map_err(|source| ConfigError::Prompts {
                    path: path.display().to_string(),
                    source,
                })?,
            None => {
                info!("No prompts file given, using built-in persona");
                Arc::new(PromptConfig::default())
            }
        };

        Ok(Self {
            api_key,
            chat_model,
            chat_base_url: args.chat_base_url.clone().filter(|u| !u.trim().is_empty()),
            conversations_dir,
            prompts,
        })
    }
}

/// `conversations/` next to the running executable.
pub fn default_conversations_dir() -> Result<PathBuf, ConfigError> {
    let exe = std::env::current_exe().map_err(ConfigError::StorageDir)?;
    let base = exe
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join(CONVERSATIONS_DIR_NAME))
}
