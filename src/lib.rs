pub mod agent;
pub mod models;
pub mod config;
pub mod llm;
pub mod cli;
pub mod history;
pub mod session;

use agent::ForgeAgent;
use cli::Args;
use config::AppConfig;
use history::ConversationStore;
use llm::{ new_gateway, LlmConfig };
use log::info;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::from_args(&args)?;

    info!("--- Core Configuration ---");
    info!("Chat Model: {}", config.chat_model);
    info!("Chat Base URL: {}", config.chat_base_url.as_deref().unwrap_or("adapter default"));
    info!("Conversations Dir: {}", config.conversations_dir.display());
    info!("Persona: {}", config.prompts.persona_name);
    info!("-------------------------");

    let gateway = new_gateway(&LlmConfig::from(&config))?;
    info!("Model client ready: {}", gateway.model());

    let store = ConversationStore::new(config.conversations_dir.clone());
    let agent = ForgeAgent::new(gateway, store, config.prompts.clone());
    cli::repl::run_repl(agent).await
}
