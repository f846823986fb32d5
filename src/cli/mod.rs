pub mod repl;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// Gemini API key. Read once at startup; the process refuses to start without it.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name for chat completion (e.g., gemini-2.5-flash, gemini-1.5-pro)
    #[arg(long, env = "CHAT_MODEL")] // No default here, config fills in gemini-2.5-flash
    pub chat_model: Option<String>,

    /// Base URL override for the Gemini API
    #[arg(long, env = "CHAT_BASE_URL")]
    pub chat_base_url: Option<String>,

    // --- Storage Args ---
    /// Directory where conversations are saved. Defaults to `conversations/` next to the executable.
    #[arg(long, env = "CONVERSATIONS_DIR")]
    pub conversations_dir: Option<PathBuf>,

    // --- General App Args ---
    /// Path to a JSON file overriding the persona prompt templates.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<PathBuf>,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
