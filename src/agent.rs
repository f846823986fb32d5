use crate::config::prompt::PromptConfig;
use crate::history::{ ConversationStore, LoadError };
use crate::llm::{ GatewayError, ModelGateway };
use crate::models::chat::Conversation;
use crate::session::{ Session, SessionError };

use log::{ info, warn, error };
use std::path::{ Path, PathBuf };
use std::sync::Arc;
use thiserror::Error;

/// Failure of one user action. Caught by the front-end; never fatal.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Blank input. Carries the in-character line to show instead.
    #[error("{0}")]
    Validation(String),
    #[error("There is no active conversation")]
    NoActiveConversation,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl From<SessionError> for ChatError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NoActiveConversation => ChatError::NoActiveConversation,
        }
    }
}

/// Drives exchanges against a single session.
///
/// Every exchange takes `&mut self`, so only one can be in flight at a time.
pub struct ForgeAgent {
    gateway: Arc<dyn ModelGateway>,
    session: Session,
    store: ConversationStore,
    prompts: Arc<PromptConfig>,
}

impl ForgeAgent {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        store: ConversationStore,
        prompts: Arc<PromptConfig>
    ) -> Self {
        Self {
            gateway,
            session: Session::new(prompts.clone()),
            store,
            prompts,
        }
    }

    pub fn prompts(&self) -> &PromptConfig {
        &self.prompts
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn current(&self) -> Option<&Conversation> {
        self.session.current()
    }

    fn validate<'a>(&self, text: &'a str) -> Result<&'a str, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::Validation(self.prompts.empty_input_nudge.clone()));
        }
        Ok(text)
    }

    /// Opens a new conversation with a top-level question.
    pub async fn ask(&mut self, question: &str) -> Result<&Conversation, ChatError> {
        let question = self.validate(question)?;
        let prompt = self.prompts.opening_prompt(question);

        let answer = match self.gateway.generate(&prompt).await {
            Ok(generation) => generation.into_text(),
            Err(e) => {
                error!("LLM interaction error: {}", e);
                return Err(e.into());
            }
        };

        self.session.start(question, &answer);
        self.persist();
        info!("Started a new conversation");
        self.session.current().ok_or(ChatError::NoActiveConversation)
    }

    /// Sends a follow-up against the active conversation. On gateway failure
    /// the user turn is dropped again and nothing is saved.
    pub async fn reply(&mut self, text: &str) -> Result<&str, ChatError> {
        let text = self.validate(text)?;
        let mark = self.session.checkpoint().ok_or(ChatError::NoActiveConversation)?;

        self.session.append_user(text)?;
        let prompt = self.session
            .build_prompt_from_history()
            .ok_or(ChatError::NoActiveConversation)?;

        let answer = match self.gateway.generate(&prompt).await {
            Ok(generation) => generation.into_text(),
            Err(e) => {
                error!("LLM interaction error: {}", e);
                self.session.rollback(mark);
                return Err(e.into());
            }
        };

        self.session.append_assistant(&answer)?;
        self.persist();
        self.session
            .current()
            .and_then(Conversation::last_assistant)
            .ok_or(ChatError::NoActiveConversation)
    }

    /// Explicit save. `Ok(None)` means the write failed and was logged.
    pub fn save_active(&self) -> Result<Option<PathBuf>, ChatError> {
        let conversation = self.session.current().ok_or(ChatError::NoActiveConversation)?;
        Ok(self.store.save(conversation))
    }

    /// Makes a stored conversation active. A failed load changes nothing.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&Conversation, ChatError> {
        let conversation = self.store.load(path.as_ref())?;
        info!("Loaded {} turns from {}", conversation.len(), path.as_ref().display());
        Ok(self.session.replace(conversation))
    }

    fn persist(&self) {
        if let Some(conversation) = self.session.current() {
            if self.store.save(conversation).is_none() {
                warn!("Conversation kept in memory only");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Generation;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl ModelGateway for Echo {
        async fn generate(&self, prompt: &str) -> Result<Generation, GatewayError> {
            Ok(Generation { text: None, raw: format!("raw:{}", prompt.len()) })
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    fn agent(dir: &Path) -> ForgeAgent {
        ForgeAgent::new(
            Arc::new(Echo),
            ConversationStore::new(dir),
            Arc::new(PromptConfig::default())
        )
    }

    #[tokio::test]
    async fn reply_without_conversation_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent(dir.path());
        assert!(matches!(agent.reply("oi").await, Err(ChatError::NoActiveConversation)));
        assert!(matches!(agent.save_active(), Err(ChatError::NoActiveConversation)));
    }

    #[tokio::test]
    async fn missing_text_field_falls_back_to_raw() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent(dir.path());
        let convo = agent.ask("Quem é você?").await.unwrap();
        assert!(convo.last_assistant().unwrap().starts_with("raw:"));
    }

    #[tokio::test]
    async fn blank_question_returns_nudge() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent(dir.path());
        match agent.ask(" \t ").await {
            Err(ChatError::Validation(msg)) =>
                assert_eq!(msg, PromptConfig::default().empty_input_nudge),
            other => panic!("expected validation error, got {:?}", other.map(|c| c.len())),
        }
    }
}
