use std::sync::Arc;
use thiserror::Error;

use crate::config::prompt::PromptConfig;
use crate::models::chat::{ Conversation, Role, Turn };

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("There is no active conversation")]
    NoActiveConversation,
}

/// Position in the active conversation to roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Holds at most one active conversation.
///
/// Turns are appended without checking alternation; callers are trusted to
/// push user and assistant turns in order.
#[derive(Debug)]
pub struct Session {
    active: Option<Conversation>,
    prompts: Arc<PromptConfig>,
}

impl Session {
    pub fn new(prompts: Arc<PromptConfig>) -> Self {
        Self { active: None, prompts }
    }

    pub fn start(&mut self, question: &str, answer: &str) -> &Conversation {
        self.active.insert(Conversation::seeded(question, answer))
    }

    pub fn replace(&mut self, conversation: Conversation) -> &Conversation {
        self.active.insert(conversation)
    }

    pub fn current(&self) -> Option<&Conversation> {
        self.active.as_ref()
    }

    pub fn append_user(&mut self, text: &str) -> Result<(), SessionError> {
        self.push(Turn::user(text))
    }

    pub fn append_assistant(&mut self, text: &str) -> Result<(), SessionError> {
        self.push(Turn::assistant(text))
    }

    fn push(&mut self, turn: Turn) -> Result<(), SessionError> {
        let conversation = self.active.as_mut().ok_or(SessionError::NoActiveConversation)?;
        conversation.push(turn);
        Ok(())
    }

    pub fn checkpoint(&self) -> Option<Checkpoint> {
        self.active.as_ref().map(|c| Checkpoint(c.len()))
    }

    pub fn rollback(&mut self, mark: Checkpoint) {
        if let Some(conversation) = self.active.as_mut() {
            conversation.truncate(mark.0);
        }
    }

    /// Replays the full history, one `Label: content` line per turn, then the
    /// follow-up instruction. No windowing: the prompt grows with the
    /// conversation.
    pub fn build_prompt_from_history(&self) -> Option<String> {
        let conversation = self.active.as_ref()?;
        let mut prompt = String::new();
        for turn in conversation.turns() {
            let label = match turn.role {
                Role::User => self.prompts.user_prompt_label.as_str(),
                Role::Assistant => self.prompts.persona_name.as_str(),
            };
            prompt.push_str(&format!("{}: {}\n", label, turn.content));
        }
        prompt.push_str(&self.prompts.follow_up_instruction);
        Some(prompt)
    }
}
