use serde::{ Deserialize, Serialize };
use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::info;
use thiserror::Error;

const QUESTION_PLACEHOLDER: &str = "{question}";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt file IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Prompt JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Prompt template '{0}' is missing the {{question}} placeholder")]
    MissingPlaceholder(&'static str),
}

/// Persona wording. Everything the model or the user reads that is not
/// conversation content lives here, so the persona can be swapped by file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PromptConfig {
    pub persona_name: String,
    /// Label for user turns when rendering for the user.
    pub user_display_label: String,
    /// Label for user turns when replaying history to the model.
    pub user_prompt_label: String,
    pub opening_template: String,
    pub follow_up_instruction: String,
    pub empty_input_nudge: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            persona_name: "Shibori".to_string(),
            user_display_label: "Você".to_string(),
            user_prompt_label: "Usuário".to_string(),
            opening_template: "Você é um lendário ferreiro mágico medieval chamado Shibori, um homem de poucas palavras, mas muito conhecimento e uma pessoa entra em sua forja, você pergunta qual é o nome dessa pessoa e o que ela quer de você, essa pessoa diz: {question}. Responda de forma sábia, misteriosa e com um toque de humor antigo.".to_string(),
            follow_up_instruction: "Responda como Shibori, mantendo o tom sábio, misterioso e com humor antigo.".to_string(),
            empty_input_nudge: "Você entra na forja ancestral e encontra o lendário ferreiro mágico, ele te olha nos olhos e pergunta: Quem é você e o que deseja de mim?".to_string(),
        }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if !self.opening_template.contains(QUESTION_PLACEHOLDER) {
            return Err(PromptError::MissingPlaceholder("opening_template"));
        }
        Ok(())
    }

    pub fn opening_prompt(&self, question: &str) -> String {
        self.opening_template.replace(QUESTION_PLACEHOLDER, question)
    }
}

/// Reads a prompts file. Fields absent from the file keep their defaults.
pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<Arc<PromptConfig>, PromptError> {
    let file_content = fs::read_to_string(path.as_ref())?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    config.validate()?;
    info!("Loaded prompt templates from {}", path.as_ref().display());
    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn opening_prompt_substitutes_question() {
        let config = PromptConfig {
            opening_template: "Stranger says: {question}.".to_string(),
            ..PromptConfig::default()
        };
        assert_eq!(config.opening_prompt("hello"), "Stranger says: hello.");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"persona_name": "Hephaestus"}}"#).unwrap();

        let config = load_prompts(&path).unwrap();
        assert_eq!(config.persona_name, "Hephaestus");
        assert_eq!(config.user_display_label, "Você");
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.json");
        fs::write(&path, r#"{"opening_template": "no slot here"}"#).unwrap();

        let err = load_prompts(&path).unwrap_err();
        assert!(matches!(err, PromptError::MissingPlaceholder("opening_template")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_prompts(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PromptError::IoError(_)));
    }
}
