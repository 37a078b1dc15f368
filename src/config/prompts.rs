//! Prompt templates for the conversational pipeline.
//!
//! Prompts can be customized by placing a `rag.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
}

/// Prompts for query rewriting and answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// System instruction for turning a follow-up into a standalone question.
    pub contextualize: String,
    /// System instruction for answering from retrieved context. Uses `{{context}}`.
    pub answer: String,
    /// Reply used when retrieval comes back empty.
    pub not_found: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            contextualize: r#"Given a chat history and the latest user question which might reference context in the chat history,
formulate a standalone question which can be understood without the chat history.
Do NOT answer the question, just reformulate it if needed and otherwise return it as is."#
                .to_string(),

            answer: r#"You are an AI assistant specialised in Pickleball and the DUPR rating system.
Use the information in the "Context" section below to answer the user's question accurately, in detail and in a friendly tone.
If the Context does not contain enough information to answer, say politely that you could not find specific information about it. Do not make anything up.

Context:
{{context}}"#
                .to_string(),

            not_found: "Sorry, I couldn't find any specific information about that in the DUPR knowledge base.".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, applying overrides from a custom directory when present.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.rag.answer.contains("{{context}}"));
        assert!(prompts.rag.contextualize.contains("standalone question"));
        assert!(!prompts.rag.not_found.is_empty());
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_custom_dir_overrides_rag_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("rag.toml"),
            "not_found = \"Nothing here.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str()).unwrap();
        assert_eq!(prompts.rag.not_found, "Nothing here.");
        // Unspecified keys fall back to defaults
        assert!(prompts.rag.answer.contains("{{context}}"));
    }
}
