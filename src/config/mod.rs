//! Configuration module for dupr-rag.
//!
//! Handles loading application settings (TOML file plus environment overrides)
//! and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    EmbeddingSettings, IndexSettings, LlmSettings, PromptSettings, ServerSettings, Settings,
    SourceSettings,
};
