//! Configuration settings for dupr-rag.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub sources: SourceSettings,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub index: IndexSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// Input record files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Club whose player summaries are indexed.
    pub club_id: String,
    /// Line-delimited JSON file with player summaries.
    pub summaries_path: String,
    /// Line-delimited JSON file with blog posts.
    pub blogs_path: String,
}

/// Default club used by the dataset scraper.
const DEFAULT_CLUB_ID: &str = "5380169465";

impl SourceSettings {
    /// Default summaries file name for a club.
    pub fn summaries_file_for(club_id: &str) -> String {
        format!("player_summaries_{}.jsonl", club_id)
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            club_id: DEFAULT_CLUB_ID.to_string(),
            summaries_path: Self::summaries_file_for(DEFAULT_CLUB_ID),
            blogs_path: "blog_posts_detail.jsonl".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model identifier.
    pub model: String,
    /// Requested output dimensions (only for models that support it).
    pub dimensions: Option<u32>,
    /// Base URL of an OpenAI-compatible embeddings API.
    pub api_base: Option<String>,
    /// Environment variable holding the embeddings API key.
    pub api_key_env: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
            api_base: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Hosted language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Chat model identifier.
    pub model: String,
    /// Base URL of an OpenAI-compatible chat completions API.
    pub api_base: String,
    /// Environment variable holding the LLM API key.
    pub api_key_env: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "llama3-8b-8192".to_string(),
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            temperature: 0.0,
        }
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Directory the index is persisted in.
    pub persist_dir: String,
    /// Number of documents retrieved when a caller does not ask for a count.
    pub default_top_k: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            persist_dir: "chroma_db_dupr".to_string(),
            default_top_k: 5,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory with a `rag.toml` overriding the built-in prompts.
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file, then apply env overrides.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::DuprError;

        if self.index.default_top_k == 0 {
            return Err(DuprError::Config("index.default_top_k must be at least 1".to_string()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(DuprError::Config("llm.model must not be empty".to_string()));
        }
        if self.embedding.model.trim().is_empty() {
            return Err(DuprError::Config("embedding.model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(DuprError::Config(format!(
                "llm.temperature must be between 0 and 2, got {}",
                self.llm.temperature
            )));
        }
        Ok(())
    }

    /// Override settings from environment variables.
    ///
    /// `lookup` is injected so tests don't have to mutate the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(club_id) = get("TARGET_CLUB_ID") {
            // Follow the club unless the summaries file was pinned explicitly
            if self.sources.summaries_path == SourceSettings::summaries_file_for(&self.sources.club_id) {
                self.sources.summaries_path = SourceSettings::summaries_file_for(&club_id);
            }
            self.sources.club_id = club_id;
        }
        if let Some(path) = get("SUMMARIES_JSONL") {
            self.sources.summaries_path = path;
        }
        if let Some(path) = get("BLOGS_JSONL") {
            self.sources.blogs_path = path;
        }
        if let Some(model) = get("EMBEDDING_MODEL_NAME") {
            self.embedding.model = model;
        }
        if let Some(model) = get("LLM_MODEL_NAME") {
            self.llm.model = model;
        }
        if let Some(dir) = get("PERSIST_DIRECTORY") {
            self.index.persist_dir = dir;
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dupr-rag")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Expanded player summaries path.
    pub fn summaries_path(&self) -> PathBuf {
        Self::expand_path(&self.sources.summaries_path)
    }

    /// Expanded blog posts path.
    pub fn blogs_path(&self) -> PathBuf {
        Self::expand_path(&self.sources.blogs_path)
    }

    /// Expanded index directory.
    pub fn persist_dir(&self) -> PathBuf {
        Self::expand_path(&self.index.persist_dir)
    }

    /// SQLite file backing the vector index.
    pub fn index_path(&self) -> PathBuf {
        self.persist_dir().join("index.sqlite3")
    }
}
