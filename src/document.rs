//! Normalized documents indexed for retrieval.
//!
//! Every record type in the dataset is turned into a [`Document`]: a block of
//! rendered text plus typed metadata. The metadata is a tagged enum so callers
//! match on the record shape instead of probing optional keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized unit of indexed text plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Rendered text that gets embedded and handed to the LLM as context.
    pub text: String,
    /// Record-specific metadata.
    pub metadata: DocumentMeta,
}

/// Metadata for a document, discriminated by its `source` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DocumentMeta {
    /// A per-player match summary.
    PlayerSummary(PlayerSummaryMeta),
    /// A blog post.
    Blog(BlogMeta),
}

/// Metadata carried by player summary documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummaryMeta {
    pub player_id: String,
    pub player_name: String,
}

/// Metadata carried by blog documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogMeta {
    pub url: String,
    pub title: String,
}

/// The `source` discriminant shared by all document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    PlayerSummary,
    Blog,
}

impl SourceKind {
    /// The tag stored alongside the document.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::PlayerSummary => "player_summary",
            SourceKind::Blog => "blog",
        }
    }

    /// Icon used when listing sources in the chat surface.
    pub fn icon(&self) -> &'static str {
        match self {
            SourceKind::PlayerSummary => "🏓",
            SourceKind::Blog => "📝",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DocumentMeta {
    /// The source discriminant of this metadata.
    pub fn source(&self) -> SourceKind {
        match self {
            DocumentMeta::PlayerSummary(_) => SourceKind::PlayerSummary,
            DocumentMeta::Blog(_) => SourceKind::Blog,
        }
    }
}

impl Document {
    /// Create a player summary document.
    pub fn player_summary(text: String, meta: PlayerSummaryMeta) -> Self {
        Self {
            text,
            metadata: DocumentMeta::PlayerSummary(meta),
        }
    }

    /// Create a blog document.
    pub fn blog(text: String, meta: BlogMeta) -> Self {
        Self {
            text,
            metadata: DocumentMeta::Blog(meta),
        }
    }

    /// The source discriminant of this document.
    pub fn source(&self) -> SourceKind {
        self.metadata.source()
    }

    /// Human-readable title: the blog title or the player's name.
    ///
    /// Returns `None` when the record had no usable value.
    pub fn display_title(&self) -> Option<&str> {
        let title = match &self.metadata {
            DocumentMeta::PlayerSummary(meta) => meta.player_name.as_str(),
            DocumentMeta::Blog(meta) => meta.title.as_str(),
        };
        (!title.is_empty()).then_some(title)
    }
}
