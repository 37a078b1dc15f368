//! Chat front-end adapter.
//!
//! [`ChatSession`] runs one conversational turn against the pipeline and
//! renders everything a chat UI shows next to the answer: the updated turn
//! list, a deduplicated source list and a response-info panel. Pipeline
//! failures become an error turn instead of propagating, so the UI always has
//! something to display.

use crate::document::{Document, DocumentMeta};
use crate::rag::{ChatTurn, ConversationalPipeline};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, instrument};

/// Selectable range for the number of retrieved sources.
pub const TOP_K_RANGE: RangeInclusive<usize> = 1..=10;

/// Source count used when the user has not picked one.
pub const DEFAULT_CHAT_TOP_K: usize = 5;

/// Shown in the sources panel when nothing was retrieved.
pub const NO_SOURCES: &str = "📭 **No sources found.**";

/// Shown in the info panel after the conversation is cleared.
pub const CLEARED: &str = "🔄 **Chat history cleared.** Ask a new question to get started.";

const PREVIEW_CHARS: usize = 150;
const ANSWER_PREFIXES: &[&str] = &["🏓", "📚", "💡", "⚡"];

/// Everything the UI needs to redraw after a turn.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Previous turns plus the new user and assistant turns.
    pub turns: Vec<ChatTurn>,
    /// Markdown list of the documents the answer was grounded on.
    pub sources: String,
    /// Markdown panel with latency, counts and confidence.
    pub meta: String,
    /// The retrieved documents themselves.
    pub context: Vec<Document>,
}

impl ChatReply {
    /// Reply for a freshly cleared conversation.
    pub fn cleared() -> Self {
        Self {
            turns: Vec::new(),
            sources: NO_SOURCES.to_string(),
            meta: CLEARED.to_string(),
            context: Vec::new(),
        }
    }

    /// Text of the last assistant turn.
    pub fn answer(&self) -> Option<&str> {
        self.turns.last().map(|t| t.content.as_str())
    }
}

/// Confidence label derived from how many sources backed the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn from_context_count(count: usize) -> Self {
        match count {
            0 => Confidence::Low,
            1 | 2 => Confidence::Medium,
            _ => Confidence::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

/// Clamp a requested source count into [`TOP_K_RANGE`].
pub fn clamp_top_k(top_k: usize) -> usize {
    top_k.clamp(*TOP_K_RANGE.start(), *TOP_K_RANGE.end())
}

/// One chat conversation surface over a shared pipeline.
pub struct ChatSession {
    pipeline: Arc<ConversationalPipeline>,
}

impl ChatSession {
    pub fn new(pipeline: Arc<ConversationalPipeline>) -> Self {
        Self { pipeline }
    }

    /// Answer `user_message` given the prior `turns`.
    #[instrument(skip(self, turns), fields(turns = turns.len()))]
    pub async fn respond(&self, user_message: &str, mut turns: Vec<ChatTurn>, top_k: usize) -> ChatReply {
        let top_k = clamp_top_k(top_k);

        let started = Instant::now();
        let result = self.pipeline.answer(user_message, &turns, top_k).await;
        let latency = started.elapsed();

        let (answer, context) = match result {
            Ok(rag) => (decorate_answer(rag.answer), rag.context),
            Err(e) => {
                error!("Chat turn failed: {}", e);
                (
                    format!("❌ **Error:** Could not process your question.\n\nDetails: {}", e),
                    Vec::new(),
                )
            }
        };

        turns.push(ChatTurn::user(user_message));
        turns.push(ChatTurn::assistant(answer));

        ChatReply {
            turns,
            sources: format_sources(&context),
            meta: format_meta(latency, top_k, context.len()),
            context,
        }
    }

    /// Reset the conversation.
    pub fn clear(&self) -> ChatReply {
        ChatReply::cleared()
    }
}

fn decorate_answer(answer: String) -> String {
    let trimmed = answer.trim_start();
    if trimmed.is_empty() || ANSWER_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
        answer
    } else {
        format!("🏓 {}", answer)
    }
}

/// Render retrieved documents as a markdown source list.
///
/// Documents sharing a source tag and title are listed once, first occurrence
/// wins, and order is otherwise preserved.
pub fn format_sources(documents: &[Document]) -> String {
    if documents.is_empty() {
        return NO_SOURCES.to_string();
    }

    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for (i, doc) in documents.iter().enumerate() {
        let source = doc.source();
        let title = doc
            .display_title()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Document {}", i + 1));

        if !seen.insert(format!("{}:{}", source, title)) {
            continue;
        }

        let mut entry = format!(
            "### {} **{}**\n**Source:** `{}`",
            source.icon(),
            title,
            source
        );
        match &doc.metadata {
            DocumentMeta::PlayerSummary(meta) if !meta.player_id.is_empty() => {
                entry.push_str(&format!(" · 🆔 `{}`", meta.player_id));
            }
            DocumentMeta::Blog(meta) if !meta.url.is_empty() => {
                entry.push_str(&format!(" · 🔗 [View details]({})", meta.url));
            }
            _ => {}
        }
        entry.push_str(&format!("\n\n> _{}_\n", preview(&doc.text)));
        entries.push(entry);
    }

    format!(
        "**📊 Total:** {} sources found\n\n---\n\n{}",
        entries.len(),
        entries.join("\n")
    )
}

/// First two lines of `text`, cut at [`PREVIEW_CHARS`] characters.
fn preview(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return "No preview available.".to_string();
    }

    let joined = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(2)
        .collect::<Vec<_>>()
        .join(" / ");

    if joined.chars().count() > PREVIEW_CHARS {
        let cut: String = joined.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        joined
    }
}

/// Render the response-info panel.
pub fn format_meta(latency: Duration, requested_k: usize, found: usize) -> String {
    let confidence = Confidence::from_context_count(found);
    format!(
        "### ⚡ **Response info**\n\n\
         📊 **Processing time:** {:.2}s  \n\
         🔍 **Sources requested:** {}  \n\
         📚 **Sources found:** {}  \n\
         🎯 **Confidence:** {}\n\n\
         💡 **Tip:** name players explicitly and ask follow-ups like \"what about doubles?\".",
        latency.as_secs_f64(),
        requested_k,
        found,
        confidence.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::TurnRole;
    use crate::test_support::{blog, player, RecordingChatModel, StubRetriever};

    fn session(llm: RecordingChatModel, docs: Vec<Document>) -> ChatSession {
        let pipeline = ConversationalPipeline::new(Arc::new(llm), Arc::new(StubRetriever::returning(docs)));
        ChatSession::new(Arc::new(pipeline))
    }

    #[test]
    fn test_clamp_top_k() {
        assert_eq!(clamp_top_k(0), 1);
        assert_eq!(clamp_top_k(5), 5);
        assert_eq!(clamp_top_k(50), 10);
    }

    #[test]
    fn test_confidence_thresholds() {
        assert_eq!(Confidence::from_context_count(0), Confidence::Low);
        assert_eq!(Confidence::from_context_count(1), Confidence::Medium);
        assert_eq!(Confidence::from_context_count(2), Confidence::Medium);
        assert_eq!(Confidence::from_context_count(3), Confidence::High);
        assert_eq!(Confidence::from_context_count(10), Confidence::High);
    }

    #[test]
    fn test_format_sources_dedups_by_source_and_title() {
        let alice = player("P1", "Alice", 10, 2);
        let docs = vec![alice.clone(), blog("Rules", "Serve underhand."), alice];

        let rendered = format_sources(&docs);
        assert!(rendered.starts_with("**📊 Total:** 2 sources found"));
        assert_eq!(rendered.matches("**Alice**").count(), 1);

        let alice_at = rendered.find("**Alice**").unwrap();
        let rules_at = rendered.find("**Rules**").unwrap();
        assert!(alice_at < rules_at);

        assert!(rendered.contains("🆔 `P1`"));
        assert!(rendered.contains("[View details](https://www.dupr.com/blog/rules)"));
    }

    #[test]
    fn test_format_sources_empty() {
        assert_eq!(format_sources(&[]), NO_SOURCES);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(400);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);

        assert_eq!(preview("one\ntwo\nthree"), "one / two");
        assert_eq!(preview("   "), "No preview available.");
    }

    #[test]
    fn test_format_meta() {
        let meta = format_meta(Duration::from_millis(1234), 5, 3);
        assert!(meta.contains("1.23s"));
        assert!(meta.contains("**Sources requested:** 5"));
        assert!(meta.contains("**Sources found:** 3"));
        assert!(meta.contains("**Confidence:** High"));
    }

    #[tokio::test]
    async fn test_respond_appends_turns_and_decorates() {
        let chat = session(
            RecordingChatModel::fixed("Alice has 10 wins."),
            vec![player("P1", "Alice", 10, 2)],
        );

        let reply = chat.respond("How many wins does Alice have?", Vec::new(), 5).await;
        assert_eq!(reply.turns.len(), 2);
        assert_eq!(reply.turns[0], ChatTurn::user("How many wins does Alice have?"));
        assert_eq!(reply.turns[1].role, TurnRole::Assistant);
        assert_eq!(reply.answer(), Some("🏓 Alice has 10 wins."));
        assert!(reply.sources.contains("Alice"));
        assert!(reply.meta.contains("**Confidence:** Medium"));
    }

    #[tokio::test]
    async fn test_respond_keeps_existing_prefix() {
        let chat = session(RecordingChatModel::fixed("📚 From the blog."), vec![blog("Rules", "...")]);
        let reply = chat.respond("rules?", Vec::new(), 5).await;
        assert_eq!(reply.answer(), Some("📚 From the blog."));
    }

    #[tokio::test]
    async fn test_respond_turns_errors_into_a_message() {
        let chat = session(RecordingChatModel::failing("rate limited"), vec![blog("Rules", "...")]);
        let prior = vec![ChatTurn::user("hi"), ChatTurn::assistant("hello")];

        let reply = chat.respond("rules?", prior, 5).await;
        assert_eq!(reply.turns.len(), 4);
        let answer = reply.answer().unwrap();
        assert!(answer.starts_with("❌ **Error:**"));
        assert!(answer.contains("rate limited"));
        assert_eq!(reply.sources, NO_SOURCES);
        assert!(reply.meta.contains("**Confidence:** Low"));
    }

    #[tokio::test]
    async fn test_respond_clamps_top_k() {
        let chat = session(RecordingChatModel::fixed("ok"), vec![blog("Rules", "...")]);
        let reply = chat.respond("rules?", Vec::new(), 0).await;
        assert!(reply.meta.contains("**Sources requested:** 1"));
    }

    #[test]
    fn test_clear() {
        let chat = session(RecordingChatModel::fixed("ok"), Vec::new());
        let reply = chat.clear();
        assert!(reply.turns.is_empty());
        assert_eq!(reply.sources, NO_SOURCES);
        assert_eq!(reply.meta, CLEARED);
    }
}
