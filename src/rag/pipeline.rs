//! The two-stage conversational pipeline.
//!
//! Stage one turns a follow-up into a standalone question using the chat
//! history. Stage two retrieves the nearest documents for that question and
//! asks the model to answer strictly from them. Calls share nothing but the
//! read-only retriever and model client.

use super::{format_context, ChatTurn, RagAnswer};
use crate::config::Prompts;
use crate::error::{DuprError, Result};
use crate::index::Retriever;
use crate::llm::{ChatMessage, ChatModel};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Conversational retrieval pipeline.
pub struct ConversationalPipeline {
    llm: Arc<dyn ChatModel>,
    retriever: Arc<dyn Retriever>,
    prompts: Prompts,
}

impl ConversationalPipeline {
    /// Create a pipeline with the default prompts.
    pub fn new(llm: Arc<dyn ChatModel>, retriever: Arc<dyn Retriever>) -> Self {
        Self {
            llm,
            retriever,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Result count used by callers that don't pick one.
    pub fn default_top_k(&self) -> usize {
        self.retriever.default_top_k()
    }

    /// Rewrite `message` into a standalone question using `history`.
    ///
    /// With no history this is a passthrough and the model is not called.
    #[instrument(skip(self, history), fields(turns = history.len()))]
    pub async fn rewrite_query(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        if history.is_empty() {
            return Ok(message.to_string());
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.prompts.rag.contextualize.clone()));
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(message));

        let rewritten = self.llm.complete(&messages).await?;
        let rewritten = rewritten.trim();

        if rewritten.is_empty() {
            return Ok(message.to_string());
        }

        debug!("Rewrote query to: {}", rewritten);
        Ok(rewritten.to_string())
    }

    /// Answer `message` from the `top_k` documents nearest to its standalone form.
    #[instrument(skip(self, history), fields(turns = history.len()))]
    pub async fn answer(&self, message: &str, history: &[ChatTurn], top_k: usize) -> Result<RagAnswer> {
        if top_k == 0 {
            return Err(DuprError::InvalidInput(
                "top_k must be a positive integer".to_string(),
            ));
        }

        info!("Processing question: {}", message);

        let query = self.rewrite_query(message, history).await?;
        let context = self.retriever.retrieve(&query, top_k).await?;

        if context.is_empty() {
            debug!("No context retrieved, skipping the answer call");
            return Ok(RagAnswer {
                answer: self.prompts.rag.not_found.clone(),
                context,
            });
        }

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), format_context(&context));
        let system_prompt = Prompts::render(&self.prompts.rag.answer, &vars);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(message));

        let answer = self.llm.complete(&messages).await?;

        debug!("Generated answer from {} documents", context.len());
        Ok(RagAnswer { answer, context })
    }

    /// [`ConversationalPipeline::answer`] with the retriever's default result count.
    pub async fn answer_default(&self, message: &str, history: &[ChatTurn]) -> Result<RagAnswer> {
        self.answer(message, history, self.default_top_k()).await
    }
}
