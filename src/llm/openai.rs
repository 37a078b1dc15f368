//! Chat completions over an OpenAI-compatible API (Groq by default).

use super::{ChatMessage, ChatModel, ChatRole};
use crate::config::LlmSettings;
use crate::error::{DuprError, Result};
use crate::openai::{api_key_from_env, create_client};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat model backed by an OpenAI-compatible endpoint.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChatModel {
    /// Create a chat model from settings.
    ///
    /// Fails with [`DuprError::MissingCredential`] when the API key variable is unset.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        let api_key = api_key_from_env(&settings.api_key_env)?;
        Self::new(&api_key, &settings.api_base, &settings.model, settings.temperature)
    }

    /// Create a chat model with explicit credentials.
    pub fn new(api_key: &str, api_base: &str, model: &str, temperature: f32) -> Result<Self> {
        Ok(Self {
            client: create_client(api_key, Some(api_base))?,
            model: model.to_string(),
            temperature,
        })
    }

    fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
        let content = message.content.clone();
        let built: ChatCompletionRequestMessage = match message.role {
            ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| DuprError::Llm(e.to_string()))?
                .into(),
            ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| DuprError::Llm(e.to_string()))?
                .into(),
            ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| DuprError::Llm(e.to_string()))?
                .into(),
        };
        Ok(built)
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip(self, messages), fields(model = %self.model, count = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request_messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| DuprError::Llm(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| DuprError::Llm(format!("Chat API error: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| DuprError::Llm("Empty response from model".to_string()))?
            .clone();

        debug!("Model replied with {} chars", content.len());
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_model_creation() {
        let model =
            OpenAIChatModel::new("test-key", "https://api.groq.com/openai/v1", "llama3-8b-8192", 0.0)
                .unwrap();
        assert_eq!(model.model(), "llama3-8b-8192");
    }

    #[test]
    fn test_message_conversion_keeps_roles() {
        let converted = OpenAIChatModel::to_request_message(&ChatMessage::assistant("hi")).unwrap();
        assert!(matches!(converted, ChatCompletionRequestMessage::Assistant(_)));

        let converted = OpenAIChatModel::to_request_message(&ChatMessage::system("rules")).unwrap();
        assert!(matches!(converted, ChatCompletionRequestMessage::System(_)));
    }

    #[test]
    fn test_missing_credential_is_fatal() {
        let settings = LlmSettings {
            api_key_env: "DUPR_RAG_TEST_MISSING_LLM_KEY".to_string(),
            ..LlmSettings::default()
        };
        let err = OpenAIChatModel::from_settings(&settings).err().unwrap();
        assert!(err.is_startup_fatal());
    }
}
