//! OpenAI-compatible chat completion implementation.

use super::{AiService, ChatMessage, Role};
use crate::config::AiSettings;
use crate::error::{Result, TutorlyError};
use crate::openai::client_from_settings;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Completion client for any OpenAI-compatible endpoint.
pub struct OpenAiCompletion {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAiCompletion {
    /// Create a completion client from the `[ai]` settings.
    pub fn new(settings: &AiSettings) -> Result<Self> {
        Self::with_model(settings, &settings.model)
    }

    /// Create a completion client that uses a different model on the same endpoint.
    pub fn with_model(settings: &AiSettings, model: &str) -> Result<Self> {
        Ok(Self {
            client: client_from_settings(settings)?,
            model: model.to_string(),
        })
    }

    /// The model this client talks to.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
        let built: ChatCompletionRequestMessage = match message.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| TutorlyError::Ai(e.to_string()))?
                .into(),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| TutorlyError::Ai(e.to_string()))?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| TutorlyError::Ai(e.to_string()))?
                .into(),
        };
        Ok(built)
    }
}

#[async_trait]
impl AiService for OpenAiCompletion {
    #[instrument(skip(self, messages), fields(model = %self.model, count = messages.len()))]
    async fn get_ai_response(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let request_messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .max_completion_tokens(max_tokens)
            .temperature(temperature)
            .build()
            .map_err(|e| TutorlyError::Ai(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| TutorlyError::Model(format!("Completion failed: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| TutorlyError::Model("Empty response from model".to_string()))?;

        debug!("Received {} characters from model", answer.len());
        Ok(answer)
    }
}
