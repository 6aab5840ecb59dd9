use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

use crate::provider::{
    ChatChoice, ChatMessage, ChatRequest, ChatResponse, ChatRole, CompletionProvider,
    ProviderConnector, ProviderError,
};

impl From<OpenAIError> for ProviderError {
    fn from(error: OpenAIError) -> Self {
        match error {
            OpenAIError::ApiError(api_error) => ProviderError::from_message(api_error.message),
            other => ProviderError::from_message(other.to_string()),
        }
    }
}

pub struct OpenAIService {
    client: Client<OpenAIConfig>,
}

impl OpenAIService {
    pub fn new(api_key: &str, api_base: Option<&str>) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(api_base) = api_base {
            config = config.with_api_base(api_base);
        }
        let client = Client::with_config(config).with_backoff(Self::single_attempt());
        Self { client }
    }

    /// The client otherwise retries rate-limited calls; every call here is a single attempt.
    fn single_attempt() -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build()
    }

    fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, OpenAIError> {
        let message = match message.role {
            ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.clone())
                .build()?
                .into(),
        };
        Ok(message)
    }
}

#[async_trait]
impl CompletionProvider for OpenAIService {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let messages = request
            .messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(request.model)
            .messages(messages)
            .temperature(request.temperature)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let choices = response
            .choices
            .into_iter()
            .map(|choice| ChatChoice {
                content: choice.message.content,
            })
            .collect();

        Ok(ChatResponse { choices })
    }
}

/// Connects a fresh OpenAI client for every call; nothing is shared between keys.
#[derive(Debug, Clone, Default)]
pub struct OpenAIConnector {
    api_base: Option<String>,
}

impl OpenAIConnector {
    pub fn new(api_base: Option<String>) -> Self {
        Self { api_base }
    }
}

impl ProviderConnector for OpenAIConnector {
    fn connect(&self, api_key: &str) -> Box<dyn CompletionProvider> {
        Box::new(OpenAIService::new(api_key, self.api_base.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    #[test]
    fn api_errors_keep_only_the_provider_message() {
        let api_error: ApiError = serde_json::from_value(serde_json::json!({
            "message": "Incorrect API key provided",
            "type": "invalid_request_error",
            "param": null,
            "code": "invalid_api_key"
        }))
        .unwrap();

        assert_eq!(
            ProviderError::from(OpenAIError::ApiError(api_error)),
            ProviderError::Message("Incorrect API key provided".to_string())
        );
    }

    #[test]
    fn other_errors_use_their_display_text() {
        let error = OpenAIError::InvalidArgument("model is required".to_string());

        let converted = ProviderError::from(error);

        assert!(converted
            .message()
            .is_some_and(|message| message.contains("model is required")));
    }
}
