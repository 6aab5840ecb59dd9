use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod openai;
pub mod prompt;
pub mod provider;

pub use openai::{OpenAIConnector, OpenAIService};
pub use provider::{
    ChatChoice, ChatMessage, ChatRequest, ChatResponse, ChatRole, CompletionProvider,
    ProviderConnector, ProviderError,
};

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const NO_RESPONSE_FALLBACK: &str = "No response generated";
pub const FAILURE_FALLBACK: &str = "Failed to modify text";
pub const MAX_FEATURE_VALUE: u8 = 100;

/// A named weight describing a stylistic attribute of the output text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub value: u8,
}

impl Feature {
    pub fn new(name: impl Into<String>, value: u8) -> Self {
        Self {
            name: name.into(),
            value: value.min(MAX_FEATURE_VALUE),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModifyError {
    #[error("{message}")]
    Failed { message: String },
}

impl ModifyError {
    pub fn message(&self) -> &str {
        match self {
            ModifyError::Failed { message } => message,
        }
    }
}

impl From<ProviderError> for ModifyError {
    fn from(error: ProviderError) -> Self {
        ModifyError::Failed {
            message: error.message().unwrap_or(FAILURE_FALLBACK).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ModelSettings {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn chat_request(&self, prompt: String) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.temperature,
        }
    }
}

/// Rewrites `text` through a client connected with the caller's `api_key`.
pub async fn modify_text(
    text: &str,
    features: &[Feature],
    api_key: &str,
    settings: &ModelSettings,
) -> Result<String, ModifyError> {
    let connector = OpenAIConnector::default();
    modify_text_via(&connector, text, features, api_key, settings).await
}

pub async fn modify_text_via(
    connector: &dyn ProviderConnector,
    text: &str,
    features: &[Feature],
    api_key: &str,
    settings: &ModelSettings,
) -> Result<String, ModifyError> {
    let provider = connector.connect(api_key);
    modify_text_with(provider.as_ref(), text, features, settings).await
}

/// Sends exactly one chat completion and returns the first choice's text.
pub async fn modify_text_with(
    provider: &dyn CompletionProvider,
    text: &str,
    features: &[Feature],
    settings: &ModelSettings,
) -> Result<String, ModifyError> {
    let request = settings.chat_request(prompt::build_prompt(text, features));

    match provider.complete(request).await {
        Ok(response) => Ok(response
            .first_content()
            .unwrap_or(NO_RESPONSE_FALLBACK)
            .to_string()),
        Err(e) => {
            tracing::error!("Chat completion failed: {}", e);
            Err(e.into())
        }
    }
}
