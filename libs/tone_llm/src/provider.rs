use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatChoice {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

impl ChatResponse {
    /// Content of the first choice, if the provider produced any text.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}

/// Failure reported by a completion provider. Auth, network and quota errors are not told apart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("{0}")]
    Message(String),

    #[error("provider failed without a message")]
    Opaque,
}

impl ProviderError {
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            ProviderError::Opaque
        } else {
            ProviderError::Message(message)
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ProviderError::Message(message) => Some(message),
            ProviderError::Opaque => None,
        }
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

/// Builds a provider for one call from the caller's API key.
pub trait ProviderConnector: Send + Sync {
    fn connect(&self, api_key: &str) -> Box<dyn CompletionProvider>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_messages_become_opaque() {
        assert_eq!(ProviderError::from_message("  "), ProviderError::Opaque);
        assert_eq!(
            ProviderError::from_message("Unauthorized").message(),
            Some("Unauthorized")
        );
    }

    #[test]
    fn first_content_skips_missing_and_empty_text() {
        let empty = ChatResponse::default();
        let blank = ChatResponse {
            choices: vec![ChatChoice {
                content: Some(String::new()),
            }],
        };
        let text = ChatResponse {
            choices: vec![
                ChatChoice {
                    content: Some(" Hi! ".to_string()),
                },
                ChatChoice {
                    content: Some("ignored".to_string()),
                },
            ],
        };

        assert_eq!(empty.first_content(), None);
        assert_eq!(blank.first_content(), None);
        assert_eq!(text.first_content(), Some(" Hi! "));
    }
}
