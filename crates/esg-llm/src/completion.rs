//! Chat completion request and response

use crate::{Message, Role};
use serde::{Deserialize, Serialize};

/// Default completion budget; claim extraction and risk narratives are long
pub const DEFAULT_MAX_TOKENS: usize = 1024;

/// One chat completion call against a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model id as the provider names it
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder {
            request: Self {
                model: model.into(),
                messages: Vec::new(),
                system: None,
                max_tokens: DEFAULT_MAX_TOKENS,
                temperature: None,
            },
        }
    }

    /// Most recent user turn
    pub fn prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(Message::text)
    }
}

/// Builder for [`CompletionRequest`]
#[derive(Debug, Clone)]
pub struct CompletionRequestBuilder {
    request: CompletionRequest,
}

impl CompletionRequestBuilder {
    pub fn add_message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.request.system = Some(system.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.request.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.temperature = Some(temperature);
        self
    }

    pub fn build(self) -> CompletionRequest {
        self.request
    }
}

/// Assistant reply with finish reason and token counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    pub fn text(&self) -> &str {
        self.message.text()
    }
}

/// Why generation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    /// Truncated at `max_tokens`; JSON replies may be cut off
    MaxTokens,
    ContentFilter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_and_overrides() {
        let request = CompletionRequest::builder("llama-3.3-70b-versatile")
            .system("You are an ESG analyst")
            .add_message(Message::user("Rate this claim"))
            .temperature(0.1)
            .build();

        assert_eq!(request.model, "llama-3.3-70b-versatile");
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(request.temperature, Some(0.1));
        assert_eq!(request.system.as_deref(), Some("You are an ESG analyst"));
        assert_eq!(request.prompt(), Some("Rate this claim"));
    }

    #[test]
    fn test_prompt_is_latest_user_turn() {
        let request = CompletionRequest::builder("gemini-2.5-flash")
            .add_message(Message::user("first"))
            .add_message(Message::assistant("reply"))
            .add_message(Message::user("second"))
            .max_tokens(8000)
            .build();

        assert_eq!(request.prompt(), Some("second"));
        assert_eq!(request.max_tokens, 8000);
    }
}
