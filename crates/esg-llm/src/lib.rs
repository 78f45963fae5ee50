//! LLM provider abstraction layer for the ESG greenwashing detector
//!
//! This crate provides:
//!
//! - Message and completion request/response types
//! - The [`LLMProvider`] trait
//! - An OpenAI-compatible provider used for both Groq and Gemini
//! - A [`RetryPolicy`] with exponential backoff
//! - [`LlmClient`], which tries an ordered list of provider/model slots

pub mod client;
pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod retry;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types
pub use client::{LlmClient, LlmClients, ProviderSlot};
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;
pub use retry::RetryPolicy;
