//! Concrete LLM provider implementations
//!
//! Groq and Gemini both expose an OpenAI-compatible chat-completions API, so a
//! single provider type serves both with different base URLs.

pub mod openai;

pub use openai::{GEMINI_API_BASE, GROQ_API_BASE, OpenAIConfig, OpenAIProvider};
