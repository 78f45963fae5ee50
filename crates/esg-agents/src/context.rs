//! Shared dependencies handed to every agent

use crate::prompts::register_prompts;
use esg_core::Result;
use esg_llm::{LlmClient, LlmClients};
use esg_prompt::PromptRegistry;
use esg_sources::SourceHub;
use std::sync::Arc;

/// LLM clients, evidence sources and prompt templates
///
/// Cloning is cheap; all members are reference counted.
#[derive(Clone)]
pub struct AgentContext {
    llm: LlmClients,
    sources: SourceHub,
    prompts: Arc<PromptRegistry>,
}

impl AgentContext {
    /// Build a context with the agent prompts registered
    pub fn new(llm: LlmClients, sources: SourceHub) -> Result<Self> {
        let prompts = PromptRegistry::new();
        register_prompts(&prompts)?;
        Ok(Self {
            llm,
            sources,
            prompts: Arc::new(prompts),
        })
    }

    /// Reasoning client (Gemini first)
    pub fn primary(&self) -> &LlmClient {
        &self.llm.primary
    }

    /// Classification client (Groq fast model first)
    pub fn fast(&self) -> &LlmClient {
        &self.llm.fast
    }

    pub fn llm(&self) -> &LlmClients {
        &self.llm
    }

    pub fn sources(&self) -> &SourceHub {
        &self.sources
    }

    /// Registry shared with the workflow, which adds its own templates
    pub fn prompts(&self) -> &Arc<PromptRegistry> {
        &self.prompts
    }

    /// Render a registered prompt
    pub fn render(&self, name: &str, vars: &serde_json::Value) -> Result<String> {
        Ok(self.prompts.render(name, vars)?)
    }
}

impl std::fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentContext")
            .field("primary", &self.llm.primary.slot_labels())
            .field("fast", &self.llm.fast.slot_labels())
            .field("sources", &self.sources)
            .field("prompts", &self.prompts.len())
            .finish()
    }
}
