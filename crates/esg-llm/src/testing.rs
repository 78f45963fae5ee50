//! Scripted provider for tests
//!
//! Replies are chosen by the first rule whose pattern occurs in the prompt,
//! falling back to a default reply. Clones share the same call log.

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, LlmClient, LlmClients, Message,
    ProviderSlot, Result, RetryPolicy, StopReason, TokenUsage,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Script {
    rules: Vec<(String, String)>,
    default_reply: Option<String>,
    failing: bool,
}

/// Provider that answers from a fixed script
#[derive(Clone)]
pub struct ScriptedProvider {
    name: String,
    script: Arc<Mutex<Script>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::named("scripted")
    }
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Arc::new(Mutex::new(Script::default())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with `reply` when the prompt contains `pattern`
    pub fn when(self, pattern: impl Into<String>, reply: impl Into<String>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.rules.push((pattern.into(), reply.into()));
        }
        self
    }

    /// Reply used when no rule matches
    pub fn default_reply(self, reply: impl Into<String>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.default_reply = Some(reply.into());
        }
        self
    }

    /// Fail every call with a retryable request error
    pub fn failing(self) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.failing = true;
        }
        self
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }

    /// Primary and fast clients both backed by this provider, without retries
    pub fn into_clients(self) -> LlmClients {
        LlmClients::single(LlmClient::new(
            vec![ProviderSlot::new(Arc::new(self), "scripted-model")],
            RetryPolicy::no_retry(),
        ))
    }

    fn reply_for(&self, prompt: &str) -> Result<String> {
        let script = self
            .script
            .lock()
            .map_err(|_| LLMError::UnexpectedResponse("script lock poisoned".to_string()))?;

        if script.failing {
            return Err(LLMError::RequestFailed(format!("{} is scripted to fail", self.name)));
        }

        script
            .rules
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone())
            .or_else(|| script.default_reply.clone())
            .ok_or_else(|| LLMError::UnexpectedResponse(format!("no scripted reply for: {prompt}")))
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let prompt = request.prompt().unwrap_or_default().to_string();
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        let reply = self.reply_for(&prompt)?;
        Ok(CompletionResponse {
            message: Message::assistant(reply),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
