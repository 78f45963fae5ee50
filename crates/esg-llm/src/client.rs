//! Primary/fallback LLM client
//!
//! [`LlmClient`] holds an ordered list of provider/model slots. Each call tries
//! the slots in order, retrying each with the configured policy, and returns
//! the first non-empty reply.

use crate::providers::{OpenAIConfig, OpenAIProvider};
use crate::{CompletionRequest, LLMError, LLMProvider, Message, Result, RetryPolicy};
use esg_utils::Settings;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_MAX_TOKENS: usize = 8000;

/// A provider paired with the model to request from it
#[derive(Clone)]
pub struct ProviderSlot {
    pub provider: Arc<dyn LLMProvider>,
    pub model: String,
}

impl ProviderSlot {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    fn label(&self) -> String {
        format!("{}/{}", self.provider.name(), self.model)
    }
}

/// LLM client with ordered fallback across providers
pub struct LlmClient {
    slots: Vec<ProviderSlot>,
    retry: RetryPolicy,
    temperature: f32,
    max_tokens: usize,
}

impl LlmClient {
    pub fn new(slots: Vec<ProviderSlot>, retry: RetryPolicy) -> Self {
        Self {
            slots,
            retry,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Provider/model labels in call order
    pub fn slot_labels(&self) -> Vec<String> {
        self.slots.iter().map(ProviderSlot::label).collect()
    }

    /// Complete a single user prompt
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        self.complete_messages(None, prompt).await
    }

    /// Complete a user prompt under a system prompt
    pub async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.complete_messages(Some(system), prompt).await
    }

    async fn complete_messages(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        if self.slots.is_empty() {
            return Err(LLMError::ConfigurationError(
                "No LLM providers configured".to_string(),
            ));
        }

        let mut failures = Vec::new();

        for slot in &self.slots {
            let label = slot.label();
            debug!("Trying {}", label);

            let result = self
                .retry
                .run(&label, || {
                    let mut builder = CompletionRequest::builder(slot.model.clone())
                        .add_message(Message::user(prompt))
                        .max_tokens(self.max_tokens)
                        .temperature(self.temperature);
                    if let Some(system) = system {
                        builder = builder.system(system);
                    }
                    let request = builder.build();
                    let provider = Arc::clone(&slot.provider);
                    async move { provider.complete(request).await }
                })
                .await;

            match result {
                Ok(response) if !response.text().trim().is_empty() => {
                    return Ok(response.message.content);
                }
                Ok(_) => {
                    warn!("{} returned an empty reply", label);
                    failures.push(format!("{label}: empty reply"));
                }
                Err(e) => {
                    warn!("{} failed: {}", label, e);
                    failures.push(format!("{label}: {e}"));
                }
            }
        }

        Err(LLMError::AllProvidersFailed(failures.join("; ")))
    }
}

/// The two clients the agents use
///
/// `primary` handles reasoning prompts (Gemini first, then Groq). `fast` handles
/// one-word classifications (Groq fast model first).
#[derive(Clone)]
pub struct LlmClients {
    pub primary: Arc<LlmClient>,
    pub fast: Arc<LlmClient>,
}

impl LlmClients {
    /// Build both clients from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = settings.llm_timeout.as_secs();

        let gemini: Option<Arc<dyn LLMProvider>> = match &settings.gemini_api_key {
            Some(key) => Some(Arc::new(OpenAIProvider::with_config(
                OpenAIConfig::gemini(key.clone()).with_timeout(timeout),
            )?)),
            None => None,
        };
        let groq: Option<Arc<dyn LLMProvider>> = match &settings.groq_api_key {
            Some(key) => Some(Arc::new(OpenAIProvider::with_config(
                OpenAIConfig::groq(key.clone()).with_timeout(timeout),
            )?)),
            None => None,
        };

        let mut primary = Vec::new();
        let mut fast = Vec::new();
        if let Some(provider) = &gemini {
            primary.push(ProviderSlot::new(Arc::clone(provider), &settings.gemini_model));
        }
        if let Some(provider) = &groq {
            primary.push(ProviderSlot::new(Arc::clone(provider), &settings.groq_model));
            fast.push(ProviderSlot::new(Arc::clone(provider), &settings.groq_fast_model));
        }
        if let Some(provider) = &gemini {
            fast.push(ProviderSlot::new(Arc::clone(provider), &settings.gemini_model));
        }

        if primary.is_empty() {
            return Err(LLMError::ConfigurationError(
                "Set GROQ_API_KEY or GEMINI_API_KEY".to_string(),
            ));
        }

        let retry = RetryPolicy::from_settings(settings);
        let clients = Self {
            primary: Arc::new(LlmClient::new(primary, retry.clone())),
            fast: Arc::new(LlmClient::new(fast, retry)),
        };

        info!(
            primary = ?clients.primary.slot_labels(),
            fast = ?clients.fast.slot_labels(),
            "LLM clients initialized"
        );
        Ok(clients)
    }

    /// Use the same client for both roles
    pub fn single(client: LlmClient) -> Self {
        let client = Arc::new(client);
        Self {
            primary: Arc::clone(&client),
            fast: client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;

    fn slot(provider: ScriptedProvider, model: &str) -> ProviderSlot {
        ProviderSlot::new(Arc::new(provider), model)
    }

    #[tokio::test]
    async fn test_first_slot_wins() {
        let client = LlmClient::new(
            vec![
                slot(ScriptedProvider::named("gemini").default_reply("primary"), "g"),
                slot(ScriptedProvider::named("groq").default_reply("fallback"), "q"),
            ],
            RetryPolicy::no_retry(),
        );
        assert_eq!(client.complete("hello").await.unwrap(), "primary");
    }

    #[tokio::test]
    async fn test_falls_back_on_failure() {
        let failing = ScriptedProvider::named("gemini").failing();
        let backup = ScriptedProvider::named("groq").default_reply("from groq");
        let client = LlmClient::new(
            vec![slot(failing.clone(), "g"), slot(backup.clone(), "q")],
            RetryPolicy::fast(),
        );

        assert_eq!(client.complete("hello").await.unwrap(), "from groq");
        // request failures are retried before falling back
        assert_eq!(failing.call_count(), 3);
        assert_eq!(backup.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_reply_falls_back() {
        let client = LlmClient::new(
            vec![
                slot(ScriptedProvider::named("gemini").default_reply("   "), "g"),
                slot(ScriptedProvider::named("groq").default_reply("ok"), "q"),
            ],
            RetryPolicy::no_retry(),
        );
        assert_eq!(client.complete("hello").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_all_providers_fail() {
        let client = LlmClient::new(
            vec![slot(ScriptedProvider::named("groq").failing(), "q")],
            RetryPolicy::no_retry(),
        );
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, LLMError::AllProvidersFailed(ref msg) if msg.contains("groq/q")));
    }

    #[tokio::test]
    async fn test_no_slots() {
        let client = LlmClient::new(Vec::new(), RetryPolicy::no_retry());
        assert!(matches!(
            client.complete("hello").await,
            Err(LLMError::ConfigurationError(_))
        ));
    }

    #[tokio::test]
    async fn test_system_prompt_forwarded() {
        let provider = ScriptedProvider::named("groq").default_reply("ok");
        let client = LlmClient::new(vec![slot(provider.clone(), "q")], RetryPolicy::no_retry());
        client.complete_with_system("be strict", "rate it").await.unwrap();
        assert_eq!(provider.prompts(), vec!["rate it".to_string()]);
    }

    #[test]
    fn test_from_settings_ordering() {
        let settings = Settings::builder()
            .groq_api_key("gsk")
            .gemini_api_key("gm")
            .build()
            .unwrap();
        let clients = LlmClients::from_settings(&settings).unwrap();

        assert_eq!(
            clients.primary.slot_labels(),
            vec!["gemini/gemini-2.5-flash", "groq/llama-3.3-70b-versatile"]
        );
        assert_eq!(
            clients.fast.slot_labels(),
            vec!["groq/llama-3.1-8b-instant", "gemini/gemini-2.5-flash"]
        );
    }

    #[test]
    fn test_from_settings_groq_only() {
        let settings = Settings::builder().groq_api_key("gsk").build().unwrap();
        let clients = LlmClients::from_settings(&settings).unwrap();
        assert_eq!(clients.primary.slot_labels(), vec!["groq/llama-3.3-70b-versatile"]);
    }
}
