//! Settings loaded from the environment
//!
//! Values come from process environment variables, optionally seeded from a
//! `.env` file in the working directory. Empty variables count as unset.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Settings validation error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Neither Groq nor Gemini is configured
    #[error("No LLM provider configured: set GROQ_API_KEY or GEMINI_API_KEY")]
    NoLlmProvider,

    /// A variable could not be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    /// Other configuration problem
    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// Result type for settings operations
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Runtime settings for the detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub groq_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub news_api_key: Option<String>,
    pub newsdata_api_key: Option<String>,

    /// Groq model used for reasoning-heavy prompts
    pub groq_model: String,

    /// Groq model used for short classification prompts
    pub groq_fast_model: String,

    pub gemini_model: String,

    /// Attempts per provider before falling back to the next one
    pub llm_max_retries: u32,

    /// Initial backoff between LLM attempts
    pub retry_backoff_base: Duration,

    /// HTTP timeout for LLM calls
    pub llm_timeout: Duration,

    /// Where `analyze` writes its report files
    pub reports_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            gemini_api_key: None,
            news_api_key: None,
            newsdata_api_key: None,
            groq_model: "llama-3.3-70b-versatile".to_string(),
            groq_fast_model: "llama-3.1-8b-instant".to_string(),
            gemini_model: "gemini-2.5-flash".to_string(),
            llm_max_retries: 3,
            retry_backoff_base: Duration::from_secs(1),
            llm_timeout: Duration::from_secs(300),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

impl Settings {
    /// Create a new settings builder
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Load settings from `.env` (if present) and the process environment
    ///
    /// Does not validate; callers that need an LLM call [`Settings::validate`].
    pub fn from_env() -> Result<Self> {
        // A missing .env file is normal
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let llm_max_retries = match get("LLM_MAX_RETRIES") {
            Some(raw) => parse_var("LLM_MAX_RETRIES", &raw)?,
            None => defaults.llm_max_retries,
        };
        let llm_timeout = match get("LLM_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_var("LLM_TIMEOUT_SECS", &raw)?),
            None => defaults.llm_timeout,
        };

        Ok(Self {
            groq_api_key: get("GROQ_API_KEY"),
            gemini_api_key: get("GEMINI_API_KEY"),
            news_api_key: get("NEWS_API_KEY"),
            newsdata_api_key: get("NEWSDATA_API_KEY"),
            groq_model: get("GROQ_MODEL").unwrap_or(defaults.groq_model),
            groq_fast_model: get("GROQ_FAST_MODEL").unwrap_or(defaults.groq_fast_model),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            llm_max_retries,
            retry_backoff_base: defaults.retry_backoff_base,
            llm_timeout,
            reports_dir: get("REPORTS_DIR").map_or(defaults.reports_dir, PathBuf::from),
        })
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.groq_api_key.is_none() && self.gemini_api_key.is_none() {
            return Err(SettingsError::NoLlmProvider);
        }

        if self.llm_max_retries == 0 {
            return Err(SettingsError::Invalid(
                "LLM_MAX_RETRIES must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get retry backoff duration for attempt number
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff_base * 2_u32.pow(attempt)
    }

    /// Whether at least one evidence source has credentials
    pub fn has_news_source(&self) -> bool {
        self.news_api_key.is_some() || self.newsdata_api_key.is_some()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| SettingsError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
        })
}

/// Builder for Settings
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    groq_api_key: Option<String>,
    gemini_api_key: Option<String>,
    news_api_key: Option<String>,
    newsdata_api_key: Option<String>,
    groq_model: Option<String>,
    groq_fast_model: Option<String>,
    gemini_model: Option<String>,
    llm_max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    llm_timeout: Option<Duration>,
    reports_dir: Option<PathBuf>,
}

impl SettingsBuilder {
    pub fn groq_api_key(mut self, key: impl Into<String>) -> Self {
        self.groq_api_key = Some(key.into());
        self
    }

    pub fn gemini_api_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_api_key = Some(key.into());
        self
    }

    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    pub fn newsdata_api_key(mut self, key: impl Into<String>) -> Self {
        self.newsdata_api_key = Some(key.into());
        self
    }

    pub fn groq_model(mut self, model: impl Into<String>) -> Self {
        self.groq_model = Some(model.into());
        self
    }

    pub fn groq_fast_model(mut self, model: impl Into<String>) -> Self {
        self.groq_fast_model = Some(model.into());
        self
    }

    pub fn gemini_model(mut self, model: impl Into<String>) -> Self {
        self.gemini_model = Some(model.into());
        self
    }

    /// Set maximum attempts per provider
    pub fn llm_max_retries(mut self, retries: u32) -> Self {
        self.llm_max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set LLM request timeout
    pub fn llm_timeout(mut self, duration: Duration) -> Self {
        self.llm_timeout = Some(duration);
        self
    }

    pub fn reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reports_dir = Some(dir.into());
        self
    }

    /// Build the settings
    pub fn build(self) -> Result<Settings> {
        let defaults = Settings::default();

        let settings = Settings {
            groq_api_key: self.groq_api_key,
            gemini_api_key: self.gemini_api_key,
            news_api_key: self.news_api_key,
            newsdata_api_key: self.newsdata_api_key,
            groq_model: self.groq_model.unwrap_or(defaults.groq_model),
            groq_fast_model: self.groq_fast_model.unwrap_or(defaults.groq_fast_model),
            gemini_model: self.gemini_model.unwrap_or(defaults.gemini_model),
            llm_max_retries: self.llm_max_retries.unwrap_or(defaults.llm_max_retries),
            retry_backoff_base: self
                .retry_backoff_base
                .unwrap_or(defaults.retry_backoff_base),
            llm_timeout: self.llm_timeout.unwrap_or(defaults.llm_timeout),
            reports_dir: self.reports_dir.unwrap_or(defaults.reports_dir),
        };

        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.groq_model, "llama-3.3-70b-versatile");
        assert_eq!(settings.llm_max_retries, 3);
        assert_eq!(settings.reports_dir, PathBuf::from("reports"));
        assert_eq!(settings.validate(), Err(SettingsError::NoLlmProvider));
    }

    #[test]
    fn test_from_lookup() {
        let settings = Settings::from_lookup(lookup(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("GEMINI_API_KEY", "  "),
            ("LLM_TIMEOUT_SECS", "60"),
            ("REPORTS_DIR", "/tmp/esg"),
        ]))
        .unwrap();

        assert_eq!(settings.groq_api_key.as_deref(), Some("gsk_test"));
        assert!(settings.gemini_api_key.is_none());
        assert_eq!(settings.llm_timeout, Duration::from_secs(60));
        assert_eq!(settings.reports_dir, PathBuf::from("/tmp/esg"));
        assert!(settings.validate().is_ok());
        assert!(!settings.has_news_source());
    }

    #[test]
    fn test_from_lookup_invalid_number() {
        let err = Settings::from_lookup(lookup(&[("LLM_MAX_RETRIES", "many")])).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { ref name, .. } if name == "LLM_MAX_RETRIES"));
    }

    #[test]
    fn test_settings_builder() {
        let settings = Settings::builder()
            .gemini_api_key("gm_test")
            .llm_max_retries(5)
            .llm_timeout(Duration::from_secs(30))
            .build()
            .unwrap();

        assert_eq!(settings.llm_max_retries, 5);
        assert_eq!(settings.llm_timeout, Duration::from_secs(30));
        assert_eq!(settings.gemini_model, "gemini-2.5-flash");
    }

    #[test]
    fn test_builder_rejects_zero_retries() {
        let result = Settings::builder()
            .groq_api_key("gsk_test")
            .llm_max_retries(0)
            .build();
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_retry_backoff() {
        let settings = Settings::default();
        assert_eq!(settings.retry_backoff(0), Duration::from_secs(1));
        assert_eq!(settings.retry_backoff(1), Duration::from_secs(2));
        assert_eq!(settings.retry_backoff(2), Duration::from_secs(4));
    }
}
