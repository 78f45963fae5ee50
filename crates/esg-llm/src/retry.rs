//! Exponential backoff for provider calls

use crate::{LLMError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// How often, and how patiently, a provider slot is retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per call, counting the first one
    pub max_attempts: u32,
    /// Wait before the first retry; doubles for every retry after it
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Single attempt
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Three attempts with millisecond waits, for tests
    pub fn fast() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(50),
        }
    }

    /// `LLM_MAX_RETRIES` attempts starting from the configured base backoff
    pub fn from_settings(settings: &esg_utils::Settings) -> Self {
        Self {
            max_attempts: settings.llm_max_retries.max(1),
            base_backoff: settings.retry_backoff(0),
            ..Self::default()
        }
    }

    /// Wait before retry number `retry` (0 for the first retry)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2_u32.saturating_pow(retry);
        self.base_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Rate limits and transport failures are worth another try; bad keys,
    /// unknown models and malformed replies are not
    pub fn is_retryable(error: &LLMError) -> bool {
        matches!(
            error,
            LLMError::RateLimitExceeded(_) | LLMError::RequestFailed(_) | LLMError::HttpError(_)
        )
    }

    /// Run `call` until it succeeds, fails for good, or attempts run out
    pub async fn run<F, Fut, T>(&self, label: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut retry = 0;

        loop {
            match call().await {
                Ok(value) => {
                    if retry > 0 {
                        debug!("{label} succeeded after {retry} retries");
                    }
                    return Ok(value);
                }
                Err(e) if !Self::is_retryable(&e) => return Err(e),
                Err(e) if retry + 1 >= attempts => {
                    warn!("{label} gave up after {attempts} attempts: {e}");
                    return Err(e);
                }
                Err(e) => {
                    let wait = self.backoff(retry);
                    warn!("{label} failed ({e}), retrying in {wait:?}");
                    tokio::time::sleep(wait).await;
                    retry += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(10), Duration::from_secs(30));
        assert_eq!(policy.backoff(40), Duration::from_secs(30));
    }

    #[test]
    fn test_from_settings() {
        let settings = esg_utils::Settings::builder()
            .groq_api_key("k")
            .llm_max_retries(5)
            .build()
            .unwrap();
        let policy = RetryPolicy::from_settings(&settings);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_is_retryable() {
        assert!(RetryPolicy::is_retryable(&LLMError::RateLimitExceeded(
            "429".to_string()
        )));
        assert!(RetryPolicy::is_retryable(&LLMError::RequestFailed(
            "reset".to_string()
        )));
        assert!(!RetryPolicy::is_retryable(&LLMError::AuthenticationFailed));
        assert!(!RetryPolicy::is_retryable(&LLMError::ModelNotFound(
            "llama".to_string()
        )));
    }

    fn counted(
        calls: &Arc<AtomicU32>,
        fail_until: u32,
        error: fn() -> LLMError,
    ) -> impl FnMut() -> std::future::Ready<Result<&'static str>> {
        let calls = Arc::clone(calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n < fail_until { Err(error()) } else { Ok("0.4") })
        }
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let reply = RetryPolicy::fast()
            .run(
                "groq",
                counted(&calls, 2, || LLMError::RateLimitExceeded("429".to_string())),
            )
            .await
            .unwrap();

        assert_eq!(reply, "0.4");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = RetryPolicy::fast()
            .run(
                "groq",
                counted(&calls, u32::MAX, || LLMError::RequestFailed("down".to_string())),
            )
            .await;

        assert!(matches!(result, Err(LLMError::RequestFailed(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = RetryPolicy::fast()
            .run("gemini", counted(&calls, u32::MAX, || LLMError::AuthenticationFailed))
            .await;

        assert!(matches!(result, Err(LLMError::AuthenticationFailed)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
