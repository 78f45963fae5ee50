//! Shared HTTP plumbing for the source clients

use crate::{Result, SourceError};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::RequestBuilder;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

pub(crate) type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Per-request timeout for source APIs
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Direct rate limiter allowing `per_minute` requests per minute (at least one)
pub(crate) fn rate_limiter(per_minute: u32) -> SharedRateLimiter {
    let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Send a request and decode a JSON body, mapping failures to [`SourceError`]
pub(crate) async fn get_json(request: RequestBuilder, source_name: &str) -> Result<serde_json::Value> {
    let response = request
        .send()
        .await
        .map_err(|e| SourceError::RequestFailed {
            source_name: source_name.to_string(),
            detail: e.to_string(),
        })?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::ApiError {
            source_name: source_name.to_string(),
            status,
            body,
        });
    }

    response
        .json::<serde_json::Value>()
        .await
        .map_err(|e| SourceError::ParseError {
            source_name: source_name.to_string(),
            detail: e.to_string(),
        })
}

/// Decode a cached JSON value into a typed response
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    source_name: &str,
) -> Result<T> {
    serde_json::from_value(value).map_err(|e| SourceError::ParseError {
        source_name: source_name.to_string(),
        detail: e.to_string(),
    })
}
