//! NewsAPI client (`/v2/everything`)

use crate::cache::{CacheKey, ResponseCache};
use crate::hub::EvidenceSource;
use crate::http::{self, SharedRateLimiter};
use crate::{RawArticle, Result, SearchRequest, SourceError, news_source_tier};
use async_trait::async_trait;
use esg_core::text::truncate_chars;
use reqwest::Client;
use serde::Deserialize;

/// Production endpoint
pub const NEWSAPI_BASE: &str = "https://newsapi.org/v2/everything";

const SOURCE_NAME: &str = "NewsAPI";

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    #[serde(default)]
    source: NewsApiSource,
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NewsApiSource {
    #[serde(default)]
    name: Option<String>,
}

impl From<NewsApiArticle> for RawArticle {
    fn from(a: NewsApiArticle) -> Self {
        let source_name = a.source.name.unwrap_or_else(|| "Unknown".to_string());
        let snippet = a.description.unwrap_or_default();
        Self {
            source_type: Some(news_source_tier(&source_name)),
            source_name,
            url: a.url,
            title: a.title.unwrap_or_default(),
            content: a
                .content
                .map(|c| truncate_chars(&c, 1000).to_string())
                .unwrap_or_default(),
            snippet: truncate_chars(&snippet, 500).to_string(),
            date: a.published_at,
            data_source_api: SOURCE_NAME.to_string(),
        }
    }
}

/// Client for the NewsAPI article search
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
    cache: ResponseCache,
}

impl NewsApiClient {
    /// Create a client, rejecting an empty key
    ///
    /// Defaults to 30 requests per minute.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SourceError::MissingApiKey(SOURCE_NAME.to_string()));
        }

        Ok(Self {
            client: http::http_client(),
            api_key,
            base_url: NEWSAPI_BASE.to_string(),
            rate_limiter: http::rate_limiter(30),
            cache: ResponseCache::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Requests per minute
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limiter = http::rate_limiter(per_minute);
        self
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = cache;
        self
    }
}

#[async_trait]
impl EvidenceSource for NewsApiClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    #[tracing::instrument(skip(self), fields(query = %request.query))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawArticle>> {
        let mut params: Vec<(&str, String)> = vec![
            ("q", request.query.clone()),
            ("language", "en".to_string()),
            ("sortBy", "publishedAt".to_string()),
            ("pageSize", request.limit.to_string()),
        ];
        if let Some(since) = request.since {
            params.push(("from", since.format("%Y-%m-%dT%H:%M:%S").to_string()));
        }

        let key = CacheKey::new(SOURCE_NAME, "everything", &params);
        let value = self
            .cache
            .get_or_fetch(key, || async {
                self.rate_limiter.until_ready().await;
                let builder = self
                    .client
                    .get(&self.base_url)
                    .query(&params)
                    .query(&[("apiKey", self.api_key.as_str())]);
                http::get_json(builder, SOURCE_NAME).await
            })
            .await?;

        let response: EverythingResponse = http::decode(value, SOURCE_NAME)?;
        let articles: Vec<RawArticle> = response
            .articles
            .into_iter()
            .filter(|a| !a.url.is_empty())
            .map(RawArticle::from)
            .filter(|a| request.accepts(a))
            .take(request.limit)
            .collect();

        tracing::debug!("NewsAPI returned {} articles", articles.len());
        Ok(articles)
    }
}
