//! NewsData.io client, restricted to business and environment coverage

use crate::cache::{CacheKey, ResponseCache};
use crate::hub::EvidenceSource;
use crate::http::{self, SharedRateLimiter};
use crate::{RawArticle, Result, SearchRequest, SourceError};
use async_trait::async_trait;
use esg_core::SourceType;
use esg_core::text::truncate_chars;
use reqwest::Client;
use serde::Deserialize;

pub const NEWSDATA_BASE: &str = "https://newsdata.io/api/1/news";

const SOURCE_NAME: &str = "NewsData.io";

/// Outlets the ESG query is restricted to
const ESG_DOMAINS: &str = "reuters.com,bloomberg.com,theguardian.com,ft.com,wsj.com,cnbc.com";

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Vec<NewsDataArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsDataArticle {
    #[serde(default, rename = "source_name")]
    source_name: Option<String>,
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    pub_date: Option<String>,
}

impl From<NewsDataArticle> for RawArticle {
    fn from(a: NewsDataArticle) -> Self {
        let snippet = a.description.unwrap_or_default();
        Self {
            source_name: a.source_name.unwrap_or_else(|| SOURCE_NAME.to_string()),
            url: a.link,
            title: a.title.unwrap_or_default(),
            snippet: truncate_chars(&snippet, 500).to_string(),
            content: a
                .content
                .map(|c| truncate_chars(&c, 1000).to_string())
                .unwrap_or_default(),
            date: a.pub_date,
            source_type: Some(SourceType::EsgPlatform),
            data_source_api: SOURCE_NAME.to_string(),
        }
    }
}

/// Client for NewsData.io
///
/// The API has no date filter on the free tier, so `since` bounds are
/// applied to the results locally.
pub struct NewsDataClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
    cache: ResponseCache,
}

impl NewsDataClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SourceError::MissingApiKey(SOURCE_NAME.to_string()));
        }

        Ok(Self {
            client: http::http_client(),
            api_key,
            base_url: NEWSDATA_BASE.to_string(),
            rate_limiter: http::rate_limiter(30),
            cache: ResponseCache::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

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
impl EvidenceSource for NewsDataClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    #[tracing::instrument(skip(self), fields(query = %request.query))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawArticle>> {
        let params: Vec<(&str, String)> = vec![
            ("q", request.query.clone()),
            ("language", "en".to_string()),
            ("category", "business,environment".to_string()),
            ("domainurl", ESG_DOMAINS.to_string()),
            ("size", request.limit.min(10).to_string()),
        ];

        let key = CacheKey::new(SOURCE_NAME, "news", &params);
        let value = self
            .cache
            .get_or_fetch(key, || async {
                self.rate_limiter.until_ready().await;
                let builder = self
                    .client
                    .get(&self.base_url)
                    .query(&params)
                    .query(&[("apikey", self.api_key.as_str())]);
                http::get_json(builder, SOURCE_NAME).await
            })
            .await?;

        let response: NewsResponse = http::decode(value, SOURCE_NAME)?;
        let articles: Vec<RawArticle> = response
            .results
            .into_iter()
            .filter(|a| !a.link.is_empty())
            .map(RawArticle::from)
            .filter(|a| request.accepts(a))
            .take(request.limit)
            .collect();

        tracing::debug!("NewsData.io returned {} articles", articles.len());
        Ok(articles)
    }
}
