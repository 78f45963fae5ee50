//! Semantic Scholar paper search
//!
//! The graph API needs no key for light use. Papers only carry a year, so
//! the date is reported as January 1st of that year.

use crate::cache::{CacheKey, ResponseCache};
use crate::hub::EvidenceSource;
use crate::http::{self, SharedRateLimiter};
use crate::{RawArticle, Result, SearchRequest};
use async_trait::async_trait;
use esg_core::SourceType;
use esg_core::text::truncate_chars;
use reqwest::Client;
use serde::Deserialize;

pub const SEMANTIC_SCHOLAR_BASE: &str = "https://api.semanticscholar.org/graph/v1/paper/search";

const SOURCE_NAME: &str = "Semantic Scholar";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<Vec<Paper>>,
}

#[derive(Debug, Deserialize)]
struct Paper {
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "abstract", default)]
    abstract_text: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    authors: Option<Vec<Author>>,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    name: Option<String>,
}

impl From<Paper> for RawArticle {
    fn from(p: Paper) -> Self {
        let authors: Vec<String> = p
            .authors
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| a.name)
            .take(3)
            .collect();
        let abstract_text = p.abstract_text.unwrap_or_default();

        Self {
            source_name: format!("{SOURCE_NAME} (Academic)"),
            url: p.url.unwrap_or_default(),
            title: p.title.unwrap_or_else(|| "Untitled".to_string()),
            snippet: truncate_chars(&abstract_text, 300).to_string(),
            content: authors.join(", "),
            date: p.year.map(|y| format!("{y}-01-01")),
            source_type: Some(SourceType::Academic),
            data_source_api: SOURCE_NAME.to_string(),
        }
    }
}

/// Client for the Semantic Scholar graph API
pub struct SemanticScholarClient {
    client: Client,
    base_url: String,
    rate_limiter: SharedRateLimiter,
    cache: ResponseCache,
}

impl SemanticScholarClient {
    pub fn new() -> Self {
        Self {
            client: http::http_client(),
            base_url: SEMANTIC_SCHOLAR_BASE.to_string(),
            rate_limiter: http::rate_limiter(20),
            cache: ResponseCache::default(),
        }
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

impl Default for SemanticScholarClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EvidenceSource for SemanticScholarClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn is_news(&self) -> bool {
        false
    }

    #[tracing::instrument(skip(self), fields(query = %request.query))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawArticle>> {
        let params: Vec<(&str, String)> = vec![
            ("query", request.query.clone()),
            ("limit", request.limit.to_string()),
            ("fields", "title,abstract,authors,year,url".to_string()),
        ];

        let key = CacheKey::new(SOURCE_NAME, "paper/search", &params);
        let value = self
            .cache
            .get_or_fetch(key, || async {
                self.rate_limiter.until_ready().await;
                let builder = self.client.get(&self.base_url).query(&params);
                http::get_json(builder, SOURCE_NAME).await
            })
            .await?;

        let response: SearchResponse = http::decode(value, SOURCE_NAME)?;
        let papers: Vec<RawArticle> = response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(RawArticle::from)
            .filter(|p| !p.url.is_empty())
            .filter(|p| request.accepts(p))
            .take(request.limit)
            .collect();

        tracing::debug!("Semantic Scholar returned {} papers", papers.len());
        Ok(papers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_search_maps_papers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/paper/search")
                    .query_param("query", "Shell sustainability ESG")
                    .query_param("fields", "title,abstract,authors,year,url");
                then.status(200).json_body(json!({
                    "total": 1,
                    "data": [{
                        "paperId": "abc",
                        "title": "Oil majors and transition claims",
                        "abstract": "We compare stated and realised capex.",
                        "year": 2023,
                        "url": "https://www.semanticscholar.org/paper/abc",
                        "authors": [{ "name": "A. Author" }, { "name": "B. Author" }]
                    }]
                }));
            })
            .await;

        let client = SemanticScholarClient::new()
            .with_base_url(format!("{}/paper/search", server.base_url()));
        let papers = client
            .search(&SearchRequest::new("Shell sustainability ESG", 3))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].date.as_deref(), Some("2023-01-01"));
        assert_eq!(papers[0].source_type, Some(SourceType::Academic));
        assert_eq!(papers[0].content, "A. Author, B. Author");
        assert!(!client.is_news());
    }

    #[tokio::test]
    async fn test_missing_data_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).json_body(json!({ "total": 0 }));
            })
            .await;

        let client =
            SemanticScholarClient::new().with_base_url(format!("{}/search", server.base_url()));
        let papers = client
            .search(&SearchRequest::new("nothing", 3))
            .await
            .unwrap();
        assert!(papers.is_empty());
    }
}
