//! Fan-out over all configured evidence sources

use crate::{NewsApiClient, NewsDataClient, RawArticle, Result, SearchRequest, SemanticScholarClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use esg_utils::Settings;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A searchable source of evidence articles
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the source reports news rather than papers or filings
    fn is_news(&self) -> bool {
        true
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawArticle>>;
}

/// All configured evidence sources
#[derive(Clone, Default)]
pub struct SourceHub {
    sources: Vec<Arc<dyn EvidenceSource>>,
}

impl SourceHub {
    pub fn new(sources: Vec<Arc<dyn EvidenceSource>>) -> Self {
        Self { sources }
    }

    /// News clients for every configured key, plus Semantic Scholar
    pub fn from_settings(settings: &Settings) -> Self {
        let mut sources: Vec<Arc<dyn EvidenceSource>> = Vec::new();

        if let Some(key) = settings.news_api_key.as_deref() {
            match NewsApiClient::new(key) {
                Ok(client) => sources.push(Arc::new(client)),
                Err(e) => warn!("NewsAPI disabled: {e}"),
            }
        }
        if let Some(key) = settings.newsdata_api_key.as_deref() {
            match NewsDataClient::new(key) {
                Ok(client) => sources.push(Arc::new(client)),
                Err(e) => warn!("NewsData.io disabled: {e}"),
            }
        }
        sources.push(Arc::new(SemanticScholarClient::new()));

        let hub = Self { sources };
        info!("Evidence sources: {}", hub.source_names().join(", "));
        hub
    }

    pub fn with_source(mut self, source: Arc<dyn EvidenceSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn has_news(&self) -> bool {
        self.sources.iter().any(|s| s.is_news())
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Query every source concurrently and merge the results
    ///
    /// A failing source is logged and skipped.
    pub async fn fetch_all(&self, request: &SearchRequest) -> Vec<RawArticle> {
        let results = join_all(self.sources.iter().map(|s| s.search(request))).await;

        let mut batches = Vec::with_capacity(results.len());
        for (source, result) in self.sources.iter().zip(results) {
            match result {
                Ok(articles) => {
                    debug!("{}: {} results", source.name(), articles.len());
                    batches.push(articles);
                }
                Err(e) => warn!("{} search failed: {e}", source.name()),
            }
        }

        aggregate_and_deduplicate(batches)
    }

    /// Results of the first news source that returns anything
    pub async fn search_news(&self, request: &SearchRequest) -> Vec<RawArticle> {
        for source in self.sources.iter().filter(|s| s.is_news()) {
            match source.search(request).await {
                Ok(articles) if !articles.is_empty() => return articles,
                Ok(_) => debug!("{}: no results for {:?}", source.name(), request.query),
                Err(e) => warn!("{} search failed: {e}", source.name()),
            }
        }
        Vec::new()
    }

    /// News published after `since`, merged across news sources
    pub async fn recent_news(
        &self,
        query: &str,
        limit: usize,
        since: DateTime<Utc>,
    ) -> Vec<RawArticle> {
        let request = SearchRequest::new(query, limit).since(since);
        let news: Vec<_> = self.sources.iter().filter(|s| s.is_news()).collect();
        let results = join_all(news.iter().map(|s| s.search(&request))).await;

        let mut batches = Vec::new();
        for (source, result) in news.iter().zip(results) {
            match result {
                Ok(articles) => batches.push(articles),
                Err(e) => warn!("{} search failed: {e}", source.name()),
            }
        }

        let mut merged = aggregate_and_deduplicate(batches);
        merged.truncate(limit);
        merged
    }
}

impl std::fmt::Debug for SourceHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceHub")
            .field("sources", &self.source_names())
            .finish()
    }
}

/// Merge result batches, dropping repeated URLs and sorting newest first
///
/// The first occurrence of a URL wins. Articles without a parseable date sort
/// after all dated ones, keeping their relative order.
pub fn aggregate_and_deduplicate(batches: Vec<Vec<RawArticle>>) -> Vec<RawArticle> {
    let mut seen = HashSet::new();
    let mut merged: Vec<RawArticle> = batches
        .into_iter()
        .flatten()
        .filter(|a| a.url.is_empty() || seen.insert(a.url.clone()))
        .collect();

    merged.sort_by(|a, b| match (a.published_at(), b.published_at()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StaticSource, article};
    use crate::SourceError;

    struct DownSource;

    #[async_trait]
    impl EvidenceSource for DownSource {
        fn name(&self) -> &str {
            "down"
        }

        async fn search(&self, _request: &SearchRequest) -> Result<Vec<RawArticle>> {
            Err(SourceError::RequestFailed {
                source_name: "down".to_string(),
                detail: "connection refused".to_string(),
            })
        }
    }

    #[test]
    fn test_aggregate_dedup_and_order() {
        let merged = aggregate_and_deduplicate(vec![
            vec![
                article("https://a.com/1", Some("2024-01-01")),
                article("https://a.com/2", None),
            ],
            vec![
                article("https://a.com/1", Some("2025-01-01")),
                article("https://a.com/3", Some("2025-06-01")),
            ],
        ]);

        let urls: Vec<&str> = merged.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com/3", "https://a.com/1", "https://a.com/2"]);
        assert_eq!(merged[1].date.as_deref(), Some("2024-01-01"));
    }

    #[tokio::test]
    async fn test_fetch_all_skips_failures() {
        let good = StaticSource::new("good", vec![article("https://x.com/1", Some("2025-01-01"))]);
        let hub = SourceHub::new(vec![Arc::new(DownSource), Arc::new(good.clone())]);

        let results = hub.fetch_all(&SearchRequest::new("BP", 5)).await;
        assert_eq!(results.len(), 1);
        assert_eq!(good.queries(), vec!["BP".to_string()]);
    }

    #[tokio::test]
    async fn test_search_news_first_non_empty() {
        let empty = StaticSource::new("empty", Vec::new());
        let full = StaticSource::new("full", vec![article("https://x.com/1", None)]);
        let papers = StaticSource::new("papers", vec![article("https://p.org/1", None)]).papers();
        let hub = SourceHub::new(vec![
            Arc::new(papers.clone()),
            Arc::new(empty),
            Arc::new(full),
        ]);

        let results = hub.search_news(&SearchRequest::new("Shell", 3)).await;
        assert_eq!(results[0].url, "https://x.com/1");
        assert!(papers.queries().is_empty());
    }

    #[tokio::test]
    async fn test_recent_news_respects_since() {
        let source = StaticSource::new(
            "news",
            vec![
                article("https://x.com/new", Some("2025-05-02T09:00:00Z")),
                article("https://x.com/old", Some("2025-04-01T09:00:00Z")),
            ],
        );
        let hub = SourceHub::new(vec![Arc::new(source)]);
        let since = crate::parse_date("2025-05-01T09:00:00Z").unwrap();

        let results = hub.recent_news("Tesla", 10, since).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://x.com/new");
    }

    #[test]
    fn test_from_settings_without_news_keys() {
        let settings = Settings::builder().groq_api_key("g").build().unwrap();
        let hub = SourceHub::from_settings(&settings);
        assert_eq!(hub.source_names(), vec!["Semantic Scholar"]);
        assert!(!hub.has_news());
    }
}
