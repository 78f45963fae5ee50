//! In-memory evidence source for tests

use crate::{EvidenceSource, RawArticle, Result, SearchRequest};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Returns a fixed set of articles and records every query it receives
///
/// The `since` bound of a request is honoured, so realtime checks behave as
/// they would against a live API.
#[derive(Clone)]
pub struct StaticSource {
    name: String,
    articles: Vec<RawArticle>,
    is_news: bool,
    queries: Arc<Mutex<Vec<String>>>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, articles: Vec<RawArticle>) -> Self {
        Self {
            name: name.into(),
            articles,
            is_news: true,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Mark the source as non-news (academic)
    pub fn papers(mut self) -> Self {
        self.is_news = false;
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EvidenceSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_news(&self) -> bool {
        self.is_news
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawArticle>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(request.query.clone());
        }
        Ok(self
            .articles
            .iter()
            .filter(|a| request.accepts(a))
            .take(request.limit)
            .cloned()
            .collect())
    }
}

/// A news article with the given URL and date
pub fn article(url: &str, date: Option<&str>) -> RawArticle {
    RawArticle {
        source_name: "Test Wire".to_string(),
        url: url.to_string(),
        title: format!("Story at {url}"),
        snippet: String::new(),
        content: String::new(),
        date: date.map(str::to_string),
        source_type: None,
        data_source_api: "static".to_string(),
    }
}
