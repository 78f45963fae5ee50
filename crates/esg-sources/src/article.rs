//! Source-neutral article and query types

use chrono::{DateTime, Utc};
use esg_core::SourceType;
use serde::{Deserialize, Serialize};

/// One result from an evidence source, before relationship analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    /// Publisher name as reported by the API
    pub source_name: String,
    pub url: String,
    pub title: String,
    /// Short description or abstract
    pub snippet: String,
    /// Longer body text when the API provides it
    #[serde(default)]
    pub content: String,
    /// Publication date as reported by the API
    pub date: Option<String>,
    /// Credibility class assigned by the client, if it knows one
    pub source_type: Option<SourceType>,
    /// API the article came from
    pub data_source_api: String,
}

impl RawArticle {
    /// Title, snippet and URL, lowercased, for keyword matching
    pub fn searchable_text(&self) -> String {
        format!("{} {} {}", self.title, self.snippet, self.url).to_lowercase()
    }

    /// Publication time, if the date parses
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(crate::parse_date)
    }

    /// Explicit source type, or one inferred from URL and publisher name
    pub fn resolved_source_type(&self) -> SourceType {
        self.source_type
            .unwrap_or_else(|| crate::classify_source(&self.url, &self.source_name))
    }
}

/// A search against one or more sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// Maximum results per source
    pub limit: usize,
    /// Only return articles published after this instant
    pub since: Option<DateTime<Utc>>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, limit: usize) -> Self {
        Self {
            query: query.into(),
            limit,
            since: None,
        }
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Whether an article satisfies the `since` bound
    ///
    /// Articles with no parseable date are excluded when a bound is set.
    pub fn accepts(&self, article: &RawArticle) -> bool {
        match self.since {
            Some(since) => article.published_at().is_some_and(|at| at >= since),
            None => true,
        }
    }
}
