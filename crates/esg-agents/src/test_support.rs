//! Fixtures shared by the agent tests

use crate::AgentContext;
use esg_core::{Evidence, Relationship, SourceType};
use esg_llm::testing::ScriptedProvider;
use esg_sources::testing::StaticSource;
use esg_sources::{RawArticle, SourceHub};
use std::sync::Arc;

/// Context backed by a scripted LLM and one static news source
pub(crate) fn context(provider: ScriptedProvider, articles: Vec<RawArticle>) -> AgentContext {
    let hub = SourceHub::new(vec![Arc::new(StaticSource::new("wire", articles))]);
    AgentContext::new(provider.into_clients(), hub).unwrap()
}

pub(crate) fn raw(title: &str, snippet: &str, url: &str, date: Option<&str>) -> RawArticle {
    RawArticle {
        source_name: "Reuters".to_string(),
        url: url.to_string(),
        title: title.to_string(),
        snippet: snippet.to_string(),
        content: String::new(),
        date: date.map(str::to_string),
        source_type: None,
        data_source_api: "static".to_string(),
    }
}

pub(crate) fn evidence(
    id: usize,
    source_type: SourceType,
    relationship: Relationship,
    snippet: &str,
) -> Evidence {
    Evidence {
        source_id: format!("ev_{id:03}"),
        source_name: format!("Source {id}"),
        source_type,
        url: format!("https://example.com/{id}"),
        title: format!("Item {id}"),
        snippet: snippet.to_string(),
        date: None,
        relationship,
        freshness_days: 30,
        data_source_api: "static".to_string(),
    }
}
