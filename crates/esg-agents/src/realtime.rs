//! Last-24-hours news monitor

use crate::{AgentContext, names};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use esg_core::text::truncate_chars;
use esg_core::{Agent, AgentOutput, EsgState, Evidence, Relationship, Result};
use esg_sources::freshness_days;
use serde::{Deserialize, Serialize};
use tracing::info;

const WINDOW_HOURS: i64 = 24;
const MAX_ARTICLES: usize = 10;

/// Source name recorded on evidence found by the monitor
pub const REALTIME_SOURCE: &str = "realtime_news";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakingArticle {
    pub title: String,
    pub url: String,
    pub publisher: String,
    pub published: Option<String>,
}

/// Payload of the realtime monitor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealtimeReport {
    pub query: String,
    pub window_hours: i64,
    pub articles_found: usize,
    pub articles: Vec<BreakingArticle>,
}

/// Appends news from the last day to the evidence
pub struct RealtimeMonitorAgent {
    ctx: AgentContext,
}

impl RealtimeMonitorAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Agent for RealtimeMonitorAgent {
    fn name(&self) -> &str {
        names::REALTIME_MONITORING
    }

    #[tracing::instrument(skip_all, fields(company = %state.company))]
    async fn run(&self, state: &mut EsgState) -> Result<AgentOutput> {
        let query = format!("ESG sustainability {}", state.company);
        let now = Utc::now();
        let articles = self
            .ctx
            .sources()
            .recent_news(&query, MAX_ARTICLES, now - Duration::hours(WINDOW_HOURS))
            .await;
        info!("{} articles in the last {WINDOW_HOURS}h", articles.len());

        let offset = state.evidence.len();
        for (i, article) in articles.iter().enumerate() {
            state.evidence.push(Evidence {
                source_id: format!("rt_{:03}", offset + i + 1),
                source_name: REALTIME_SOURCE.to_string(),
                source_type: article.resolved_source_type(),
                url: article.url.clone(),
                title: article.title.clone(),
                snippet: truncate_chars(&article.snippet, 500).to_string(),
                date: article.date.clone(),
                relationship: Relationship::Neutral,
                freshness_days: freshness_days(article.date.as_deref(), now),
                data_source_api: article.data_source_api.clone(),
            });
        }

        let confidence = if articles.is_empty() { 0.5 } else { 0.8 };
        let report = RealtimeReport {
            query,
            window_hours: WINDOW_HOURS,
            articles_found: articles.len(),
            articles: articles
                .into_iter()
                .map(|a| BreakingArticle {
                    title: a.title,
                    url: a.url,
                    publisher: a.source_name,
                    published: a.date,
                })
                .collect(),
        };
        Ok(AgentOutput::success(names::REALTIME_MONITORING, serde_json::to_value(&report)?, confidence).live())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, raw};
    use esg_llm::testing::ScriptedProvider;

    #[tokio::test]
    async fn test_only_recent_articles_become_evidence() {
        let fresh = (Utc::now() - Duration::hours(2)).to_rfc3339();
        let stale = (Utc::now() - Duration::days(3)).to_rfc3339();
        let agent = RealtimeMonitorAgent::new(context(
            ScriptedProvider::new(),
            vec![
                raw("Shell updates climate plan", "Board vote today", "https://example.com/new", Some(&fresh)),
                raw("Shell older story", "Last week", "https://example.com/old", Some(&stale)),
            ],
        ));
        let mut state = EsgState::new("Shell", "Net zero by 2050", "Energy");

        let output = agent.run(&mut state).await.unwrap();

        assert!((output.confidence - 0.8).abs() < f64::EPSILON);
        assert!(output.live_fetch);
        assert_eq!(state.evidence.len(), 1);
        assert_eq!(state.evidence[0].source_name, REALTIME_SOURCE);
        assert_eq!(state.evidence[0].freshness_days, 0);
        assert_eq!(output.output["articles_found"], 1);
    }

    #[tokio::test]
    async fn test_quiet_day_lowers_confidence() {
        let agent = RealtimeMonitorAgent::new(context(ScriptedProvider::new(), Vec::new()));
        let mut state = EsgState::new("Shell", "Net zero by 2050", "Energy");

        let output = agent.run(&mut state).await.unwrap();
        assert!((output.confidence - 0.5).abs() < f64::EPSILON);
        assert!(state.evidence.is_empty());
    }
}
