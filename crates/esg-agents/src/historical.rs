//! Track record: past violations, greenwashing accusations and verified achievements

use crate::{AgentContext, names};
use async_trait::async_trait;
use chrono::Datelike;
use esg_core::text::truncate_chars;
use esg_core::{Agent, AgentOutput, EsgState, Result, SourceType};
use esg_sources::{RawArticle, SearchRequest};
use futures::future::join_all;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;
use tracing::info;

static YEAR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b(20\d{2})\b").ok());

const VIOLATION_TERMS: &[&str] = &["fine", "penalty", "violation", "lawsuit", "settled", "sued"];
const GREENWASHING_TERMS: &[&str] = &["greenwashing", "misleading", "false claim"];
const ACHIEVEMENT_TERMS: &[&str] = &["certified", "award", "recognized", "achieved", "verified"];

const MAX_VIOLATIONS: usize = 10;
const MAX_ACCUSATIONS: usize = 5;
const MAX_ACHIEVEMENTS: usize = 8;

/// Year at which the trend comparison splits old from recent
const RECENT_FROM: i32 = 2020;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub year: Option<i32>,
    pub description: String,
    /// Environmental, Social/Labor, Governance or ESG-Related
    pub violation_type: String,
    pub source: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accusation {
    pub year: Option<i32>,
    pub description: String,
    pub source: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub year: Option<i32>,
    pub description: String,
    pub source: String,
    pub source_type: SourceType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GreenwashingHistory {
    pub accusations: Vec<Accusation>,
    /// Accusations in at least two distinct years
    pub pattern_detected: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalPatterns {
    /// Fewer violations since 2020 than before
    pub improving: bool,
    /// Violations outpace achievements and continue recently
    pub declining: bool,
    /// Repeated greenwashing accusations
    pub reactive: bool,
    pub consistent_behavior: bool,
}

/// Payload of the temporal analysis agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalReport {
    pub company: String,
    pub violations: Vec<Violation>,
    pub greenwashing_history: GreenwashingHistory,
    pub achievements: Vec<Achievement>,
    pub patterns: TemporalPatterns,
    /// 0-100, higher is better
    pub reputation_score: f64,
}

impl HistoricalReport {
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn accusation_count(&self) -> usize {
        self.greenwashing_history.accusations.len()
    }
}

fn contains_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| text.contains(t))
}

fn headline_text(article: &RawArticle) -> String {
    format!("{} {}", article.title, article.snippet).to_lowercase()
}

fn description(article: &RawArticle) -> String {
    let text = if article.title.trim().is_empty() {
        &article.snippet
    } else {
        &article.title
    };
    truncate_chars(text, 200).to_string()
}

/// Publication year, or the first 20xx year mentioned in the headline
fn year_of(article: &RawArticle) -> Option<i32> {
    if let Some(published) = article.published_at() {
        return Some(published.year());
    }
    let text = format!("{} {}", article.title, article.snippet);
    YEAR.as_ref()?
        .captures(&text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// ESG pillar of a violation from its headline
pub fn classify_violation(text: &str) -> &'static str {
    let text = text.to_lowercase();
    if contains_any(&text, &["environmental", "epa", "pollution"]) {
        "Environmental"
    } else if contains_any(&text, &["labor", "worker", "osha"]) {
        "Social/Labor"
    } else if contains_any(&text, &["governance", "board", "sec"]) {
        "Governance"
    } else {
        "ESG-Related"
    }
}

fn detect_patterns(
    violations: &[Violation],
    history: &GreenwashingHistory,
    achievements: &[Achievement],
) -> TemporalPatterns {
    let older = violations
        .iter()
        .filter(|v| v.year.is_some_and(|y| y < RECENT_FROM))
        .count();
    let recent = violations
        .iter()
        .filter(|v| v.year.is_some_and(|y| y >= RECENT_FROM))
        .count();
    let dated_achievements = achievements.iter().any(|a| a.year.is_some());

    TemporalPatterns {
        improving: older > recent,
        declining: dated_achievements && violations.len() > achievements.len() && recent > 0,
        reactive: history.pattern_detected,
        consistent_behavior: true,
    }
}

/// Reputation on 0-100 from the track record
pub fn reputation_score(
    violations: usize,
    accusations: usize,
    achievements: usize,
    patterns: TemporalPatterns,
) -> f64 {
    let mut score = 50.0;
    score -= (5.0 * violations as f64).min(30.0);
    score -= (10.0 * accusations as f64).min(20.0);
    score += (5.0 * achievements as f64).min(25.0);
    if patterns.improving {
        score += 10.0;
    }
    if patterns.declining {
        score -= 15.0;
    }
    if patterns.reactive {
        score -= 10.0;
    }
    score.clamp(0.0, 100.0)
}

/// Searches the company's past for violations, accusations and achievements
pub struct HistoricalAgent {
    ctx: AgentContext,
}

impl HistoricalAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    async fn search(&self, query: String, limit: usize, keep: usize) -> Vec<RawArticle> {
        let mut results = self
            .ctx
            .sources()
            .fetch_all(&SearchRequest::new(query, limit))
            .await;
        results.truncate(keep);
        results
    }

    async fn violations(&self, company: &str) -> Vec<Violation> {
        let queries = [
            format!("\"{company}\" fine OR penalty OR lawsuit environmental"),
            format!("\"{company}\" EPA violation OR OSHA violation"),
            format!("\"{company}\" regulatory action ESG"),
            format!("\"{company}\" scandal OR controversy environmental social"),
        ];
        let batches = join_all(queries.into_iter().map(|q| self.search(q, 3, 5))).await;

        let mut seen = HashSet::new();
        let mut violations = Vec::new();
        for article in batches.into_iter().flatten() {
            let text = headline_text(&article);
            if !contains_any(&text, VIOLATION_TERMS) {
                continue;
            }
            let year = year_of(&article);
            let description = description(&article);
            if !seen.insert((year, truncate_chars(&description, 50).to_string())) {
                continue;
            }
            violations.push(Violation {
                year,
                violation_type: classify_violation(&text).to_string(),
                description,
                source: article.source_name.clone(),
                url: article.url.clone(),
            });
        }
        violations.truncate(MAX_VIOLATIONS);
        violations
    }

    async fn greenwashing_history(&self, company: &str) -> GreenwashingHistory {
        let query = format!("\"{company}\" greenwashing OR misleading OR false claims environmental");
        let accusations: Vec<Accusation> = self
            .search(query, 5, 10)
            .await
            .into_iter()
            .filter(|a| contains_any(&headline_text(a), GREENWASHING_TERMS))
            .take(MAX_ACCUSATIONS)
            .map(|a| Accusation {
                year: year_of(&a),
                description: description(&a),
                source: a.source_name.clone(),
                url: a.url.clone(),
            })
            .collect();

        let years: BTreeSet<i32> = accusations.iter().filter_map(|a| a.year).collect();
        GreenwashingHistory {
            pattern_detected: years.len() >= 2,
            accusations,
        }
    }

    async fn achievements(&self, company: &str) -> Vec<Achievement> {
        let query = format!("\"{company}\" award OR certification ISO OR B-Corp verified achievement");
        self.search(query, 3, 10)
            .await
            .into_iter()
            .filter(|a| contains_any(&headline_text(a), ACHIEVEMENT_TERMS))
            .filter(|a| {
                matches!(
                    a.resolved_source_type(),
                    SourceType::GovernmentRegulatory
                        | SourceType::Academic
                        | SourceType::Tier1FinancialMedia
                )
            })
            .take(MAX_ACHIEVEMENTS)
            .map(|a| Achievement {
                year: year_of(&a),
                description: description(&a),
                source: a.source_name.clone(),
                source_type: a.resolved_source_type(),
            })
            .collect()
    }
}

#[async_trait]
impl Agent for HistoricalAgent {
    fn name(&self) -> &str {
        names::TEMPORAL_ANALYSIS
    }

    #[tracing::instrument(skip_all, fields(company = %state.company))]
    async fn run(&self, state: &mut EsgState) -> Result<AgentOutput> {
        let company = state.company.clone();
        let (violations, greenwashing_history, achievements) = futures::join!(
            self.violations(&company),
            self.greenwashing_history(&company),
            self.achievements(&company),
        );

        let patterns = detect_patterns(&violations, &greenwashing_history, &achievements);
        let reputation_score = reputation_score(
            violations.len(),
            greenwashing_history.accusations.len(),
            achievements.len(),
            patterns,
        );
        info!(
            "{} violations, {} accusations, {} achievements, reputation {reputation_score}",
            violations.len(),
            greenwashing_history.accusations.len(),
            achievements.len()
        );

        let report = HistoricalReport {
            company,
            violations,
            greenwashing_history,
            achievements,
            patterns,
            reputation_score,
        };
        Ok(AgentOutput::success(names::TEMPORAL_ANALYSIS, serde_json::to_value(&report)?, 0.7).live())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, raw};
    use esg_llm::testing::ScriptedProvider;

    async fn analyse(articles: Vec<RawArticle>) -> HistoricalReport {
        let agent = HistoricalAgent::new(context(ScriptedProvider::new(), articles));
        let mut state = EsgState::new("BP", "Net zero by 2050", "Energy");
        let output = agent.run(&mut state).await.unwrap();
        serde_json::from_value(output.output).unwrap()
    }

    #[tokio::test]
    async fn test_repeated_accusations_mark_reactive() {
        let report = analyse(vec![
            raw(
                "BP fined $20m by EPA over refinery pollution",
                "",
                "https://example.com/fine",
                Some("2023-05-01"),
            ),
            raw(
                "BP accused of greenwashing in ad campaign",
                "",
                "https://example.com/ads",
                Some("2022-03-01"),
            ),
            raw(
                "Regulator says BP adverts misleading",
                "",
                "https://example.com/asa",
                Some("2021-07-01"),
            ),
        ])
        .await;

        assert_eq!(report.violation_count(), 1);
        assert_eq!(report.violations[0].violation_type, "Environmental");
        assert_eq!(report.violations[0].year, Some(2023));
        assert_eq!(report.accusation_count(), 2);
        assert!(report.greenwashing_history.pattern_detected);
        assert!(report.patterns.reactive);
        assert!(!report.patterns.improving);
        assert!((report.reputation_score - 15.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_old_violations_and_achievements_improve_reputation() {
        let report = analyse(vec![
            raw(
                "BP plant certified ISO 14001 by auditors",
                "",
                "https://www.reuters.com/iso",
                Some("2019-06-01"),
            ),
            raw(
                "BP settled spill lawsuit",
                "",
                "https://example.com/spill",
                Some("2018-01-01"),
            ),
        ])
        .await;

        assert_eq!(report.violation_count(), 1);
        assert_eq!(report.violations[0].violation_type, "ESG-Related");
        assert_eq!(report.achievements.len(), 1);
        assert!(report.patterns.improving);
        assert!(!report.patterns.declining);
        assert!((report.reputation_score - 60.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_no_history_is_neutral() {
        let report = analyse(Vec::new()).await;
        assert!(report.violations.is_empty());
        assert!((report.reputation_score - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_year_from_headline_when_undated() {
        let article = raw("2016 penalty for BP", "", "https://example.com/p", None);
        assert_eq!(year_of(&article), Some(2016));
    }

    #[test]
    fn test_classify_violation() {
        assert_eq!(classify_violation("OSHA cites worker safety"), "Social/Labor");
        assert_eq!(classify_violation("Board faces governance probe"), "Governance");
        assert_eq!(classify_violation("EPA consent decree"), "Environmental");
    }

    #[test]
    fn test_reputation_is_clamped() {
        let patterns = TemporalPatterns {
            declining: true,
            reactive: true,
            ..TemporalPatterns::default()
        };
        assert!(reputation_score(10, 5, 0, patterns).abs() < f64::EPSILON);
    }
}
