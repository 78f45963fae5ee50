//! Evidence retrieval and relationship tagging
//!
//! Queries every configured source for the primary claim, drops results that
//! are about some other company, and asks the fast LLM how each remaining item
//! relates to the claim. Retrieved items are appended to `state.evidence`.

use crate::claim_extraction::primary_claim;
use crate::{AgentContext, names, prompts};
use async_trait::async_trait;
use chrono::Utc;
use esg_core::state::UNKNOWN_FRESHNESS_DAYS;
use esg_core::text::truncate_chars;
use esg_core::{Agent, AgentOutput, EsgState, Evidence, Relationship, Result};
use esg_sources::classify::domain_of;
use esg_sources::{RawArticle, SearchRequest, freshness_days};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Results requested from each source
const RESULTS_PER_SOURCE: usize = 5;

/// Relationship calls in flight at once
const RELATIONSHIP_CONCURRENCY: usize = 4;

/// Snippets shorter than this are tagged Neutral without asking the LLM
const MIN_SNIPPET_CHARS: usize = 20;

/// Keyword hits that make an item relevant without naming the company
const MIN_KEYWORD_HITS: usize = 3;

/// Companies whose names mark an item as being about someone else
const KNOWN_COMPANIES: &[&str] = &[
    "apple",
    "tesla",
    "microsoft",
    "google",
    "amazon",
    "meta",
    "facebook",
    "shell",
    "exxon",
    "chevron",
    "bp",
    "totalenergies",
    "conocophillips",
    "coca-cola",
    "pepsi",
    "nestle",
    "unilever",
    "nike",
    "adidas",
    "puma",
    "walmart",
    "target",
    "costco",
    "ford",
    "gm",
    "volkswagen",
    "toyota",
];

/// Aggregate quality of the retrieved evidence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub total_sources: usize,
    pub independent_sources: usize,
    pub premium_sources: usize,
    /// Mean age in days, 999 when nothing was found
    pub average_freshness_days: f64,
    /// Number of distinct source types
    pub source_diversity: usize,
    /// `min(100, 20 * source_diversity)`
    pub diversity_score: u32,
    pub distinct_domains: usize,
    /// Fewer than three independent sources
    pub evidence_gap: bool,
    pub source_type_breakdown: BTreeMap<String, usize>,
    pub api_breakdown: BTreeMap<String, usize>,
}

impl QualityMetrics {
    pub fn from_evidence(evidence: &[Evidence]) -> Self {
        let independent_sources = evidence
            .iter()
            .filter(|e| e.source_type.is_independent())
            .count();
        let premium_sources = evidence.iter().filter(|e| e.source_type.is_premium()).count();

        let average_freshness_days = if evidence.is_empty() {
            f64::from(UNKNOWN_FRESHNESS_DAYS)
        } else {
            let total: f64 = evidence.iter().map(|e| f64::from(e.freshness_days)).sum();
            (total / evidence.len() as f64 * 10.0).round() / 10.0
        };

        let mut source_type_breakdown = BTreeMap::new();
        let mut api_breakdown = BTreeMap::new();
        for item in evidence {
            *source_type_breakdown
                .entry(item.source_type.label().to_string())
                .or_insert(0) += 1;
            *api_breakdown.entry(item.data_source_api.clone()).or_insert(0) += 1;
        }

        let distinct_domains = evidence
            .iter()
            .filter_map(|e| domain_of(&e.url))
            .collect::<HashSet<_>>()
            .len();
        let source_diversity = source_type_breakdown.len();

        Self {
            total_sources: evidence.len(),
            independent_sources,
            premium_sources,
            average_freshness_days,
            source_diversity,
            diversity_score: (source_diversity as u32 * 20).min(100),
            distinct_domains,
            evidence_gap: independent_sources < 3,
            source_type_breakdown,
            api_breakdown,
        }
    }
}

/// Payload of the evidence retrieval agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceReport {
    pub claim_id: u32,
    pub query: String,
    /// Items returned by the sources before the relevance filter
    pub retrieved: usize,
    /// Items dropped as being about another company
    pub filtered_out: usize,
    pub evidence: Vec<Evidence>,
    pub quality_metrics: QualityMetrics,
}

/// Lowercased claim words longer than three characters
fn claim_keywords(claim: &str) -> Vec<String> {
    let mut keywords: Vec<String> = claim
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation() && c != '%'))
        .filter(|w| w.chars().count() > 3)
        .map(str::to_string)
        .collect();
    keywords.dedup();
    keywords
}

/// Whole-word occurrences of `name` in already lowercased text
fn mentions(text: &str, name: &str) -> usize {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '&'))
        .filter(|word| *word == name)
        .count()
}

/// Whether an item is about the target company
///
/// An item naming the company is always kept. Otherwise it needs several
/// claim keywords and must not be mainly about another known company.
pub fn is_relevant(article: &RawArticle, company: &str, keywords: &[String]) -> bool {
    let text = format!("{} {} {}", article.title, article.snippet, article.content).to_lowercase();
    let company = company.to_lowercase();

    let target_mentions = text.matches(company.as_str()).count();
    if target_mentions > 0 {
        return true;
    }

    let keyword_hits = keywords.iter().filter(|k| text.contains(k.as_str())).count();
    if keyword_hits < MIN_KEYWORD_HITS {
        return false;
    }

    !KNOWN_COMPANIES
        .iter()
        .filter(|other| !company.contains(*other))
        .any(|other| mentions(&text, other) > target_mentions)
}

/// Gathers evidence for the primary claim from every source
pub struct EvidenceRetrievalAgent {
    ctx: AgentContext,
}

impl EvidenceRetrievalAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    async fn relationship(&self, claim: &str, text: &str) -> Relationship {
        if text.trim().chars().count() < MIN_SNIPPET_CHARS {
            return Relationship::Neutral;
        }

        let prompt = match self.ctx.render(
            prompts::EVIDENCE_RELATIONSHIP,
            &json!({ "claim": claim, "evidence": text }),
        ) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!("Could not render relationship prompt: {e}");
                return Relationship::Neutral;
            }
        };

        match self.ctx.fast().complete(&prompt).await {
            Ok(reply) => Relationship::from_reply(&reply),
            Err(e) => {
                debug!("Relationship check failed, treating as Neutral: {e}");
                Relationship::Neutral
            }
        }
    }
}

fn evidence_text(article: &RawArticle) -> &str {
    if article.snippet.trim().is_empty() {
        &article.content
    } else {
        &article.snippet
    }
}

#[async_trait]
impl Agent for EvidenceRetrievalAgent {
    fn name(&self) -> &str {
        names::EVIDENCE_RETRIEVAL
    }

    #[tracing::instrument(skip_all, fields(company = %state.company))]
    async fn run(&self, state: &mut EsgState) -> Result<AgentOutput> {
        let claim = primary_claim(state);
        let query = format!(
            "\"{}\" {} {}",
            state.company,
            claim.category,
            truncate_chars(&claim.claim_text, 50)
        );
        info!("Retrieving evidence: {query}");

        let articles = self
            .ctx
            .sources()
            .fetch_all(&SearchRequest::new(query.clone(), RESULTS_PER_SOURCE))
            .await;
        let retrieved = articles.len();

        let keywords = claim_keywords(&claim.claim_text);
        let relevant: Vec<RawArticle> = articles
            .into_iter()
            .filter(|a| is_relevant(a, &state.company, &keywords))
            .collect();
        let filtered_out = retrieved - relevant.len();
        if filtered_out > 0 {
            info!("Dropped {filtered_out} results about other companies");
        }

        let claim_text = claim.claim_text.as_str();
        let pending: Vec<_> = relevant
            .iter()
            .map(|article| self.relationship(claim_text, evidence_text(article)))
            .collect();
        let relationships: Vec<Relationship> = stream::iter(pending)
            .buffered(RELATIONSHIP_CONCURRENCY)
            .collect()
            .await;

        let now = Utc::now();
        let offset = state.evidence.len();
        let evidence: Vec<Evidence> = relevant
            .iter()
            .zip(relationships)
            .enumerate()
            .map(|(i, (article, relationship))| Evidence {
                source_id: format!("ev_{:03}", offset + i + 1),
                source_name: article.source_name.clone(),
                source_type: article.resolved_source_type(),
                url: article.url.clone(),
                title: article.title.clone(),
                snippet: truncate_chars(evidence_text(article), 500).to_string(),
                date: article.date.clone(),
                relationship,
                freshness_days: freshness_days(article.date.as_deref(), now),
                data_source_api: article.data_source_api.clone(),
            })
            .collect();

        let quality_metrics = QualityMetrics::from_evidence(&evidence);
        if quality_metrics.evidence_gap {
            warn!(
                "Evidence gap: only {} independent sources",
                quality_metrics.independent_sources
            );
        }
        info!("Retrieved {} evidence items", evidence.len());

        state.evidence.extend(evidence.iter().cloned());

        let report = EvidenceReport {
            claim_id: claim.claim_id,
            query,
            retrieved,
            filtered_out,
            evidence,
            quality_metrics,
        };
        Ok(AgentOutput::success(names::EVIDENCE_RETRIEVAL, serde_json::to_value(&report)?, 0.7).live())
    }

    fn failure_confidence(&self) -> f64 {
        0.3
    }
}
