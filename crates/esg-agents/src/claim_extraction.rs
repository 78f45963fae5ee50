//! Claim extraction from live coverage
//!
//! Fetches a handful of recent articles about the company and the claim, then
//! asks the primary LLM to break the content into structured claims. When no
//! article is found the claim text itself is analysed.

use crate::json::{lenient_f64, lenient_u32, parse_json_reply, scalar_string};
use crate::{AgentContext, names, prompts};
use async_trait::async_trait;
use esg_core::text::truncate_chars;
use esg_core::{Agent, AgentOutput, EsgState, Result};
use esg_sources::{RawArticle, SearchRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

const FUTURE_MARKERS: &[&str] = &["will", "plans to", "aims to", "committed to", "by 20", "target"];

/// One verifiable ESG statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub claim_id: u32,
    #[serde(default)]
    pub claim_text: String,
    /// Environmental, Social or Governance
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub metric: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub timeline: Option<String>,
    /// Achievement, Target, Policy or Certification
    #[serde(default)]
    pub claim_type: String,
    /// 0-10, higher is more specific
    #[serde(default, deserialize_with = "lenient_f64")]
    pub specificity_score: f64,
}

impl Claim {
    /// A single claim standing in for the raw statement when extraction found none
    pub fn from_statement(text: &str) -> Self {
        let lower = text.to_lowercase();
        let claim_type = if FUTURE_MARKERS.iter().any(|m| lower.contains(m)) {
            "Target"
        } else {
            "Achievement"
        };

        Self {
            claim_id: 1,
            claim_text: text.to_string(),
            category: "Environmental".to_string(),
            subcategory: String::new(),
            metric: None,
            timeline: None,
            claim_type: claim_type.to_string(),
            specificity_score: 0.0,
        }
    }
}

/// Payload of the claim extraction agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedClaims {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub claims: Vec<Claim>,
    /// Why the list is empty, when extraction failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of live articles the content was built from
    #[serde(default)]
    pub articles_used: usize,
}

/// Claims extracted for this analysis, or the raw statement as one claim
pub fn claims_in(state: &EsgState) -> Vec<Claim> {
    crate::report::<ExtractedClaims>(state, names::CLAIM_EXTRACTION)
        .map(|r| r.claims)
        .filter(|claims| !claims.is_empty())
        .unwrap_or_else(|| vec![Claim::from_statement(&state.claim)])
}

/// The first extracted claim, or the raw statement
pub fn primary_claim(state: &EsgState) -> Claim {
    claims_in(state)
        .into_iter()
        .next()
        .unwrap_or_else(|| Claim::from_statement(&state.claim))
}

/// Extracts structured claims with the primary LLM
pub struct ClaimExtractionAgent {
    ctx: AgentContext,
}

impl ClaimExtractionAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    async fn live_articles(&self, company: &str, claim: &str) -> Vec<RawArticle> {
        let query =
            format!("\"{company}\" AND ({claim}) AND (ESG OR sustainability OR environment)");
        self.ctx
            .sources()
            .search_news(&SearchRequest::new(query, 5))
            .await
    }
}

/// Text handed to the LLM: up to three articles, or the claim alone
fn compose_content(company: &str, claim: &str, articles: &[RawArticle]) -> String {
    if articles.is_empty() {
        return format!("Company: {company}\nClaim: {claim}");
    }

    let mut content = format!("Company: {company}\n\nClaim to verify: {claim}\n\nRecent Articles:\n\n");
    for (i, article) in articles.iter().take(3).enumerate() {
        content.push_str(&format!("Article {}:\n", i + 1));
        content.push_str(&format!("Title: {}\n", article.title));
        content.push_str(&format!("Description: {}\n", article.snippet));
        content.push_str(&format!("Content: {}\n", truncate_chars(&article.content, 500)));
        content.push_str(&format!(
            "Published: {}\n\n",
            article.date.as_deref().unwrap_or("N/A")
        ));
    }
    content
}

#[async_trait]
impl Agent for ClaimExtractionAgent {
    fn name(&self) -> &str {
        names::CLAIM_EXTRACTION
    }

    #[tracing::instrument(skip_all, fields(company = %state.company))]
    async fn run(&self, state: &mut EsgState) -> Result<AgentOutput> {
        let articles = self.live_articles(&state.company, &state.claim).await;
        if articles.is_empty() {
            info!("No live articles found, analysing the claim text");
        } else {
            info!("Found {} live articles", articles.len());
        }

        let content = compose_content(&state.company, &state.claim, &articles);
        let prompt = self.ctx.render(
            prompts::CLAIM_EXTRACTION,
            &json!({ "company": state.company, "content": content }),
        )?;
        let reply = self.ctx.primary().complete(&prompt).await?;

        let mut extracted = match parse_json_reply::<ExtractedClaims>(&reply) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Claim extraction reply was not valid JSON: {e}");
                ExtractedClaims {
                    error: Some(format!("Parsing failed: {e}")),
                    ..ExtractedClaims::default()
                }
            }
        };
        if extracted.company.is_empty() {
            extracted.company.clone_from(&state.company);
        }
        extracted.articles_used = articles.len().min(3);

        info!("Extracted {} claims", extracted.claims.len());
        Ok(AgentOutput::success(names::CLAIM_EXTRACTION, serde_json::to_value(&extracted)?, 0.8).live())
    }
}
