//! Source credibility weighting
//!
//! Scores every evidence item from its source class, then adjusts for age,
//! paid placement, company control and primary research. No LLM involved.

use crate::names;
use async_trait::async_trait;
use esg_core::{Agent, AgentOutput, EsgState, Evidence, Result, SourceType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

const PAID_INDICATORS: &[&str] = &[
    "sponsored",
    "advertorial",
    "paid promotion",
    "partner content",
    "in partnership with",
    "brought to you by",
];

const PRIMARY_DATA_TERMS: &[&str] = &["study", "research", "analysis", "data"];

const PRO_COMPANY_TERMS: &[&str] = &["revolutionary", "groundbreaking", "leader", "best", "innovative"];
const CRITICAL_TERMS: &[&str] = &["violation", "accused", "greenwashing", "overstated", "failed"];

/// Keyword lead needed before a source counts as slanted
const BIAS_MARGIN: usize = 2;

/// Starting credibility of a source class
pub fn base_score(source_type: SourceType) -> f64 {
    match source_type {
        SourceType::Academic => 1.0,
        SourceType::GovernmentRegulatory => 0.95,
        SourceType::Ngo => 0.90,
        SourceType::Tier1FinancialMedia => 0.85,
        SourceType::EsgPlatform => 0.75,
        SourceType::GeneralMedia => 0.70,
        SourceType::NewsSource => 0.60,
        SourceType::WebSource => 0.50,
        SourceType::CompanyControlled => 0.35,
        SourceType::SponsoredContent => 0.20,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    ProCompany,
    Critical,
    Neutral,
}

impl Bias {
    /// Compare promotional and critical vocabulary in lowercased text
    pub fn detect(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::Neutral;
        }
        let pro = PRO_COMPANY_TERMS.iter().filter(|t| text.contains(*t)).count();
        let critical = CRITICAL_TERMS.iter().filter(|t| text.contains(*t)).count();

        if pro >= critical + BIAS_MARGIN {
            Self::ProCompany
        } else if critical >= pro + BIAS_MARGIN {
            Self::Critical
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProCompany => "pro_company",
            Self::Critical => "critical",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCredibility {
    pub source_id: String,
    pub source_name: String,
    pub source_type: SourceType,
    pub base_score: f64,
    pub adjustments: Vec<String>,
    pub final_score: f64,
    pub bias: Bias,
}

/// Score one evidence item
pub fn assess(item: &Evidence) -> SourceCredibility {
    let text = format!("{} {} {}", item.source_name, item.title, item.snippet).to_lowercase();
    let base = base_score(item.source_type);
    let mut score = base;
    let mut adjustments = Vec::new();

    if item.freshness_days < 180 {
        score += 0.05;
        adjustments.push("recent (+0.05)".to_string());
    } else if item.freshness_days > 1095 {
        score -= 0.10;
        adjustments.push("older than 3 years (-0.10)".to_string());
    }

    if PAID_INDICATORS.iter().any(|p| text.contains(p)) {
        score -= 0.20;
        adjustments.push("paid content indicators (-0.20)".to_string());
    }

    if item.source_type == SourceType::CompanyControlled {
        score -= 0.15;
        adjustments.push("company-controlled (-0.15)".to_string());
    }

    if matches!(
        item.source_type,
        SourceType::GovernmentRegulatory | SourceType::Academic
    ) && PRIMARY_DATA_TERMS.iter().any(|t| text.contains(t))
    {
        score += 0.05;
        adjustments.push("primary research (+0.05)".to_string());
    }

    SourceCredibility {
        source_id: item.source_id.clone(),
        source_name: item.source_name.clone(),
        source_type: item.source_type,
        base_score: base,
        adjustments,
        final_score: (score.clamp(0.0, 1.0) * 100.0).round() / 100.0,
        bias: Bias::detect(&text),
    }
}

/// Payload of the credibility agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredibilityReport {
    pub assessments: Vec<SourceCredibility>,
    /// Mean final score, 0 when there is no evidence
    pub average_credibility: f64,
    /// Scores of at least 0.8
    pub high_credibility_count: usize,
    pub medium_credibility_count: usize,
    /// Scores below 0.5
    pub low_credibility_count: usize,
    pub bias_distribution: BTreeMap<String, usize>,
}

impl CredibilityReport {
    pub fn from_evidence(evidence: &[Evidence]) -> Self {
        let assessments: Vec<SourceCredibility> = evidence.iter().map(assess).collect();

        let average_credibility = if assessments.is_empty() {
            0.0
        } else {
            let total: f64 = assessments.iter().map(|a| a.final_score).sum();
            (total / assessments.len() as f64 * 100.0).round() / 100.0
        };

        let high = assessments.iter().filter(|a| a.final_score >= 0.8).count();
        let low = assessments.iter().filter(|a| a.final_score < 0.5).count();

        let mut bias_distribution = BTreeMap::new();
        for a in &assessments {
            *bias_distribution.entry(a.bias.as_str().to_string()).or_insert(0) += 1;
        }

        Self {
            high_credibility_count: high,
            medium_credibility_count: assessments.len() - high - low,
            low_credibility_count: low,
            average_credibility,
            bias_distribution,
            assessments,
        }
    }
}

/// Weights the gathered evidence by source credibility
#[derive(Debug, Default)]
pub struct CredibilityAgent;

impl CredibilityAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for CredibilityAgent {
    fn name(&self) -> &str {
        names::CREDIBILITY_ANALYSIS
    }

    async fn run(&self, state: &mut EsgState) -> Result<AgentOutput> {
        let report = CredibilityReport::from_evidence(&state.evidence);
        info!(
            "Average credibility {:.2} over {} sources ({} high, {} low)",
            report.average_credibility,
            report.assessments.len(),
            report.high_credibility_count,
            report.low_credibility_count
        );
        Ok(AgentOutput::success(
            names::CREDIBILITY_ANALYSIS,
            serde_json::to_value(&report)?,
            0.75,
        ))
    }
}
