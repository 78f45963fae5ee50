//! Claim-versus-evidence contradiction analysis

use crate::claim_extraction::primary_claim;
use crate::json::{lenient_f64, lenient_u32, parse_json_reply};
use crate::{AgentContext, names, prompts};
use async_trait::async_trait;
use esg_core::text::truncate_chars;
use esg_core::{Agent, AgentOutput, EsgState, Evidence, Relationship, Result, SourceType};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use std::fmt;
use tracing::{info, warn};

/// Evidence items summarised for the LLM
const SUMMARY_ITEMS: usize = 20;
const ITEMS_PER_TYPE: usize = 5;

/// Overall finding for a claim
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ClaimVerdict {
    Verified,
    Contradicted,
    #[serde(rename = "Partially True")]
    PartiallyTrue,
    #[default]
    Unverifiable,
}

impl ClaimVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "Verified",
            Self::Contradicted => "Contradicted",
            Self::PartiallyTrue => "Partially True",
            Self::Unverifiable => "Unverifiable",
        }
    }

    /// Parse a verdict label, treating anything unrecognised as Unverifiable
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "verified" => Self::Verified,
            "contradicted" => Self::Contradicted,
            "partially true" | "partial" => Self::PartiallyTrue,
            _ => Self::Unverifiable,
        }
    }
}

impl fmt::Display for ClaimVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ClaimVerdict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::parse(&label))
    }
}

/// One mismatch between what the company says and what sources show
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecificContradiction {
    #[serde(default)]
    pub aspect: String,
    #[serde(default)]
    pub claim_states: String,
    #[serde(default)]
    pub evidence_shows: String,
    /// Minor, Moderate or Major
    #[serde(default)]
    pub severity: String,
}

impl SpecificContradiction {
    pub fn is_major(&self) -> bool {
        self.severity.eq_ignore_ascii_case("major")
    }
}

/// Relationship tallies over the evidence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceCounts {
    pub supporting: usize,
    pub contradicting: usize,
    /// Partial and neutral items
    pub neutral: usize,
}

impl EvidenceCounts {
    pub fn tally(evidence: &[Evidence]) -> Self {
        let mut counts = Self::default();
        for item in evidence {
            match item.relationship {
                Relationship::Supports => counts.supporting += 1,
                Relationship::Contradicts => counts.contradicting += 1,
                Relationship::Partial | Relationship::Neutral => counts.neutral += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.supporting + self.contradicting + self.neutral
    }
}

/// Payload of the contradiction agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContradictionReport {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub claim_id: u32,
    #[serde(default)]
    pub overall_verdict: ClaimVerdict,
    /// 0-100
    #[serde(default, deserialize_with = "lenient_f64")]
    pub verification_confidence: f64,
    #[serde(default)]
    pub specific_contradictions: Vec<SpecificContradiction>,
    #[serde(default)]
    pub supportive_evidence: Vec<String>,
    #[serde(default)]
    pub key_issues: Vec<String>,
    #[serde(default)]
    pub evidence_counts: EvidenceCounts,
    /// Verdict derived from relationship counts because the LLM gave none
    #[serde(default)]
    pub fallback: bool,
}

impl ContradictionReport {
    /// Verdict from relationship counts alone
    pub fn from_counts(claim_id: u32, counts: EvidenceCounts) -> Self {
        let total = counts.total();
        let share = |n: usize| {
            if total == 0 {
                0.0
            } else {
                n as f64 / total as f64
            }
        };

        let (overall_verdict, verification_confidence) = if share(counts.contradicting) > 0.3 {
            (ClaimVerdict::Contradicted, 70.0)
        } else if share(counts.supporting) > 0.5 {
            (ClaimVerdict::Verified, 60.0)
        } else if total < 3 {
            (ClaimVerdict::Unverifiable, 30.0)
        } else {
            (ClaimVerdict::PartiallyTrue, 50.0)
        };

        Self {
            claim_id,
            overall_verdict,
            verification_confidence,
            specific_contradictions: Vec::new(),
            supportive_evidence: Vec::new(),
            key_issues: vec!["Automated fallback analysis - LLM unavailable".to_string()],
            evidence_counts: counts,
            fallback: true,
        }
    }

    pub fn contradictions_count(&self) -> usize {
        self.specific_contradictions.len()
    }

    pub fn major_contradictions(&self) -> usize {
        self.specific_contradictions
            .iter()
            .filter(|c| c.is_major())
            .count()
    }
}

/// Evidence grouped by source type for the prompt
fn summarize_evidence(evidence: &[Evidence]) -> String {
    let mut groups: Vec<(SourceType, Vec<&Evidence>)> = Vec::new();
    for item in evidence.iter().take(SUMMARY_ITEMS) {
        match groups.iter_mut().find(|(t, _)| *t == item.source_type) {
            Some((_, items)) => items.push(item),
            None => groups.push((item.source_type, vec![item])),
        }
    }

    if groups.is_empty() {
        return "No evidence was retrieved for this claim.".to_string();
    }

    let mut summary = String::new();
    for (source_type, items) in groups {
        summary.push_str(&format!("\n{source_type} Sources:\n"));
        for item in items.into_iter().take(ITEMS_PER_TYPE) {
            summary.push_str(&format!(
                "- {}: {}\n",
                item.source_name,
                truncate_chars(&item.snippet, 200)
            ));
        }
    }
    summary
}

/// Compares the claim with the retrieved evidence
pub struct ContradictionAgent {
    ctx: AgentContext,
}

impl ContradictionAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Agent for ContradictionAgent {
    fn name(&self) -> &str {
        names::CONTRADICTION_ANALYSIS
    }

    #[tracing::instrument(skip_all, fields(company = %state.company))]
    async fn run(&self, state: &mut EsgState) -> Result<AgentOutput> {
        let claim = primary_claim(state);
        let counts = EvidenceCounts::tally(&state.evidence);

        let prompt = self.ctx.render(
            prompts::CONTRADICTION_ANALYSIS,
            &json!({
                "claim": claim.claim_text,
                "evidence": summarize_evidence(&state.evidence),
                "claim_id": claim.claim_id,
            }),
        )?;

        let report = match self.ctx.primary().complete(&prompt).await {
            Ok(reply) => match parse_json_reply::<ContradictionReport>(&reply) {
                Ok(mut parsed) => {
                    parsed.claim_id = claim.claim_id;
                    parsed.evidence_counts = counts;
                    parsed.fallback = false;
                    parsed
                }
                Err(e) => {
                    warn!("Contradiction reply was not valid JSON, using evidence counts: {e}");
                    ContradictionReport::from_counts(claim.claim_id, counts)
                }
            },
            Err(e) => {
                warn!("Contradiction analysis LLM unavailable, using evidence counts: {e}");
                ContradictionReport::from_counts(claim.claim_id, counts)
            }
        };

        info!(
            "Verdict {} with {} contradictions",
            report.overall_verdict,
            report.contradictions_count()
        );

        let contradictions = report.contradictions_count();
        Ok(
            AgentOutput::success(names::CONTRADICTION_ANALYSIS, serde_json::to_value(&report)?, 0.75)
                .with_detail("contradictions_count", json!(contradictions)),
        )
    }
}
