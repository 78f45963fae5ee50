//! Final verdict from the agents' findings
//!
//! The risk scorer sets a baseline level. The rules below then escalate or
//! downgrade it, in priority order:
//!
//! 1. Absolute claim language ("100% sustainable") escalates to HIGH, unless
//!    the claim is dated carbon accounting, which is downgraded to LOW.
//! 2. The historical record (poor reputation with violations, repeated
//!    greenwashing accusations, declining or reactive patterns).
//! 3. Three or more contradictions.
//! 4. Strong disagreement in the debate.
//! 5. Superlatives ("greenest", "world's leading").
//! 6. Vague wording in a high-risk sector.
//!
//! Rules 1 and 2 are exclusive; rules 3 to 6 only escalate a MODERATE level.

use crate::names;
use async_trait::async_trait;
use chrono::Utc;
use esg_agents::HistoricalReport;
use esg_agents::names::{CONTRADICTION_ANALYSIS, TEMPORAL_ANALYSIS};
use esg_core::{Agent, AgentOutput, EsgState, IntelligenceSource, Result, RiskLevel, Verdict};
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

static ABSOLUTE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"100%\s*(sustainable|green|eco|recyclable|renewable|organic|natural)",
        r"(completely|totally|fully|entirely|perfectly|absolutely)\s*(sustainable|green|eco)",
    ]
    .into_iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static CARBON_METRICS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\d+\.?\d*\s*(million|billion|%)|20\d{2}|specific\s+amount").ok()
});

static YEAR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"20\d{2}|in\s+\d{4}").ok());

static SECTOR_METRICS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\d+%|\d+\s*(tons|MW|GW|million|billion)|20\d{2}").ok()
});

const CARBON_TERMS: &[&str] = &[
    "carbon negative",
    "net zero",
    "carbon neutral",
    "scope 1",
    "scope 2",
    "scope 3",
];

const SUPERLATIVES: &[&str] = &[
    "greenest",
    "leader in",
    "pioneer",
    "most sustainable",
    "best in class",
    "world's leading",
];

const HIGH_RISK_SECTORS: &[&str] = &["Energy", "Automotive", "Aviation", "Mining", "Oil & Gas"];

const VAGUE_KEYWORDS: &[&str] = &[
    "committed to",
    "sustainable",
    "eco-friendly",
    "green",
    "clean energy",
];

fn is_match(regex: &LazyLock<Option<Regex>>, text: &str) -> bool {
    regex.as_ref().is_some_and(|r| r.is_match(text))
}

/// Absolute claim language such as "100% sustainable" or "completely green"
pub fn has_absolute_language(claim: &str) -> bool {
    let lower = claim.to_lowercase();
    ABSOLUTE_PATTERNS.iter().any(|p| p.is_match(&lower))
}

/// Carbon accounting terminology backed by a figure and a year
pub fn is_legitimate_carbon_claim(claim: &str) -> bool {
    let lower = claim.to_lowercase();
    CARBON_TERMS.iter().any(|t| lower.contains(t))
        && is_match(&CARBON_METRICS, claim)
        && is_match(&YEAR, claim)
}

/// Whether the claim uses superlative language
pub fn has_superlative(claim: &str) -> bool {
    let lower = claim.to_lowercase();
    SUPERLATIVES.iter().any(|s| lower.contains(s))
}

/// Vague claim without figures in a high-baseline sector
pub fn is_vague_high_risk_claim(claim: &str, industry: &str) -> bool {
    let lower = claim.to_lowercase();
    let vague = VAGUE_KEYWORDS.iter().filter(|k| lower.contains(*k)).count();
    HIGH_RISK_SECTORS.contains(&industry) && vague >= 2 && !is_match(&SECTOR_METRICS, claim)
}

/// Agent findings the rules consult
#[derive(Debug, Clone, Default)]
pub struct VerdictInputs {
    pub historical: Option<HistoricalReport>,
    pub contradictions: usize,
    /// Highest conflict ratio recorded by a debate
    pub debate_conflict_ratio: f64,
}

impl VerdictInputs {
    pub fn from_state(state: &EsgState) -> Self {
        let contradictions = state
            .latest_success(CONTRADICTION_ANALYSIS)
            .and_then(|o| o.detail("contradictions_count"))
            .and_then(serde_json::Value::as_u64)
            .unwrap_or_default() as usize;

        let debate_conflict_ratio = state
            .agent_outputs
            .iter()
            .filter(|o| o.agent == names::DEBATE_ORCHESTRATOR || o.agent == names::DEBATE_RESOLUTION)
            .filter_map(|o| o.detail("conflict_ratio").and_then(serde_json::Value::as_f64))
            .fold(0.0, f64::max);

        Self {
            historical: esg_agents::report(state, TEMPORAL_ANALYSIS),
            contradictions,
            debate_conflict_ratio,
        }
    }
}

/// Apply the priority rules to the current level and confidence
pub fn decide(state: &EsgState, inputs: &VerdictInputs) -> Verdict {
    let initial_level = state.risk_or_moderate();
    let mut level = initial_level;
    let mut confidence = state.confidence;
    let mut escalation = None;
    let mut downgrade = None;
    let mut verified_metrics = false;
    let mut sources = Vec::new();

    let legitimate_carbon = is_legitimate_carbon_claim(&state.claim);

    if has_absolute_language(&state.claim) && !legitimate_carbon {
        level = RiskLevel::High;
        confidence = (confidence * 0.60).min(0.75);
        escalation = Some("Absolute/impossible claim (pattern-based)".to_string());
    } else if legitimate_carbon {
        if matches!(level, RiskLevel::Moderate | RiskLevel::High) {
            downgrade = Some(format!("From {level} to LOW - verified carbon accounting"));
            level = RiskLevel::Low;
            confidence = (confidence * 1.10).min(0.85);
            verified_metrics = true;
        }
    } else if let Some(history) = &inputs.historical {
        let violations = history.violation_count();
        let accusations = history.accusation_count();

        let rule = if history.reputation_score < 40.0 && violations >= 1 {
            Some((
                0.70,
                Some(0.80),
                format!(
                    "Historical violations ({violations}) + poor reputation ({:.0}/100)",
                    history.reputation_score
                ),
            ))
        } else if history.greenwashing_history.pattern_detected && accusations >= 2 {
            Some((
                0.65,
                Some(0.75),
                format!("Historical greenwashing pattern ({accusations} accusations)"),
            ))
        } else if history.patterns.declining && level == RiskLevel::Moderate {
            Some((
                0.80,
                None,
                "Declining ESG trend contradicts positive claim".to_string(),
            ))
        } else if history.patterns.reactive && level == RiskLevel::Moderate {
            Some((0.75, None, "Reactive greenwashing pattern detected".to_string()))
        } else {
            None
        };

        if let Some((factor, cap, reason)) = rule {
            level = RiskLevel::High;
            confidence *= factor;
            if let Some(cap) = cap {
                confidence = confidence.min(cap);
            }
            escalation = Some(reason);
            sources.push(IntelligenceSource::HistoricalTrackRecord);
        }
    }

    let mut escalate = |applies: bool, factor: f64, reason: String, source| {
        if applies && level == RiskLevel::Moderate {
            level = RiskLevel::High;
            confidence *= factor;
            escalation = Some(reason);
            sources.push(source);
        }
    };

    escalate(
        inputs.contradictions >= 3,
        0.75,
        format!("Multiple contradictions ({}) detected", inputs.contradictions),
        IntelligenceSource::ContradictionAnalysis,
    );
    escalate(
        inputs.debate_conflict_ratio >= 0.60,
        0.75,
        format!("Agent disagreement ({:.0}%)", inputs.debate_conflict_ratio * 100.0),
        IntelligenceSource::MultiAgentDebate,
    );
    escalate(
        has_superlative(&state.claim),
        0.70,
        "Superlative greenwashing language".to_string(),
        IntelligenceSource::LanguagePatternDetection,
    );
    escalate(
        is_vague_high_risk_claim(&state.claim, &state.industry),
        0.80,
        format!("Vague claim in {} sector", state.industry),
        IntelligenceSource::IndustryRiskAnalysis,
    );

    Verdict {
        company: state.company.clone(),
        claim: state.claim.clone(),
        risk_level: level,
        confidence: state.confidence,
        evidence_count: state.evidence.len(),
        timestamp: Utc::now(),
        escalation,
        downgrade,
        verified_metrics,
        final_confidence: confidence,
        intelligence_sources: sources,
    }
}

/// Applies the verdict rules and stores the verdict on the state
#[derive(Debug, Default)]
pub struct VerdictAgent;

impl VerdictAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for VerdictAgent {
    fn name(&self) -> &str {
        names::VERDICT_GENERATION
    }

    #[tracing::instrument(skip_all, fields(company = %state.company))]
    async fn run(&self, state: &mut EsgState) -> Result<AgentOutput> {
        let verdict = decide(state, &VerdictInputs::from_state(state));

        if let Some(reason) = verdict.escalation.as_deref().or(verdict.downgrade.as_deref()) {
            info!("Verdict adjusted to {}: {reason}", verdict.risk_level);
        }
        info!(
            "Verdict {} (confidence {:.1}%)",
            verdict.risk_level,
            verdict.final_confidence * 100.0
        );

        state.risk_level = Some(verdict.risk_level);
        state.confidence = verdict.final_confidence;
        let output = AgentOutput::success(
            names::VERDICT_GENERATION,
            serde_json::to_value(&verdict)?,
            verdict.final_confidence,
        )
        .with_risk_level(verdict.risk_level);
        state.final_verdict = Some(verdict);
        Ok(output)
    }
}
