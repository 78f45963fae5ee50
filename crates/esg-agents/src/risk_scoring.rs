//! Industry-adjusted greenwashing risk score
//!
//! Combines the earlier reports into six weighted components, shifts the
//! result by the industry's baseline risk and peer findings, and maps the
//! score onto a risk level with thresholds that tighten for high-risk
//! industries.

use crate::contradiction::{ClaimVerdict, ContradictionReport};
use crate::credibility::CredibilityReport;
use crate::historical::HistoricalReport;
use crate::peer_comparison::PeerReport;
use crate::sentiment::SentimentReport;
use crate::{AgentContext, names, prompts, report};
use async_trait::async_trait;
use esg_core::{Agent, AgentOutput, EsgState, Result, RiskLevel};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

/// Industry key, baseline risk (0-100)
pub const INDUSTRY_BASELINES: &[(&str, f64)] = &[
    ("coal", 80.0),
    ("oil_and_gas", 75.0),
    ("tobacco", 75.0),
    ("mining", 70.0),
    ("aviation", 70.0),
    ("chemicals", 65.0),
    ("fast_fashion", 65.0),
    ("automotive", 60.0),
    ("defense", 60.0),
    ("pharmaceuticals", 55.0),
    ("transportation", 55.0),
    ("consumer_goods", 50.0),
    ("food_beverage", 50.0),
    ("banking", 50.0),
    ("retail", 45.0),
    ("real_estate", 45.0),
    ("hospitality", 45.0),
    ("telecommunications", 40.0),
    ("technology", 35.0),
    ("healthcare_services", 35.0),
    ("software", 30.0),
    ("education", 30.0),
    ("renewable_energy", 25.0),
];

pub const UNKNOWN_INDUSTRY: &str = "unknown";
const UNKNOWN_BASELINE: f64 = 50.0;
const BASELINE_SOURCE: &str = "MSCI ESG 2024";

const HIGH_SCRUTINY_INDUSTRIES: &[&str] = &["oil_and_gas", "coal", "mining", "aviation", "tobacco"];

const VAGUE_CLAIM_KEYWORDS: &[&str] = &[
    "committed to",
    "leader in",
    "eco-friendly",
    "sustainable",
    "green",
    "environmentally friendly",
    "climate positive",
];

const PEER_PENALTY: f64 = 5.0;
const DEBATE_PENALTY: f64 = 10.0;

/// Label keyword, industry key; first match wins
const LABEL_KEYWORDS: &[(&str, &str)] = &[
    ("renewable", "renewable_energy"),
    ("coal", "coal"),
    ("oil", "oil_and_gas"),
    ("gas", "oil_and_gas"),
    ("energy", "oil_and_gas"),
    ("tobacco", "tobacco"),
    ("mining", "mining"),
    ("aviation", "aviation"),
    ("airline", "aviation"),
    ("chemical", "chemicals"),
    ("fashion", "fast_fashion"),
    ("apparel", "fast_fashion"),
    ("automotive", "automotive"),
    ("defense", "defense"),
    ("pharma", "pharmaceuticals"),
    ("healthcare", "pharmaceuticals"),
    ("transport", "transportation"),
    ("consumer goods", "consumer_goods"),
    ("food", "food_beverage"),
    ("beverage", "food_beverage"),
    ("bank", "banking"),
    ("financial", "banking"),
    ("retail", "retail"),
    ("real estate", "real_estate"),
    ("hospitality", "hospitality"),
    ("telecom", "telecommunications"),
    ("software", "software"),
    ("technology", "technology"),
    ("education", "education"),
];

/// Baseline risk of an industry key, 50 when unknown
pub fn industry_baseline(industry: &str) -> f64 {
    INDUSTRY_BASELINES
        .iter()
        .find(|(key, _)| *key == industry)
        .map_or(UNKNOWN_BASELINE, |(_, baseline)| *baseline)
}

/// Industry key from a free-text industry label
pub fn industry_from_label(label: &str) -> Option<&'static str> {
    let label = label.to_lowercase();
    LABEL_KEYWORDS
        .iter()
        .find(|(keyword, _)| label.contains(keyword))
        .map(|(_, key)| *key)
}

/// Match an LLM classification reply to an industry key
pub fn match_industry(reply: &str) -> Option<&'static str> {
    let cleaned = reply
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace(['.', ',', ':'], "");
    if cleaned.is_empty() {
        return None;
    }

    let keys = INDUSTRY_BASELINES.iter().map(|(key, _)| *key);
    if let Some(key) = keys.clone().find(|key| *key == cleaned) {
        return Some(key);
    }

    let words: Vec<&str> = cleaned.split('_').filter(|w| !w.is_empty()).collect();
    keys.into_iter().find(|key| {
        key.contains(cleaned.as_str())
            || cleaned.contains(key)
            || key.split('_').any(|part| words.contains(&part))
    })
}

/// (high, moderate) thresholds for a baseline
pub fn thresholds(baseline: f64) -> (f64, f64) {
    if baseline >= 70.0 {
        (45.0, 30.0)
    } else if baseline >= 60.0 {
        (55.0, 35.0)
    } else if baseline >= 50.0 {
        (65.0, 40.0)
    } else {
        (70.0, 45.0)
    }
}

/// Risk level and letter grade for a score
pub fn classify(score: f64, baseline: f64) -> (RiskLevel, &'static str) {
    let (high, moderate) = thresholds(baseline);
    if score >= high {
        (RiskLevel::High, if score >= 80.0 { "CCC" } else { "B" })
    } else if score >= moderate {
        (RiskLevel::Moderate, "BBB")
    } else if score <= 20.0 {
        (RiskLevel::Low, "AAA")
    } else if score <= 30.0 {
        (RiskLevel::Low, "AA")
    } else {
        (RiskLevel::Low, "A")
    }
}

fn display_industry(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Risk contributions, each 0-100 with higher meaning riskier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub claim_verification: f64,
    pub evidence_quality: f64,
    pub source_credibility: f64,
    pub sentiment_divergence: f64,
    pub historical_pattern: f64,
    pub contradiction_severity: f64,
}

impl ComponentScores {
    /// Name, score, weight
    pub fn weighted(&self) -> [(&'static str, f64, f64); 6] {
        [
            ("claim_verification", self.claim_verification, 0.30),
            ("evidence_quality", self.evidence_quality, 0.15),
            ("source_credibility", self.source_credibility, 0.15),
            ("sentiment_divergence", self.sentiment_divergence, 0.10),
            ("historical_pattern", self.historical_pattern, 0.15),
            ("contradiction_severity", self.contradiction_severity, 0.15),
        ]
    }

    pub fn base_risk(&self) -> f64 {
        self.weighted().iter().map(|(_, score, weight)| score * weight).sum()
    }
}

/// Reports the score is computed from
#[derive(Debug, Clone, Default)]
pub struct ScoringInputs {
    pub claim: String,
    pub evidence_count: usize,
    pub contradiction: Option<ContradictionReport>,
    pub credibility: Option<CredibilityReport>,
    pub sentiment: Option<SentimentReport>,
    pub historical: Option<HistoricalReport>,
    pub peers: Option<PeerReport>,
    pub debate_activated: bool,
}

impl ScoringInputs {
    pub fn from_state(state: &EsgState) -> Self {
        Self {
            claim: state.claim.clone(),
            evidence_count: state.evidence.len(),
            contradiction: report(state, names::CONTRADICTION_ANALYSIS),
            credibility: report(state, names::CREDIBILITY_ANALYSIS),
            sentiment: report(state, names::SENTIMENT_ANALYSIS),
            historical: report(state, names::TEMPORAL_ANALYSIS),
            peers: report(state, names::PEER_COMPARISON),
            debate_activated: state
                .outputs_for(names::DEBATE_ORCHESTRATOR)
                .any(|o| o.action.as_deref() == Some("conflict_detected")),
        }
    }

    pub fn components(&self) -> ComponentScores {
        let mut claim_verification = self.contradiction.as_ref().map_or(100.0, |c| {
            match c.overall_verdict {
                ClaimVerdict::Contradicted => 100.0,
                ClaimVerdict::Unverifiable => 85.0,
                ClaimVerdict::PartiallyTrue => 50.0,
                ClaimVerdict::Verified => 0.0,
            }
        });
        let lower = self.claim.to_lowercase();
        let vague = VAGUE_CLAIM_KEYWORDS.iter().filter(|k| lower.contains(*k)).count();
        if vague >= 2 && !self.claim.chars().any(|c| c.is_ascii_digit()) {
            claim_verification = f64::min(100.0, claim_verification + 20.0);
        }

        let evidence_quality = match self.evidence_count {
            n if n >= 20 => 10.0,
            n if n >= 15 => 20.0,
            n if n >= 10 => 35.0,
            n if n >= 5 => 60.0,
            _ => 90.0,
        };

        let source_credibility = self
            .credibility
            .as_ref()
            .filter(|c| !c.assessments.is_empty())
            .map_or(100.0, |c| ((1.0 - c.average_credibility) * 100.0).floor());

        let sentiment_divergence = self
            .sentiment
            .as_ref()
            .map_or(50.0, |s| f64::from(s.divergence_score));

        let historical_pattern = self.historical.as_ref().map_or(50.0, |h| {
            let violations = (20.0 * h.violation_count() as f64).min(100.0);
            let accusations = (30.0 * h.accusation_count() as f64).min(100.0);
            let reputation = 100.0 - h.reputation_score;
            ((violations + accusations + reputation) / 3.0).floor()
        });

        let contradiction_severity = self
            .contradiction
            .as_ref()
            .map_or(0.0, |c| (30.0 * c.major_contradictions() as f64).min(100.0));

        ComponentScores {
            claim_verification,
            evidence_quality,
            source_credibility,
            sentiment_divergence,
            historical_pattern,
            contradiction_severity,
        }
    }

    pub fn peer_modifier(&self) -> f64 {
        self.peers
            .as_ref()
            .map_or(0.0, |p| PEER_PENALTY * p.unverified_superlatives() as f64)
    }
}

/// Plain-language guidance per audience
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeholderInsights {
    pub for_investors: String,
    pub for_regulators: String,
    pub for_consumers: String,
}

impl StakeholderInsights {
    pub fn new(level: RiskLevel, company: &str, industry: &str) -> Self {
        match level {
            RiskLevel::High => Self {
                for_investors: format!(
                    "HIGH RISK: {company} ({industry}) shows significant greenwashing indicators. Claims lack credible verification or contain major contradictions. NOT suitable for ESG portfolios without deep independent audit and verification."
                ),
                for_regulators: format!(
                    "IMMEDIATE ATTENTION REQUIRED: {company} requires formal investigation. Multiple red flags detected including unverified claims, contradictions, or historical violations. Recommend requesting documentation and potential enforcement action in high-scrutiny {industry} sector."
                ),
                for_consumers: format!(
                    "CAUTION ADVISED: {company}'s ESG claims appear questionable or unsubstantiated. {industry} companies face inherent sustainability challenges. Strongly recommend seeking alternatives with credible third-party certifications (B Corp, Fair Trade, etc.)."
                ),
            },
            RiskLevel::Moderate => Self {
                for_investors: format!(
                    "MODERATE RISK: {company} ({industry}) shows mixed ESG performance with some concerns. Additional due diligence required before investment. Monitor peer comparisons, upcoming sustainability reports, and third-party ratings (MSCI, Sustainalytics)."
                ),
                for_regulators: format!(
                    "MONITORING RECOMMENDED: {company} shows some inconsistencies in ESG claims. Standard oversight appropriate for {industry} sector. Consider requesting clarification on specific unverified claims and ensuring compliance with disclosure requirements."
                ),
                for_consumers: format!(
                    "MIXED SIGNALS: {company} demonstrates some genuine ESG efforts but {industry} sector has structural sustainability challenges. Verify specific product claims independently and compare with competitors' performance."
                ),
            },
            RiskLevel::Low => Self {
                for_investors: format!(
                    "LOW RISK: {company} ({industry}) shows credible ESG commitments backed by verifiable evidence from quality sources. Suitable for ESG-focused portfolios. Continue standard monitoring of annual reports and third-party assessments."
                ),
                for_regulators: format!(
                    "NO MAJOR CONCERNS: {company} meets expected disclosure and performance standards for {industry} sector. Routine monitoring sufficient. Claims appear substantiated and consistent with available evidence."
                ),
                for_consumers: format!(
                    "TRUSTWORTHY: {company}'s ESG claims appear credible with reasonable evidence backing from independent sources. Good choice within {industry} sector. Look for third-party certifications for additional assurance."
                ),
            },
        }
    }
}

fn top_reasons(components: &ComponentScores, inputs: &ScoringInputs, industry: &str) -> Vec<String> {
    let mut ranked = components.weighted();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut reasons = Vec::new();
    for (name, score, _) in ranked.iter().take(3) {
        let risk = *score as u32;
        match *name {
            "claim_verification" if *score > 60.0 => match inputs.contradiction.as_ref().map(|c| c.overall_verdict) {
                Some(ClaimVerdict::Contradicted) => reasons.push(format!(
                    "Claim verification failure: 1 claim(s) contradicted by evidence (risk: {risk}%)"
                )),
                Some(ClaimVerdict::Unverifiable) => reasons.push(format!(
                    "Unverifiable claims: 1 claim(s) lack supporting evidence (risk: {risk}%)"
                )),
                _ => {}
            },
            "historical_pattern" if *score > 50.0 => {
                let violations = inputs.historical.as_ref().map_or(0, HistoricalReport::violation_count);
                if violations > 0 {
                    reasons.push(format!(
                        "Historical violations: {violations} documented ESG violation(s) (risk: {risk}%)"
                    ));
                }
            }
            "contradiction_severity" if *score > 40.0 => {
                let majors = inputs
                    .contradiction
                    .as_ref()
                    .map_or(0, ContradictionReport::major_contradictions);
                if majors > 0 {
                    reasons.push(format!(
                        "Major contradictions: {majors} severe inconsistenc(y/ies) detected (risk: {risk}%)"
                    ));
                }
            }
            "source_credibility" if *score > 40.0 => reasons.push(format!(
                "Source credibility concerns: Evidence from low-quality or biased sources (risk: {risk}%)"
            )),
            _ => {}
        }
    }

    if reasons.len() < 3 && HIGH_SCRUTINY_INDUSTRIES.contains(&industry) {
        reasons.push(format!(
            "High-scrutiny industry ({}): ESG claims require exceptional evidence standards",
            display_industry(industry)
        ));
    }
    while reasons.len() < 3 {
        reasons.push("Insufficient data quality or evidence gaps detected".to_string());
    }
    reasons.truncate(3);
    reasons
}

/// Payload of the risk scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub company: String,
    pub industry: String,
    pub industry_baseline_risk: f64,
    pub industry_source: String,
    pub base_risk_score: f64,
    pub industry_adjustment: f64,
    pub peer_adjustment: f64,
    pub debate_penalty: f64,
    pub greenwashing_risk_score: f64,
    /// `100 - greenwashing_risk_score`
    pub esg_score: f64,
    pub risk_level: RiskLevel,
    pub rating_grade: String,
    pub component_scores: ComponentScores,
    pub explainability_top_3_reasons: Vec<String>,
    pub actionable_insights: StakeholderInsights,
    pub confidence_level: u32,
}

/// Score the inputs for a company in a resolved industry
pub fn score(company: &str, industry: &str, inputs: &ScoringInputs) -> RiskReport {
    let baseline = industry_baseline(industry);
    let components = inputs.components();
    let base_risk = components.base_risk();
    let industry_adjustment = (baseline - 50.0) * 0.3;
    let peer_adjustment = inputs.peer_modifier();
    let debate_penalty = if inputs.debate_activated { DEBATE_PENALTY } else { 0.0 };

    let risk = (base_risk + industry_adjustment + peer_adjustment + debate_penalty).clamp(0.0, 100.0);
    let (risk_level, grade) = classify(risk, baseline);
    let industry_name = display_industry(industry);

    RiskReport {
        company: company.to_string(),
        industry: industry.to_string(),
        industry_baseline_risk: baseline,
        industry_source: if industry == UNKNOWN_INDUSTRY {
            "Default".to_string()
        } else {
            BASELINE_SOURCE.to_string()
        },
        base_risk_score: round1(base_risk),
        industry_adjustment: round1(industry_adjustment),
        peer_adjustment: round1(peer_adjustment),
        debate_penalty,
        greenwashing_risk_score: round1(risk),
        esg_score: round1(100.0 - risk),
        risk_level,
        rating_grade: grade.to_string(),
        explainability_top_3_reasons: top_reasons(&components, inputs, industry),
        actionable_insights: StakeholderInsights::new(risk_level, company, &industry_name),
        component_scores: components,
        confidence_level: 85,
    }
}

/// Final industry-adjusted scorer; sets `state.risk_level`
pub struct RiskScoringAgent {
    ctx: AgentContext,
}

impl RiskScoringAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    /// Industry key from the state label, then the LLM, then `unknown`
    async fn resolve_industry(&self, company: &str, label: &str) -> &'static str {
        if let Some(key) = industry_from_label(label) {
            return key;
        }

        let industries: Vec<&str> = INDUSTRY_BASELINES.iter().map(|(key, _)| *key).collect();
        let reply = match self.ctx.render(
            prompts::INDUSTRY_CLASSIFICATION,
            &json!({ "company": company, "industries": industries }),
        ) {
            Ok(prompt) => self.ctx.fast().complete(&prompt).await.ok(),
            Err(e) => {
                warn!("Could not render industry prompt: {e}");
                None
            }
        };

        reply.as_deref().and_then(match_industry).unwrap_or_else(|| {
            warn!("Could not classify {company}, using '{UNKNOWN_INDUSTRY}'");
            UNKNOWN_INDUSTRY
        })
    }
}

#[async_trait]
impl Agent for RiskScoringAgent {
    fn name(&self) -> &str {
        names::RISK_SCORING
    }

    #[tracing::instrument(skip_all, fields(company = %state.company))]
    async fn run(&self, state: &mut EsgState) -> Result<AgentOutput> {
        let industry = self.resolve_industry(&state.company, &state.industry).await;
        let inputs = ScoringInputs::from_state(state);
        let risk = score(&state.company, industry, &inputs);

        info!(
            "Industry {} (baseline {}), risk {:.1}/100, level {} ({})",
            risk.industry,
            risk.industry_baseline_risk,
            risk.greenwashing_risk_score,
            risk.risk_level,
            risk.rating_grade
        );

        state.risk_level = Some(risk.risk_level);
        Ok(
            AgentOutput::success(names::RISK_SCORING, serde_json::to_value(&risk)?, 0.8)
                .with_risk_level(risk.risk_level),
        )
    }

    fn on_failure(&self, state: &mut EsgState) {
        state.risk_level = Some(RiskLevel::Moderate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contradiction::{EvidenceCounts, SpecificContradiction};
    use crate::peer_comparison::{IndustryPosition, SuperlativeCheck, SuperlativeStatus};
    use crate::test_support::{context, evidence};
    use esg_core::{Relationship, SourceType};
    use esg_llm::testing::ScriptedProvider;

    fn contradiction(verdict: ClaimVerdict, majors: usize) -> ContradictionReport {
        ContradictionReport {
            claim_id: 1,
            overall_verdict: verdict,
            verification_confidence: 80.0,
            specific_contradictions: (0..majors)
                .map(|_| SpecificContradiction {
                    severity: "Major".to_string(),
                    ..SpecificContradiction::default()
                })
                .collect(),
            supportive_evidence: Vec::new(),
            key_issues: Vec::new(),
            evidence_counts: EvidenceCounts::default(),
            fallback: false,
        }
    }

    #[tokio::test]
    async fn test_claim_only_scores_high() {
        let provider = ScriptedProvider::new();
        let agent = RiskScoringAgent::new(context(provider.clone(), Vec::new()));
        let mut state = EsgState::new(
            "H&M",
            "H&M is committed to 100% sustainable fashion and eco-friendly materials across all collections",
            "Consumer Goods",
        );

        let output = agent.run(&mut state).await.unwrap();
        let risk: RiskReport = serde_json::from_value(output.output).unwrap();

        assert_eq!(risk.industry, "consumer_goods");
        assert!((risk.greenwashing_risk_score - 71.0).abs() < 1e-9);
        assert_eq!(risk.risk_level, RiskLevel::High);
        assert_eq!(risk.rating_grade, "B");
        assert_eq!(state.risk_level, Some(RiskLevel::High));
        assert_eq!(output.risk_level, Some(RiskLevel::High));
        assert!(risk.explainability_top_3_reasons[0].starts_with("Source credibility concerns"));
        assert_eq!(
            risk.explainability_top_3_reasons[1..],
            ["Insufficient data quality or evidence gaps detected"; 2]
        );
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_verified_claim_with_strong_evidence_scores_low() {
        let mut state = EsgState::new("Microsoft", "Microsoft will be carbon negative by 2030", "Technology");
        state.evidence = (1..=20)
            .map(|i| evidence(i, SourceType::Academic, Relationship::Supports, "Study"))
            .collect();
        state.record(AgentOutput::success(
            names::CONTRADICTION_ANALYSIS,
            serde_json::to_value(contradiction(ClaimVerdict::Verified, 0)).unwrap(),
            0.75,
        ));
        state.record(AgentOutput::success(
            names::CREDIBILITY_ANALYSIS,
            serde_json::to_value(CredibilityReport::from_evidence(&state.evidence)).unwrap(),
            0.75,
        ));

        let risk = score("Microsoft", "technology", &ScoringInputs::from_state(&state));

        assert!((risk.component_scores.source_credibility).abs() < f64::EPSILON);
        assert!((risk.greenwashing_risk_score - 9.5).abs() < 1e-9);
        assert_eq!(risk.risk_level, RiskLevel::Low);
        assert_eq!(risk.rating_grade, "AAA");
    }

    #[test]
    fn test_peer_and_debate_penalties() {
        let inputs = ScoringInputs {
            claim: "Shell is the leading energy company".to_string(),
            contradiction: Some(contradiction(ClaimVerdict::Contradicted, 2)),
            peers: Some(PeerReport {
                company: "Shell".to_string(),
                peers: Vec::new(),
                superlative_checks: vec![SuperlativeCheck {
                    term: "leading".to_string(),
                    status: SuperlativeStatus::Unverified,
                    peers_with_data: 3,
                }],
                industry_position: IndustryPosition {
                    position: "Claims Leadership".to_string(),
                    score: 40,
                    rationale: String::new(),
                },
            }),
            debate_activated: true,
            ..ScoringInputs::default()
        };

        let risk = score("Shell", "oil_and_gas", &inputs);

        assert!((risk.peer_adjustment - 5.0).abs() < f64::EPSILON);
        assert!((risk.debate_penalty - 10.0).abs() < f64::EPSILON);
        assert!((risk.component_scores.contradiction_severity - 60.0).abs() < f64::EPSILON);
        assert_eq!(risk.risk_level, RiskLevel::High);
        assert_eq!(risk.rating_grade, "CCC");
        assert!(risk.explainability_top_3_reasons[0].starts_with("Claim verification failure"));
        assert!(
            risk.explainability_top_3_reasons
                .iter()
                .any(|r| r.starts_with("High-scrutiny industry (Oil And Gas)"))
        );
    }

    #[test]
    fn test_vague_claim_without_metrics_penalised() {
        let inputs = ScoringInputs {
            claim: "We are committed to sustainable, green products".to_string(),
            contradiction: Some(contradiction(ClaimVerdict::PartiallyTrue, 0)),
            ..ScoringInputs::default()
        };
        assert!((inputs.components().claim_verification - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_industry_resolution() {
        assert_eq!(industry_from_label("Energy"), Some("oil_and_gas"));
        assert_eq!(industry_from_label("Renewable Energy"), Some("renewable_energy"));
        assert_eq!(industry_from_label("Financial Services"), Some("banking"));
        assert_eq!(industry_from_label("General"), None);

        assert_eq!(match_industry("fast_fashion"), Some("fast_fashion"));
        assert_eq!(match_industry("Oil & Gas."), Some("oil_and_gas"));
        assert_eq!(match_industry("  "), None);
    }

    #[tokio::test]
    async fn test_llm_classification_fallback_to_unknown() {
        let agent = RiskScoringAgent::new(context(ScriptedProvider::new().failing(), Vec::new()));
        let mut state = EsgState::new("Acme", "Acme is green", "General");

        let output = agent.run(&mut state).await.unwrap();
        let risk: RiskReport = serde_json::from_value(output.output).unwrap();
        assert_eq!(risk.industry, UNKNOWN_INDUSTRY);
        assert_eq!(risk.industry_source, "Default");
    }

    #[test]
    fn test_thresholds_tighten_for_risky_industries() {
        assert_eq!(classify(50.0, 75.0).0, RiskLevel::High);
        assert_eq!(classify(50.0, 35.0).0, RiskLevel::Moderate);
        assert_eq!(classify(25.0, 35.0), (RiskLevel::Low, "AA"));
        assert_eq!(classify(40.0, 35.0), (RiskLevel::Low, "A"));
    }

    #[test]
    fn test_on_failure_sets_moderate() {
        let agent = RiskScoringAgent::new(context(ScriptedProvider::new(), Vec::new()));
        let mut state = EsgState::new("Acme", "claim", "General");
        agent.on_failure(&mut state);
        assert_eq!(state.risk_level, Some(RiskLevel::Moderate));
    }
}
