//! Shared analysis state
//!
//! [`EsgState`] is created once per analysed claim and handed mutably to each
//! agent in turn. Agents read what earlier agents produced and append their
//! own [`AgentOutput`] records; the record list is append-only.

use crate::{AgentOutput, Verdict};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Greenwashing risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Uppercase label used in reports ("LOW", "MODERATE", "HIGH")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
        }
    }

    /// Traffic-light marker shown next to the level
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Low => "🟢",
            Self::Moderate => "🟡",
            Self::High => "🔴",
        }
    }

    /// Letter rating on the MSCI-style scale
    pub fn rating(&self) -> &'static str {
        match self {
            Self::Low => "AA",
            Self::Moderate => "BBB",
            Self::High => "CCC",
        }
    }

    /// Parse a level from free text, case-insensitive
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MODERATE" | "MEDIUM" => Some(Self::Moderate),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analysis track chosen by the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPath {
    FastTrack,
    StandardTrack,
    DeepAnalysis,
}

impl WorkflowPath {
    /// Route a complexity score in [0, 1] to a track
    pub fn from_complexity(score: f64) -> Self {
        if score < 0.3 {
            Self::FastTrack
        } else if score < 0.7 {
            Self::StandardTrack
        } else {
            Self::DeepAnalysis
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FastTrack => "fast_track",
            Self::StandardTrack => "standard_track",
            Self::DeepAnalysis => "deep_analysis",
        }
    }

    /// Human-readable name used in summaries
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::FastTrack => "Fast Track (Low Complexity)",
            Self::StandardTrack => "Standard Analysis (Moderate Complexity)",
            Self::DeepAnalysis => "Deep Analysis with Multi-Agent Debate (High Complexity)",
        }
    }
}

impl fmt::Display for WorkflowPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credibility class of an evidence source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "Academic")]
    Academic,
    #[serde(rename = "Government/Regulatory")]
    GovernmentRegulatory,
    #[serde(rename = "NGO")]
    Ngo,
    #[serde(rename = "Tier-1 Financial Media")]
    Tier1FinancialMedia,
    #[serde(rename = "General Media")]
    GeneralMedia,
    #[serde(rename = "ESG Platform")]
    EsgPlatform,
    #[serde(rename = "News Source")]
    NewsSource,
    #[serde(rename = "Web Source")]
    WebSource,
    #[serde(rename = "Company-Controlled")]
    CompanyControlled,
    #[serde(rename = "Sponsored Content")]
    SponsoredContent,
}

impl SourceType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Academic => "Academic",
            Self::GovernmentRegulatory => "Government/Regulatory",
            Self::Ngo => "NGO",
            Self::Tier1FinancialMedia => "Tier-1 Financial Media",
            Self::GeneralMedia => "General Media",
            Self::EsgPlatform => "ESG Platform",
            Self::NewsSource => "News Source",
            Self::WebSource => "Web Source",
            Self::CompanyControlled => "Company-Controlled",
            Self::SponsoredContent => "Sponsored Content",
        }
    }

    /// Sources not controlled or paid for by the company
    pub fn is_independent(&self) -> bool {
        !matches!(self, Self::CompanyControlled | Self::SponsoredContent)
    }

    /// Regulators, academia, NGOs and tier-1 financial press
    pub fn is_premium(&self) -> bool {
        matches!(
            self,
            Self::Tier1FinancialMedia | Self::GovernmentRegulatory | Self::Academic | Self::Ngo
        )
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a piece of evidence relates to the claim under analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Relationship {
    Supports,
    Contradicts,
    Partial,
    #[default]
    Neutral,
}

impl Relationship {
    /// Find the first relationship keyword in an LLM reply
    ///
    /// Keywords are checked in the order Supports, Contradicts, Partial, Neutral.
    pub fn from_reply(reply: &str) -> Self {
        [Self::Supports, Self::Contradicts, Self::Partial, Self::Neutral]
            .into_iter()
            .find(|r| reply.contains(r.as_str()))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supports => "Supports",
            Self::Contradicts => "Contradicts",
            Self::Partial => "Partial",
            Self::Neutral => "Neutral",
        }
    }
}

/// A structured evidence item gathered for the claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub source_id: String,
    pub source_name: String,
    pub source_type: SourceType,
    pub url: String,
    pub title: String,
    /// Relevant text, truncated to 500 chars
    pub snippet: String,
    pub date: Option<String>,
    pub relationship: Relationship,
    /// Days since publication, 999 when unknown
    pub freshness_days: u32,
    /// API or feed the item came from
    pub data_source_api: String,
}

/// Freshness recorded when the publication date is unknown
pub const UNKNOWN_FRESHNESS_DAYS: u32 = 999;

/// State shared by all agents during one analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsgState {
    // Inputs
    pub claim: String,
    pub company: String,
    pub industry: String,

    // Routing
    pub complexity_score: f64,
    pub workflow_path: Option<WorkflowPath>,

    // Results
    pub evidence: Vec<Evidence>,
    pub confidence: f64,
    pub risk_level: Option<RiskLevel>,
    pub final_verdict: Option<Verdict>,
    pub report: String,

    // Collaboration
    pub agent_outputs: Vec<AgentOutput>,
    pub iteration_count: u32,
    pub needs_revision: bool,
}

impl EsgState {
    /// Create the initial state for a claim
    pub fn new(
        company: impl Into<String>,
        claim: impl Into<String>,
        industry: impl Into<String>,
    ) -> Self {
        Self {
            claim: claim.into(),
            company: company.into(),
            industry: industry.into(),
            complexity_score: 0.0,
            workflow_path: None,
            evidence: Vec::new(),
            confidence: 0.0,
            risk_level: None,
            final_verdict: None,
            report: String::new(),
            agent_outputs: Vec::new(),
            iteration_count: 0,
            needs_revision: false,
        }
    }

    /// Append an agent record
    pub fn record(&mut self, output: AgentOutput) {
        self.agent_outputs.push(output);
    }

    /// All records produced by the named agent, oldest first
    pub fn outputs_for<'a>(&'a self, agent: &'a str) -> impl Iterator<Item = &'a AgentOutput> {
        self.agent_outputs.iter().filter(move |o| o.agent == agent)
    }

    /// First successful record from the named agent
    pub fn first_success(&self, agent: &str) -> Option<&AgentOutput> {
        self.agent_outputs
            .iter()
            .find(|o| o.agent == agent && o.is_success())
    }

    /// Most recent successful record from the named agent
    pub fn latest_success(&self, agent: &str) -> Option<&AgentOutput> {
        self.agent_outputs
            .iter()
            .rev()
            .find(|o| o.agent == agent && o.is_success())
    }

    /// Current risk level, MODERATE when no scorer has run yet
    pub fn risk_or_moderate(&self) -> RiskLevel {
        self.risk_level.unwrap_or(RiskLevel::Moderate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workflow_routing_boundaries() {
        assert_eq!(WorkflowPath::from_complexity(0.0), WorkflowPath::FastTrack);
        assert_eq!(WorkflowPath::from_complexity(0.29), WorkflowPath::FastTrack);
        assert_eq!(WorkflowPath::from_complexity(0.3), WorkflowPath::StandardTrack);
        assert_eq!(WorkflowPath::from_complexity(0.69), WorkflowPath::StandardTrack);
        assert_eq!(WorkflowPath::from_complexity(0.7), WorkflowPath::DeepAnalysis);
        assert_eq!(WorkflowPath::from_complexity(1.0), WorkflowPath::DeepAnalysis);
    }

    #[test]
    fn test_risk_level_serde_uppercase() {
        let json = serde_json::to_string(&RiskLevel::Moderate).unwrap();
        assert_eq!(json, "\"MODERATE\"");
        let parsed: RiskLevel = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(parsed, RiskLevel::High);
    }

    #[test]
    fn test_risk_level_parse() {
        assert_eq!(RiskLevel::parse(" low "), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::parse("Medium"), Some(RiskLevel::Moderate));
        assert_eq!(RiskLevel::parse("severe"), None);
    }

    #[test]
    fn test_relationship_from_reply() {
        assert_eq!(Relationship::from_reply("Contradicts"), Relationship::Contradicts);
        assert_eq!(
            Relationship::from_reply("The evidence Supports the claim"),
            Relationship::Supports
        );
        assert_eq!(Relationship::from_reply("no idea"), Relationship::Neutral);
    }

    #[test]
    fn test_source_type_labels() {
        assert_eq!(SourceType::GovernmentRegulatory.to_string(), "Government/Regulatory");
        let json = serde_json::to_string(&SourceType::Tier1FinancialMedia).unwrap();
        assert_eq!(json, "\"Tier-1 Financial Media\"");
        assert!(!SourceType::CompanyControlled.is_independent());
        assert!(SourceType::Ngo.is_premium());
        assert!(!SourceType::WebSource.is_premium());
    }

    #[test]
    fn test_state_records_are_append_only_lookups() {
        let mut state = EsgState::new("BP", "Net zero by 2050", "Energy");
        state.record(AgentOutput::failure("risk_scoring", "timeout", 0.5));
        state.record(AgentOutput::success("risk_scoring", json!({"score": 40}), 0.8));

        assert_eq!(state.outputs_for("risk_scoring").count(), 2);
        let ok = state.first_success("risk_scoring").unwrap();
        assert!((ok.confidence - 0.8).abs() < f64::EPSILON);
        assert!(state.first_success("sentiment_analysis").is_none());
        assert_eq!(state.risk_or_moderate(), RiskLevel::Moderate);
    }

    #[test]
    fn test_latest_success_prefers_revision() {
        let mut state = EsgState::new("BP", "Net zero by 2050", "Energy");
        state.record(AgentOutput::success("contradiction_analysis", json!({"n": 1}), 0.75));
        state.record(AgentOutput::success("contradiction_analysis", json!({"n": 2}), 0.75));
        state.record(AgentOutput::failure("contradiction_analysis", "timeout", 0.5));

        let latest = state.latest_success("contradiction_analysis").unwrap();
        assert_eq!(latest.field("n"), Some(&json!(2)));
    }

    #[test]
    fn test_lookup_outlives_agent_name() {
        let mut state = EsgState::new("BP", "Net zero by 2050", "Energy");
        state.record(AgentOutput::success("contradiction_analysis", json!({"n": 1}), 0.75));

        let found = {
            let name = format!("{}_analysis", "contradiction");
            state.first_success(&name)
        };
        assert_eq!(found.and_then(|o| o.field("n")), Some(&json!(1)));
    }
}
