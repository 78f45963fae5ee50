//! Final verdict produced by the verdict rules

use crate::RiskLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Intelligence layer that contributed to a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntelligenceSource {
    #[serde(rename = "Historical Track Record")]
    HistoricalTrackRecord,
    #[serde(rename = "Contradiction Analysis")]
    ContradictionAnalysis,
    #[serde(rename = "Multi-Agent Debate")]
    MultiAgentDebate,
    #[serde(rename = "Language Pattern Detection")]
    LanguagePatternDetection,
    #[serde(rename = "Industry Risk Analysis")]
    IndustryRiskAnalysis,
}

impl IntelligenceSource {
    pub const ALL: [Self; 5] = [
        Self::HistoricalTrackRecord,
        Self::ContradictionAnalysis,
        Self::MultiAgentDebate,
        Self::LanguagePatternDetection,
        Self::IndustryRiskAnalysis,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::HistoricalTrackRecord => "Historical Track Record",
            Self::ContradictionAnalysis => "Contradiction Analysis",
            Self::MultiAgentDebate => "Multi-Agent Debate",
            Self::LanguagePatternDetection => "Language Pattern Detection",
            Self::IndustryRiskAnalysis => "Industry Risk Analysis",
        }
    }
}

impl fmt::Display for IntelligenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final verdict for an analysed claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub company: String,
    pub claim: String,
    pub risk_level: RiskLevel,
    /// Confidence before the verdict rules ran
    pub confidence: f64,
    pub evidence_count: usize,
    pub timestamp: DateTime<Utc>,
    /// Why the risk level was raised, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation: Option<String>,
    /// Why the risk level was lowered, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downgrade: Option<String>,
    #[serde(default)]
    pub verified_metrics: bool,
    /// Confidence after the verdict rules ran
    pub final_confidence: f64,
    #[serde(default)]
    pub intelligence_sources: Vec<IntelligenceSource>,
}

impl Verdict {
    /// Whether any rule changed the incoming risk level
    pub fn was_adjusted(&self) -> bool {
        self.escalation.is_some() || self.downgrade.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_serialization() {
        let verdict = Verdict {
            company: "H&M".to_string(),
            claim: "100% sustainable".to_string(),
            risk_level: RiskLevel::High,
            confidence: 0.8,
            evidence_count: 4,
            timestamp: Utc::now(),
            escalation: Some("Absolute claim without verification".to_string()),
            downgrade: None,
            verified_metrics: false,
            final_confidence: 0.48,
            intelligence_sources: IntelligenceSource::ALL.to_vec(),
        };

        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["risk_level"], "HIGH");
        assert_eq!(json["intelligence_sources"][2], "Multi-Agent Debate");
        assert!(json.get("downgrade").is_none());
        assert!(verdict.was_adjusted());
    }
}
