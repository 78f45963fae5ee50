//! Agent output records

use crate::RiskLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One record appended to the analysis state by an agent run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOutput {
    /// Name of the agent that produced the record
    pub agent: String,

    /// Agent-specific payload
    #[serde(default)]
    pub output: Value,

    /// Confidence in [0, 1]
    pub confidence: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Error message when the run failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,

    /// Sub-step label for agents that emit several records (supervisor, debate)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Whether the agent fetched live data
    #[serde(default)]
    pub live_fetch: bool,

    /// Extra top-level fields (vote distribution, conflicting agents, ...)
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl AgentOutput {
    /// Create a successful record stamped with the current time
    pub fn success(agent: impl Into<String>, output: Value, confidence: f64) -> Self {
        Self {
            agent: agent.into(),
            output,
            confidence,
            timestamp: Some(Utc::now()),
            error: None,
            risk_level: None,
            action: None,
            live_fetch: false,
            details: Map::new(),
        }
    }

    /// Create a failure record carrying the error message
    pub fn failure(
        agent: impl Into<String>,
        error: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            agent: agent.into(),
            output: Value::Null,
            confidence,
            timestamp: Some(Utc::now()),
            error: Some(error.into()),
            risk_level: None,
            action: None,
            live_fetch: false,
            details: Map::new(),
        }
    }

    pub fn with_risk_level(mut self, level: RiskLevel) -> Self {
        self.risk_level = Some(level);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Attach an extra top-level field
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// Mark the record as produced from live data
    pub fn live(mut self) -> Self {
        self.live_fetch = true;
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Read a field from the payload
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.output.get(key)
    }

    /// Read an extra top-level field
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_record() {
        let out = AgentOutput::success("sentiment_analysis", json!({"score": 42}), 0.7)
            .with_risk_level(RiskLevel::High)
            .live();
        assert!(out.is_success());
        assert!(out.live_fetch);
        assert_eq!(out.field("score"), Some(&json!(42)));
        assert!(out.timestamp.is_some());
    }

    #[test]
    fn test_failure_record() {
        let out = AgentOutput::failure("evidence_retrieval", "API down", 0.3);
        assert!(!out.is_success());
        assert_eq!(out.error.as_deref(), Some("API down"));
        assert_eq!(out.output, Value::Null);
    }

    #[test]
    fn test_details_flatten_to_top_level() {
        let out = AgentOutput::success("debate_orchestrator", Value::Null, 0.6)
            .with_action("conflict_detected")
            .with_detail("conflicting_agents", json!(["risk_scoring"]));

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["action"], "conflict_detected");
        assert_eq!(json["conflicting_agents"][0], "risk_scoring");

        let back: AgentOutput = serde_json::from_value(json).unwrap();
        assert_eq!(back.detail("conflicting_agents"), Some(&json!(["risk_scoring"])));
    }
}
