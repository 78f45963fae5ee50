//! Aggregate confidence across the agents that ran

use crate::names;
use async_trait::async_trait;
use esg_core::{Agent, AgentOutput, EsgState, Result};
use serde_json::json;
use tracing::info;

/// Confidence used when no agent produced a usable record
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Whether a record's confidence means anything
///
/// Routing, debate bookkeeping and monitor records carry a placeholder.
pub fn carries_confidence(output: &AgentOutput) -> bool {
    !matches!(
        output.agent.as_str(),
        names::SUPERVISOR | names::DEBATE_ORCHESTRATOR | names::CONFIDENCE_MONITOR
    )
}

/// Mean confidence of the successful records that carry one
pub fn average_confidence(outputs: &[AgentOutput]) -> (f64, usize) {
    let confidences: Vec<f64> = outputs
        .iter()
        .filter(|o| o.is_success() && carries_confidence(o))
        .map(|o| o.confidence)
        .collect();

    if confidences.is_empty() {
        (DEFAULT_CONFIDENCE, 0)
    } else {
        (
            confidences.iter().sum::<f64>() / confidences.len() as f64,
            confidences.len(),
        )
    }
}

/// Sets `state.confidence` from the records so far
#[derive(Debug, Default)]
pub struct ConfidenceScoringAgent;

impl ConfidenceScoringAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for ConfidenceScoringAgent {
    fn name(&self) -> &str {
        names::CONFIDENCE_SCORING
    }

    async fn run(&self, state: &mut EsgState) -> Result<AgentOutput> {
        let (confidence, counted) = average_confidence(&state.agent_outputs);
        info!("Average confidence {:.2}% from {counted} agents", confidence * 100.0);

        state.confidence = confidence;
        Ok(AgentOutput::success(
            names::CONFIDENCE_SCORING,
            json!({ "agents_counted": counted }),
            confidence,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn test_average_skips_errors_and_routing() {
        let mut state = EsgState::new("BP", "claim", "Energy");
        state.record(
            AgentOutput::success(names::SUPERVISOR, Value::Null, 0.0)
                .with_action("complexity_assessment"),
        );
        state.record(AgentOutput::success("claim_extraction", Value::Null, 0.8));
        state.record(AgentOutput::failure("evidence_retrieval", "down", 0.3));
        state.record(AgentOutput::success("risk_scoring", Value::Null, 0.6));

        let output = ConfidenceScoringAgent::new().run(&mut state).await.unwrap();

        assert!((state.confidence - 0.7).abs() < 1e-9);
        assert_eq!(output.field("agents_counted"), Some(&json!(2)));
    }

    #[test]
    fn test_default_when_nothing_counts() {
        let outputs = vec![AgentOutput::failure("claim_extraction", "timeout", 0.5)];
        assert_eq!(average_confidence(&outputs), (DEFAULT_CONFIDENCE, 0));
    }
}
