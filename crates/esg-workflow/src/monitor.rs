//! Confidence check with one evidence revision pass

use crate::names;
use crate::scoring::DEFAULT_CONFIDENCE;
use crate::workflow::{Stage, Workflow};
use async_trait::async_trait;
use esg_core::{AgentOutput, EsgState, Result};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

/// Below this aggregate confidence the evidence is gathered again
pub const REVISION_THRESHOLD: f64 = 0.5;

/// Revisions allowed per analysis
pub const MAX_ITERATIONS: u32 = 2;

/// Number of analysing agents a debate conflict is measured against
const ANALYTICAL_AGENTS: f64 = 13.0;

/// Aggregate confidence over the analysing agents, penalised for debate conflict
///
/// Each recorded conflict lowers the mean by up to 25%, in proportion to the
/// number of agents involved.
pub fn aggregate_confidence(state: &EsgState) -> f64 {
    let confidences: Vec<f64> = state
        .agent_outputs
        .iter()
        .filter(|o| {
            o.is_success()
                && !matches!(
                    o.agent.as_str(),
                    names::SUPERVISOR
                        | names::DEBATE_ORCHESTRATOR
                        | names::DEBATE_RESOLUTION
                        | names::CONFIDENCE_MONITOR
                )
        })
        .map(|o| o.confidence)
        .collect();

    let mut confidence = if confidences.is_empty() {
        DEFAULT_CONFIDENCE
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    for debate in state.outputs_for(names::DEBATE_ORCHESTRATOR) {
        let conflicting = debate
            .detail("conflicting_agents")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        if conflicting > 0 {
            let penalty = (conflicting as f64 / ANALYTICAL_AGENTS * 0.30).min(0.25);
            warn!("Confidence reduced by {:.0}% due to agent conflicts", penalty * 100.0);
            confidence *= 1.0 - penalty;
        }
    }
    confidence
}

/// Re-runs evidence gathering once when confidence is critically low
///
/// The revision workflow must end with confidence scoring and the verdict
/// rules, otherwise the new evidence only reaches the report.
pub struct ConfidenceMonitor {
    revision: Arc<Workflow>,
    max_iterations: u32,
}

impl ConfidenceMonitor {
    /// Monitor that runs `revision` when a revision is triggered
    pub fn new(revision: Arc<Workflow>) -> Self {
        Self {
            revision,
            max_iterations: MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Whether the current state warrants a revision pass
    pub fn should_revise(&self, confidence: f64, state: &EsgState) -> bool {
        confidence < REVISION_THRESHOLD && state.iteration_count < self.max_iterations
    }
}

#[async_trait]
impl Stage for ConfidenceMonitor {
    fn name(&self) -> &str {
        names::CONFIDENCE_MONITOR
    }

    async fn run(&self, state: &mut EsgState) -> Result<()> {
        let confidence = aggregate_confidence(state);

        if !self.should_revise(confidence, state) {
            state.needs_revision = false;
            state.record(
                AgentOutput::success(names::CONFIDENCE_MONITOR, Value::Null, 0.0)
                    .with_action("finalized")
                    .with_detail(
                        "reason",
                        json!(format!("Confidence {:.2}%", confidence * 100.0)),
                    )
                    .with_detail("final_confidence", json!(confidence)),
            );
            return Ok(());
        }

        state.needs_revision = true;
        state.iteration_count += 1;
        info!(
            "Confidence {:.2}% critically low, revising (iteration {})",
            confidence * 100.0,
            state.iteration_count
        );
        state.record(
            AgentOutput::success(names::CONFIDENCE_MONITOR, Value::Null, 0.0)
                .with_action("triggered_revision")
                .with_detail(
                    "reason",
                    json!(format!("Confidence {:.2}% critically low", confidence * 100.0)),
                )
                .with_detail("iteration", json!(state.iteration_count)),
        );

        self.revision.execute(state).await;
        state.needs_revision = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ConfidenceScoringAgent;
    use crate::workflow::tests::Fixed;

    fn revision() -> Arc<Workflow> {
        Arc::new(
            Workflow::builder("revision")
                .add_agent(Fixed::ok("evidence_retrieval", 0.7))
                .add_agent(Fixed::ok("contradiction_analysis", 0.75))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_aggregate_applies_debate_penalty() {
        let mut state = EsgState::new("BP", "claim", "Energy");
        state.record(AgentOutput::success("risk_scoring", Value::Null, 0.8));
        state.record(AgentOutput::success(names::DEBATE_RESOLUTION, Value::Null, 0.2));
        state.record(
            AgentOutput::success(names::DEBATE_ORCHESTRATOR, Value::Null, 0.0)
                .with_action("conflict_detected")
                .with_detail("conflicting_agents", json!(["a", "b", "c", "d"])),
        );

        let expected = 0.8 * (1.0 - 4.0 / 13.0 * 0.30);
        assert!((aggregate_confidence(&state) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_penalty_is_capped() {
        let mut state = EsgState::new("BP", "claim", "Energy");
        state.record(AgentOutput::success("risk_scoring", Value::Null, 1.0));
        let many: Vec<String> = (0..13).map(|i| format!("agent_{i}")).collect();
        state.record(
            AgentOutput::success(names::DEBATE_ORCHESTRATOR, Value::Null, 0.0)
                .with_detail("conflicting_agents", json!(many)),
        );
        assert!((aggregate_confidence(&state) - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_low_confidence_triggers_one_revision() {
        let mut state = EsgState::new("BP", "claim", "Energy");
        state.record(AgentOutput::success("claim_extraction", Value::Null, 0.3));

        ConfidenceMonitor::new(revision()).run(&mut state).await.unwrap();

        assert_eq!(state.iteration_count, 1);
        assert!(!state.needs_revision);
        let agents: Vec<&str> = state.agent_outputs.iter().map(|o| o.agent.as_str()).collect();
        assert_eq!(
            agents,
            vec![
                "claim_extraction",
                names::CONFIDENCE_MONITOR,
                "evidence_retrieval",
                "contradiction_analysis"
            ]
        );
        assert_eq!(
            state.agent_outputs[1].action.as_deref(),
            Some("triggered_revision")
        );
    }

    #[tokio::test]
    async fn test_adequate_confidence_finalizes() {
        let mut state = EsgState::new("BP", "claim", "Energy");
        state.record(AgentOutput::success("claim_extraction", Value::Null, 0.8));

        ConfidenceMonitor::new(revision()).run(&mut state).await.unwrap();

        assert_eq!(state.iteration_count, 0);
        let last = state.agent_outputs.last().unwrap();
        assert_eq!(last.action.as_deref(), Some("finalized"));
    }

    #[tokio::test]
    async fn test_iteration_limit_stops_revisions() {
        let mut state = EsgState::new("BP", "claim", "Energy");
        state.iteration_count = MAX_ITERATIONS;
        state.record(AgentOutput::success("claim_extraction", Value::Null, 0.1));

        ConfidenceMonitor::new(revision()).run(&mut state).await.unwrap();

        assert_eq!(state.iteration_count, MAX_ITERATIONS);
        assert_eq!(state.agent_outputs.len(), 2);
    }

    #[tokio::test]
    async fn test_revision_updates_state_confidence() {
        let revision = Arc::new(
            Workflow::builder("revision")
                .add_agent(Fixed::ok("evidence_retrieval", 0.7))
                .add_agent(Fixed::ok("contradiction_analysis", 0.8))
                .add_agent(Arc::new(ConfidenceScoringAgent::new()))
                .build()
                .unwrap(),
        );
        let mut state = EsgState::new("BP", "claim", "Energy");
        state.record(AgentOutput::success("claim_extraction", Value::Null, 0.3));
        state.confidence = 0.3;

        ConfidenceMonitor::new(revision).run(&mut state).await.unwrap();

        let expected = (0.3 + 0.7 + 0.8) / 3.0;
        assert!((state.confidence - expected).abs() < 1e-9);
        assert_eq!(
            state.agent_outputs.last().map(|o| o.agent.as_str()),
            Some(names::CONFIDENCE_SCORING)
        );
    }
}
