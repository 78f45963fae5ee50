//! Core Agent trait definition

use crate::{AgentOutput, EsgState, Result};
use async_trait::async_trait;

/// Core trait that all analysis agents implement
///
/// An agent reads the shared [`EsgState`], may update fields it owns (evidence,
/// risk level), and returns the record the workflow appends to
/// `state.agent_outputs`. Agents never append their own record.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Get the agent's name, used as the `agent` field of its records
    fn name(&self) -> &str;

    /// Run the agent against the current state
    async fn run(&self, state: &mut EsgState) -> Result<AgentOutput>;

    /// Confidence recorded when `run` fails
    fn failure_confidence(&self) -> f64 {
        0.5
    }

    /// Hook invoked after a failed run, before the failure record is appended
    fn on_failure(&self, _state: &mut EsgState) {}
}
