//! Step execution with failure recording
//!
//! Every step runs to completion or to an error; errors become failure
//! records so that later steps and the final report can see them.

use crate::workflow::Stage;
use esg_core::{Agent, AgentOutput, EsgState};
use tracing::{info, warn};

/// Run an agent and append its record, or a failure record
///
/// Returns whether the agent succeeded.
pub async fn execute_agent(agent: &dyn Agent, state: &mut EsgState) -> bool {
    let name = agent.name().to_string();
    info!("▶ {name}");

    match agent.run(state).await {
        Ok(output) => {
            info!("✓ {name} (confidence {:.2})", output.confidence);
            state.record(output);
            true
        }
        Err(e) => {
            warn!("✗ {name} failed: {e}");
            agent.on_failure(state);
            state.record(AgentOutput::failure(
                name,
                e.to_string(),
                agent.failure_confidence(),
            ));
            false
        }
    }
}

/// Run a stage; a failed stage leaves a failure record under its name
pub async fn execute_stage(stage: &dyn Stage, state: &mut EsgState) -> bool {
    let name = stage.name().to_string();
    info!("▶ {name}");

    match stage.run(state).await {
        Ok(()) => true,
        Err(e) => {
            warn!("✗ {name} failed: {e}");
            state.record(AgentOutput::failure(name, e.to_string(), 0.5));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::tests::Fixed;
    use async_trait::async_trait;
    use esg_core::{Error, Result, RiskLevel};

    struct Scorer;

    #[async_trait]
    impl Agent for Scorer {
        fn name(&self) -> &str {
            "risk_scoring"
        }

        async fn run(&self, _state: &mut EsgState) -> Result<AgentOutput> {
            Err(Error::LlmUnavailable("all providers failed".to_string()))
        }

        fn failure_confidence(&self) -> f64 {
            0.3
        }

        fn on_failure(&self, state: &mut EsgState) {
            state.risk_level = Some(RiskLevel::Moderate);
        }
    }

    struct Broken;

    #[async_trait]
    impl Stage for Broken {
        fn name(&self) -> &str {
            "supervisor"
        }

        async fn run(&self, _state: &mut EsgState) -> Result<()> {
            Err(Error::Generic("routing failed".to_string()))
        }
    }

    #[tokio::test]
    async fn test_success_is_recorded() {
        let mut state = EsgState::new("BP", "claim", "Energy");
        let agent = Fixed::ok("claim_extraction", 0.8);
        assert!(execute_agent(agent.as_ref(), &mut state).await);
        assert_eq!(state.agent_outputs.len(), 1);
        assert!(state.agent_outputs[0].is_success());
    }

    #[tokio::test]
    async fn test_failure_uses_agent_hooks() {
        let mut state = EsgState::new("BP", "claim", "Energy");
        assert!(!execute_agent(&Scorer, &mut state).await);

        let record = &state.agent_outputs[0];
        assert_eq!(record.agent, "risk_scoring");
        assert_eq!(
            record.error.as_deref(),
            Some("LLM unavailable: all providers failed")
        );
        assert!((record.confidence - 0.3).abs() < f64::EPSILON);
        assert_eq!(state.risk_level, Some(RiskLevel::Moderate));
    }

    #[tokio::test]
    async fn test_stage_failure_is_recorded() {
        let mut state = EsgState::new("BP", "claim", "Energy");
        assert!(!execute_stage(&Broken, &mut state).await);
        assert_eq!(state.agent_outputs[0].agent, "supervisor");
        assert!(!state.agent_outputs[0].is_success());
    }
}
