//! Complexity assessment and track routing

use crate::names;
use crate::prompts::COMPLEXITY_ASSESSMENT;
use crate::workflow::Stage;
use async_trait::async_trait;
use esg_agents::AgentContext;
use esg_core::{AgentOutput, EsgState, Error, Result, WorkflowPath};
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;
use tracing::{info, warn};

/// Complexity used when the assessment fails, which routes to the standard track
pub const DEFAULT_COMPLEXITY: f64 = 0.5;

static NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").ok());

/// First number in a reply, clamped to [0, 1]
pub fn parse_complexity(reply: &str) -> Option<f64> {
    let number = NUMBER.as_ref()?.find(reply)?;
    let value: f64 = number.as_str().parse().ok()?;
    Some(value.clamp(0.0, 1.0))
}

/// Scores claim complexity and picks the analysis track
pub struct Supervisor {
    ctx: AgentContext,
}

impl Supervisor {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    /// Complexity in [0, 1], [`DEFAULT_COMPLEXITY`] on any error
    pub async fn assess_complexity(&self, state: &EsgState) -> f64 {
        match self.ask(state).await {
            Ok(score) => score,
            Err(e) => {
                warn!("Complexity assessment failed, using {DEFAULT_COMPLEXITY}: {e}");
                DEFAULT_COMPLEXITY
            }
        }
    }

    async fn ask(&self, state: &EsgState) -> Result<f64> {
        let prompt = self.ctx.render(
            COMPLEXITY_ASSESSMENT,
            &json!({ "claim": state.claim, "company": state.company }),
        )?;
        let reply = self.ctx.primary().complete(&prompt).await?;
        parse_complexity(&reply).ok_or(Error::UnparseableResponse(reply))
    }
}

#[async_trait]
impl Stage for Supervisor {
    fn name(&self) -> &str {
        names::SUPERVISOR
    }

    #[tracing::instrument(skip_all, fields(company = %state.company))]
    async fn run(&self, state: &mut EsgState) -> Result<()> {
        let complexity = self.assess_complexity(state).await;
        state.complexity_score = complexity;
        state.record(
            AgentOutput::success(names::SUPERVISOR, Value::Null, 0.0)
                .with_action("complexity_assessment")
                .with_detail("complexity_score", json!(complexity))
                .with_detail(
                    "reasoning",
                    json!(format!("Assessed claim complexity: {complexity:.2}")),
                ),
        );

        let path = WorkflowPath::from_complexity(complexity);
        state.workflow_path = Some(path);
        state.record(
            AgentOutput::success(names::SUPERVISOR, Value::Null, 0.0)
                .with_action("workflow_routing")
                .with_detail("selected_path", json!(path.as_str()))
                .with_detail("reason", json!(format!("Complexity {complexity:.2} → {path}"))),
        );

        info!("Complexity {complexity:.2}, routing to {}", path.display_name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context;
    use esg_llm::testing::ScriptedProvider;

    #[test]
    fn test_parse_complexity() {
        assert_eq!(parse_complexity("0.85"), Some(0.85));
        assert_eq!(parse_complexity("Complexity: 0.4 because..."), Some(0.4));
        assert_eq!(parse_complexity("7"), Some(1.0));
        assert_eq!(parse_complexity("-0.2"), Some(0.0));
        assert_eq!(parse_complexity("very vague"), None);
    }

    #[tokio::test]
    async fn test_routes_vague_claim_to_deep_analysis() {
        let ctx = context(ScriptedProvider::new().default_reply("0.9"));
        let mut state = EsgState::new("H&M", "100% sustainable fashion", "Consumer Goods");

        Supervisor::new(ctx).run(&mut state).await.unwrap();

        assert!((state.complexity_score - 0.9).abs() < f64::EPSILON);
        assert_eq!(state.workflow_path, Some(WorkflowPath::DeepAnalysis));
        let actions: Vec<_> = state
            .outputs_for(names::SUPERVISOR)
            .filter_map(|o| o.action.as_deref())
            .collect();
        assert_eq!(actions, vec!["complexity_assessment", "workflow_routing"]);
        assert_eq!(
            state.agent_outputs[1].detail("selected_path"),
            Some(&json!("deep_analysis"))
        );
    }

    #[tokio::test]
    async fn test_llm_failure_defaults_to_standard_track() {
        let ctx = context(ScriptedProvider::new().failing());
        let mut state = EsgState::new("BP", "Net zero by 2050", "Energy");

        Supervisor::new(ctx).run(&mut state).await.unwrap();

        assert!((state.complexity_score - DEFAULT_COMPLEXITY).abs() < f64::EPSILON);
        assert_eq!(state.workflow_path, Some(WorkflowPath::StandardTrack));
    }
}
