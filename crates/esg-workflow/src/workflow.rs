//! Workflow definition and execution

use crate::executor::{execute_agent, execute_stage};
use async_trait::async_trait;
use esg_core::{Agent, EsgState, Error, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::info;

/// A workflow step that manages the state itself
///
/// Agents return exactly one record. Stages such as the supervisor or the
/// debate may append several records or none, and may run other workflows.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, state: &mut EsgState) -> Result<()>;
}

/// A step in a workflow
#[derive(Clone)]
pub enum WorkflowStep {
    /// Run a single agent and record its output
    Agent(Arc<dyn Agent>),
    /// Run a stage that records its own outputs
    Stage(Arc<dyn Stage>),
    /// Execute a sub-workflow
    SubWorkflow(Arc<Workflow>),
}

impl WorkflowStep {
    fn describe(&self) -> Vec<String> {
        match self {
            Self::Agent(agent) => vec![agent.name().to_string()],
            Self::Stage(stage) => vec![stage.name().to_string()],
            Self::SubWorkflow(workflow) => workflow.step_names(),
        }
    }
}

/// An ordered list of agents and stages run against one [`EsgState`]
///
/// Steps run sequentially; each sees everything earlier steps wrote. A failing
/// step never stops the workflow, its failure is recorded and the next step
/// runs. Workflows nest, so a track can reuse a shared core sequence.
///
/// # Example
///
/// ```no_run
/// use esg_workflow::Workflow;
/// use esg_agents::{AgentContext, ClaimExtractionAgent, RiskScoringAgent};
/// use esg_core::EsgState;
/// use std::sync::Arc;
///
/// # async fn example(ctx: AgentContext) -> esg_core::Result<()> {
/// let workflow = Workflow::builder("fast_track")
///     .add_agent(Arc::new(ClaimExtractionAgent::new(ctx.clone())))
///     .add_agent(Arc::new(RiskScoringAgent::new(ctx)))
///     .build()?;
///
/// let mut state = EsgState::new("BP", "Net zero by 2050", "Energy");
/// workflow.execute(&mut state).await;
/// # Ok(())
/// # }
/// ```
pub struct Workflow {
    name: String,
    steps: Vec<WorkflowStep>,
}

impl Workflow {
    /// Create a new workflow builder
    pub fn builder(name: impl Into<String>) -> WorkflowBuilder {
        WorkflowBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the agents and stages in execution order, sub-workflows flattened
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().flat_map(WorkflowStep::describe).collect()
    }

    /// Execute every step against the state
    ///
    /// Boxed so that sub-workflows can recurse.
    pub fn execute<'a>(
        &'a self,
        state: &'a mut EsgState,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            info!("Running workflow '{}' ({} steps)", self.name, self.steps.len());

            for step in &self.steps {
                match step {
                    WorkflowStep::Agent(agent) => {
                        execute_agent(agent.as_ref(), state).await;
                    }
                    WorkflowStep::Stage(stage) => {
                        execute_stage(stage.as_ref(), state).await;
                    }
                    WorkflowStep::SubWorkflow(workflow) => {
                        workflow.execute(state).await;
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("steps", &self.step_names())
            .finish()
    }
}

/// Builder for constructing workflows
pub struct WorkflowBuilder {
    name: String,
    steps: Vec<WorkflowStep>,
}

impl WorkflowBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Add an agent to the workflow
    pub fn add_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.steps.push(WorkflowStep::Agent(agent));
        self
    }

    /// Add several agents in order
    pub fn add_agents(mut self, agents: impl IntoIterator<Item = Arc<dyn Agent>>) -> Self {
        self.steps
            .extend(agents.into_iter().map(WorkflowStep::Agent));
        self
    }

    /// Add a self-recording stage
    pub fn add_stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.steps.push(WorkflowStep::Stage(stage));
        self
    }

    /// Add a sub-workflow to the workflow
    pub fn add_workflow(mut self, workflow: Arc<Workflow>) -> Self {
        self.steps.push(WorkflowStep::SubWorkflow(workflow));
        self
    }

    /// Build the workflow, rejecting one with no steps
    pub fn build(self) -> Result<Workflow> {
        if self.steps.is_empty() {
            return Err(Error::Generic(format!(
                "workflow '{}' has no steps",
                self.name
            )));
        }
        Ok(Workflow {
            name: self.name,
            steps: self.steps,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use esg_core::AgentOutput;
    use serde_json::json;

    /// Agent that records a fixed confidence, or fails when asked to
    pub(crate) struct Fixed {
        pub name: &'static str,
        pub confidence: f64,
        pub fail: bool,
    }

    impl Fixed {
        pub(crate) fn ok(name: &'static str, confidence: f64) -> Arc<dyn Agent> {
            Arc::new(Self {
                name,
                confidence,
                fail: false,
            })
        }

        pub(crate) fn failing(name: &'static str) -> Arc<dyn Agent> {
            Arc::new(Self {
                name,
                confidence: 0.0,
                fail: true,
            })
        }
    }

    #[async_trait]
    impl Agent for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(&self, _state: &mut EsgState) -> Result<AgentOutput> {
            if self.fail {
                return Err(Error::ProcessingFailed(format!("{} broke", self.name)));
            }
            Ok(AgentOutput::success(self.name, json!({}), self.confidence))
        }
    }

    struct Counter;

    #[async_trait]
    impl Stage for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        async fn run(&self, state: &mut EsgState) -> Result<()> {
            state.iteration_count += 1;
            Ok(())
        }
    }

    #[test]
    fn test_build_rejects_empty_workflow() {
        let err = Workflow::builder("empty").build().unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_step_names_flatten_sub_workflows() {
        let core = Arc::new(
            Workflow::builder("core")
                .add_agent(Fixed::ok("a", 0.5))
                .add_agent(Fixed::ok("b", 0.5))
                .build()
                .unwrap(),
        );
        let track = Workflow::builder("track")
            .add_workflow(core)
            .add_stage(Arc::new(Counter))
            .add_agent(Fixed::ok("c", 0.5))
            .build()
            .unwrap();

        assert_eq!(track.step_names(), vec!["a", "b", "counter", "c"]);
    }

    #[tokio::test]
    async fn test_execute_runs_steps_in_order_and_survives_failures() {
        let workflow = Workflow::builder("track")
            .add_agent(Fixed::ok("first", 0.8))
            .add_agent(Fixed::failing("second"))
            .add_stage(Arc::new(Counter))
            .add_agent(Fixed::ok("third", 0.6))
            .build()
            .unwrap();

        let mut state = EsgState::new("BP", "Net zero by 2050", "Energy");
        workflow.execute(&mut state).await;

        let agents: Vec<&str> = state.agent_outputs.iter().map(|o| o.agent.as_str()).collect();
        assert_eq!(agents, vec!["first", "second", "third"]);
        assert!(!state.agent_outputs[1].is_success());
        assert_eq!(state.iteration_count, 1);
    }
}
