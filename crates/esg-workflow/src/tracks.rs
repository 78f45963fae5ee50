//! The three analysis tracks the supervisor routes between

use crate::debate::DebateOrchestrator;
use crate::monitor::ConfidenceMonitor;
use crate::report::ReportGenerationAgent;
use crate::scoring::ConfidenceScoringAgent;
use crate::verdict::VerdictAgent;
use crate::workflow::Workflow;
use esg_agents::{
    AgentContext, ClaimExtractionAgent, ContradictionAgent, EvidenceRetrievalAgent,
    RiskScoringAgent, specialists,
};
use esg_core::{Result, WorkflowPath};
use std::sync::Arc;

/// Fast, standard and deep workflows built over one context
#[derive(Debug)]
pub struct Tracks {
    fast: Workflow,
    standard: Workflow,
    deep: Workflow,
    revision: Arc<Workflow>,
}

impl Tracks {
    pub fn new(ctx: &AgentContext) -> Result<Self> {
        let fast = Workflow::builder(WorkflowPath::FastTrack.as_str())
            .add_agent(Arc::new(ClaimExtractionAgent::new(ctx.clone())))
            .add_agent(Arc::new(RiskScoringAgent::new(ctx.clone())))
            .add_agent(Arc::new(ConfidenceScoringAgent::new()))
            .add_agent(Arc::new(VerdictAgent::new()))
            .add_agent(Arc::new(ReportGenerationAgent::new()))
            .build()?;

        let core = Arc::new(
            Workflow::builder("specialists")
                .add_agents(specialists(ctx))
                .build()?,
        );

        let standard = Workflow::builder(WorkflowPath::StandardTrack.as_str())
            .add_workflow(core.clone())
            .add_agent(Arc::new(ConfidenceScoringAgent::new()))
            .add_agent(Arc::new(VerdictAgent::new()))
            .add_agent(Arc::new(ReportGenerationAgent::new()))
            .build()?;

        let revision = Arc::new(
            Workflow::builder("evidence_revision")
                .add_agent(Arc::new(EvidenceRetrievalAgent::new(ctx.clone())))
                .add_agent(Arc::new(ContradictionAgent::new(ctx.clone())))
                .add_agent(Arc::new(ConfidenceScoringAgent::new()))
                .add_agent(Arc::new(VerdictAgent::new()))
                .build()?,
        );

        let deep = Workflow::builder(WorkflowPath::DeepAnalysis.as_str())
            .add_workflow(core)
            .add_agent(Arc::new(ConfidenceScoringAgent::new()))
            .add_agent(Arc::new(VerdictAgent::new()))
            .add_stage(Arc::new(DebateOrchestrator::new(ctx.clone())))
            .add_stage(Arc::new(ConfidenceMonitor::new(revision.clone())))
            .add_agent(Arc::new(ReportGenerationAgent::new()))
            .build()?;

        Ok(Self {
            fast,
            standard,
            deep,
            revision,
        })
    }

    pub fn for_path(&self, path: WorkflowPath) -> &Workflow {
        match path {
            WorkflowPath::FastTrack => &self.fast,
            WorkflowPath::StandardTrack => &self.standard,
            WorkflowPath::DeepAnalysis => &self.deep,
        }
    }

    /// Steps the confidence monitor re-runs on the deep track
    pub fn revision(&self) -> &Workflow {
        &self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names;
    use crate::test_support::context;
    use esg_agents::names as agents;
    use esg_llm::testing::ScriptedProvider;
    use pretty_assertions::assert_eq;

    fn specialist_names() -> Vec<&'static str> {
        vec![
            agents::CLAIM_EXTRACTION,
            agents::EVIDENCE_RETRIEVAL,
            agents::CONTRADICTION_ANALYSIS,
            agents::TEMPORAL_ANALYSIS,
            agents::PEER_COMPARISON,
            agents::CREDIBILITY_ANALYSIS,
            agents::SENTIMENT_ANALYSIS,
            agents::REALTIME_MONITORING,
            agents::RISK_SCORING,
        ]
    }

    #[test]
    fn test_fast_track_steps() {
        let tracks = Tracks::new(&context(ScriptedProvider::new())).unwrap();
        assert_eq!(
            tracks.for_path(WorkflowPath::FastTrack).step_names(),
            vec![
                agents::CLAIM_EXTRACTION,
                agents::RISK_SCORING,
                names::CONFIDENCE_SCORING,
                names::VERDICT_GENERATION,
                names::REPORT_GENERATION,
            ]
        );
    }

    #[test]
    fn test_standard_track_runs_every_specialist() {
        let tracks = Tracks::new(&context(ScriptedProvider::new())).unwrap();
        let mut expected = specialist_names();
        expected.extend([
            names::CONFIDENCE_SCORING,
            names::VERDICT_GENERATION,
            names::REPORT_GENERATION,
        ]);
        assert_eq!(
            tracks.for_path(WorkflowPath::StandardTrack).step_names(),
            expected
        );
    }

    #[test]
    fn test_deep_track_debates_before_report() {
        let tracks = Tracks::new(&context(ScriptedProvider::new())).unwrap();
        let mut expected = specialist_names();
        expected.extend([
            names::CONFIDENCE_SCORING,
            names::VERDICT_GENERATION,
            names::DEBATE_ORCHESTRATOR,
            names::CONFIDENCE_MONITOR,
            names::REPORT_GENERATION,
        ]);
        let deep = tracks.for_path(WorkflowPath::DeepAnalysis);
        assert_eq!(deep.name(), "deep_analysis");
        assert_eq!(deep.step_names(), expected);
    }

    #[test]
    fn test_revision_rescores_after_new_evidence() {
        let tracks = Tracks::new(&context(ScriptedProvider::new())).unwrap();
        assert_eq!(
            tracks.revision().step_names(),
            vec![
                agents::EVIDENCE_RETRIEVAL,
                agents::CONTRADICTION_ANALYSIS,
                names::CONFIDENCE_SCORING,
                names::VERDICT_GENERATION,
            ]
        );
    }
}
