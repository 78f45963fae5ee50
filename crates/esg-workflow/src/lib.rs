//! Orchestration for the ESG greenwashing detector
//!
//! A [`Supervisor`] scores how complex a claim is and routes it to one of
//! three [`Tracks`]: a fast track, the standard specialist sequence, or deep
//! analysis with a multi-agent debate and a confidence check. Every track ends
//! with the verdict rules in [`verdict`] and the report in [`report`].
//!
//! [`Detector`] ties it together for one claim and prints the console
//! summary.

pub mod debate;
pub mod detector;
pub mod executor;
pub mod monitor;
pub mod prompts;
pub mod report;
pub mod scoring;
pub mod supervisor;
pub mod tracks;
pub mod verdict;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use debate::{DebateOrchestrator, Resolution};
pub use detector::{AnalysisOutcome, Detector, SUMMARY_MARKER, detect_industry, executive_summary};
pub use monitor::ConfidenceMonitor;
pub use report::{ReportGenerationAgent, ReportGenerator};
pub use scoring::ConfidenceScoringAgent;
pub use supervisor::Supervisor;
pub use tracks::Tracks;
pub use verdict::VerdictAgent;
pub use workflow::{Stage, Workflow, WorkflowBuilder, WorkflowStep};

/// Names recorded by the orchestration steps
pub mod names {
    pub use esg_agents::names::DEBATE_ORCHESTRATOR;

    pub const SUPERVISOR: &str = "supervisor";
    pub const CONFIDENCE_SCORING: &str = "confidence_scoring";
    pub const VERDICT_GENERATION: &str = "verdict_generation";
    pub const DEBATE_RESOLUTION: &str = "debate_resolution";
    pub const CONFIDENCE_MONITOR: &str = "confidence_monitor";
    pub const REPORT_GENERATION: &str = "report_generation";
}
