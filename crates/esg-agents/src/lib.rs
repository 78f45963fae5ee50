//! Specialist analysers for the ESG greenwashing detector
//!
//! Every analyser implements [`esg_core::Agent`]: it reads the shared
//! [`esg_core::EsgState`], consults the LLM clients and evidence sources held
//! by an [`AgentContext`], and returns one [`esg_core::AgentOutput`] whose
//! payload is the serialized report type defined next to the agent.
//!
//! Later agents read earlier reports back with [`report`], so the risk
//! scorer sees exactly what the contradiction or credibility analysers wrote.

pub mod claim_extraction;
pub mod context;
pub mod contradiction;
pub mod credibility;
pub mod evidence_retrieval;
pub mod historical;
pub mod json;
pub mod peer_comparison;
pub mod prompts;
pub mod realtime;
pub mod risk_scoring;
pub mod sentiment;

#[cfg(test)]
pub(crate) mod test_support;

pub use claim_extraction::{Claim, ClaimExtractionAgent, ExtractedClaims};
pub use context::AgentContext;
pub use contradiction::{ClaimVerdict, ContradictionAgent, ContradictionReport};
pub use credibility::{CredibilityAgent, CredibilityReport};
pub use evidence_retrieval::{EvidenceReport, EvidenceRetrievalAgent, QualityMetrics};
pub use historical::{HistoricalAgent, HistoricalReport};
pub use peer_comparison::{PeerComparisonAgent, PeerReport};
pub use realtime::{RealtimeMonitorAgent, RealtimeReport};
pub use risk_scoring::{RiskReport, RiskScoringAgent};
pub use sentiment::{SentimentAgent, SentimentReport};

use esg_core::{Agent, EsgState};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Agent names as recorded in `AgentOutput::agent`
pub mod names {
    pub const CLAIM_EXTRACTION: &str = "claim_extraction";
    pub const EVIDENCE_RETRIEVAL: &str = "evidence_retrieval";
    pub const CONTRADICTION_ANALYSIS: &str = "contradiction_analysis";
    pub const TEMPORAL_ANALYSIS: &str = "temporal_analysis";
    pub const PEER_COMPARISON: &str = "peer_comparison";
    pub const CREDIBILITY_ANALYSIS: &str = "credibility_analysis";
    pub const SENTIMENT_ANALYSIS: &str = "sentiment_analysis";
    pub const REALTIME_MONITORING: &str = "realtime_monitoring";
    pub const RISK_SCORING: &str = "risk_scoring";
    pub const DEBATE_ORCHESTRATOR: &str = "debate_orchestrator";
}

/// Decode the latest successful report of the named agent
///
/// Returns `None` when the agent has not run, failed, or wrote a payload of a
/// different shape.
pub fn report<T: DeserializeOwned>(state: &EsgState, agent: &str) -> Option<T> {
    let output = state.latest_success(agent)?;
    serde_json::from_value(output.output.clone()).ok()
}

/// One instance of every specialist, in standard-track order
pub fn specialists(ctx: &AgentContext) -> Vec<Arc<dyn Agent>> {
    vec![
        Arc::new(ClaimExtractionAgent::new(ctx.clone())),
        Arc::new(EvidenceRetrievalAgent::new(ctx.clone())),
        Arc::new(ContradictionAgent::new(ctx.clone())),
        Arc::new(HistoricalAgent::new(ctx.clone())),
        Arc::new(PeerComparisonAgent::new(ctx.clone())),
        Arc::new(CredibilityAgent::new()),
        Arc::new(SentimentAgent::new(ctx.clone())),
        Arc::new(RealtimeMonitorAgent::new(ctx.clone())),
        Arc::new(RiskScoringAgent::new(ctx.clone())),
    ]
}
