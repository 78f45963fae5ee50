//! Prompt templates used by the specialist agents
//!
//! All templates are MiniJinja with strict undefined variables, so each
//! render call must pass every variable the template names.

mod analysis;

pub use analysis::*;

use esg_prompt::{PromptRegistry, Result};

pub const CLAIM_EXTRACTION: &str = "esg.claim_extraction";
pub const EVIDENCE_RELATIONSHIP: &str = "esg.evidence_relationship";
pub const CONTRADICTION_ANALYSIS: &str = "esg.contradiction_analysis";
pub const PEER_IDENTIFICATION: &str = "esg.peer_identification";
pub const PEER_ESG_EXTRACTION: &str = "esg.peer_esg_extraction";
pub const SENTIMENT_ANALYSIS: &str = "esg.sentiment_analysis";
pub const INDUSTRY_CLASSIFICATION: &str = "esg.industry_classification";

/// Register all agent prompts with the given registry
pub fn register_prompts(registry: &PromptRegistry) -> Result<()> {
    registry.register(claim_extraction()?);
    registry.register(evidence_relationship()?);
    registry.register(contradiction_analysis()?);
    registry.register(peer_identification()?);
    registry.register(peer_esg_extraction()?);
    registry.register(sentiment_analysis()?);
    registry.register(industry_classification()?);
    Ok(())
}
