//! Prompt templates used by the supervisor and the debate

use esg_prompt::{JinjaTemplate, PromptRegistry, Result};

pub const COMPLEXITY_ASSESSMENT: &str = "esg.complexity_assessment";
pub const DEBATE_ARGUMENT: &str = "esg.debate_argument";

/// Complexity score in [0, 1] used to route a claim
pub fn complexity_assessment() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        COMPLEXITY_ASSESSMENT,
        r#"Analyze the complexity of this ESG claim on a scale of 0.0 to 1.0:

Claim: {{ claim }}
Company: {{ company }}

Complexity factors:
- Quantitative specificity (0.1): Has specific numbers/percentages? (e.g., "reduced emissions by 30%")
- Temporal clarity (0.2): Specific timeframe? (e.g., "in 2024" vs "committed to")
- Verifiability (0.3): Can be verified with public data? (emissions data, financial reports)
- Ambiguity (0.2): Vague terms like "sustainable", "eco-friendly", "green"
- Scope (0.2): Broad claims vs specific initiatives

Examples:
- "BP reduced carbon emissions by 15% in 2023" -> 0.2 (specific, verifiable)
- "We are committed to sustainability" -> 0.9 (vague, unverifiable)
- "Invested $500M in renewable energy projects" -> 0.4 (specific amount, moderate complexity)

Return ONLY a single float between 0.0 and 1.0, nothing else."#,
    )
}

/// One agent's argument in a debate round
pub fn debate_argument() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        DEBATE_ARGUMENT,
        r"You are the {{ agent }} in an ESG greenwashing analysis debate.

CLAIM BEING ANALYZED:
Company: {{ company }}
Industry: {{ industry }}
Claim: {{ claim }}

YOUR POSITION:
Verdict: {{ verdict }} risk
Confidence: {{ confidence }}
Initial Reasoning: {{ reasoning | clip(200) }}

OPPOSING POSITIONS:
{{ opposing }}

PREVIOUS DEBATE CONTEXT (Round {{ round }}/{{ rounds }}):
{{ previous }}

TASK:
Defend your {{ verdict }} risk verdict with specific evidence.
Address opposing arguments with concrete counterpoints.
Cite specific data points, timestamps, or regulatory violations if applicable.

Provide a concise argument (3-4 sentences).",
    )
}

/// Register the workflow prompts alongside the agent prompts
pub fn register_prompts(registry: &PromptRegistry) -> Result<()> {
    registry.register(complexity_assessment()?);
    registry.register(debate_argument()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_complexity_prompt() {
        let registry = PromptRegistry::new();
        register_prompts(&registry).unwrap();

        let prompt = registry
            .render(
                COMPLEXITY_ASSESSMENT,
                &json!({ "company": "Shell", "claim": "Net zero by 2050" }),
            )
            .unwrap();
        assert!(prompt.contains("Claim: Net zero by 2050"));
        assert!(prompt.contains("Company: Shell"));
    }

    #[test]
    fn test_render_debate_prompt() {
        let registry = PromptRegistry::new();
        register_prompts(&registry).unwrap();

        let prompt = registry
            .render(
                DEBATE_ARGUMENT,
                &json!({
                    "agent": "risk_scoring",
                    "company": "BP",
                    "industry": "Energy",
                    "claim": "Net zero by 2050",
                    "verdict": "HIGH",
                    "confidence": "80%",
                    "reasoning": "Risk score: 72",
                    "opposing": "- sentiment_analysis: LOW risk (70% confidence)",
                    "round": 2,
                    "rounds": 3,
                    "previous": "No previous arguments",
                }),
            )
            .unwrap();
        assert!(prompt.starts_with("You are the risk_scoring"));
        assert!(prompt.contains("Round 2/3"));
        assert!(prompt.contains("Defend your HIGH risk verdict"));
    }
}
