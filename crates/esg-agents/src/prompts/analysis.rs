//! Agent prompt templates

use super::{
    CLAIM_EXTRACTION, CONTRADICTION_ANALYSIS, EVIDENCE_RELATIONSHIP, INDUSTRY_CLASSIFICATION,
    PEER_ESG_EXTRACTION, PEER_IDENTIFICATION, SENTIMENT_ANALYSIS,
};
use esg_prompt::{JinjaTemplate, Result};

/// Structured claim extraction from live articles or the claim itself
pub fn claim_extraction() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        CLAIM_EXTRACTION,
        r#"ROLE: ESG Claim Extraction Specialist
GOAL: Extract structured, verifiable ESG claims from unstructured input.

You parse sustainability reports, press releases and corporate communications,
and identify specific, measurable claims that can be independently verified.

Return claims in exactly this structure:

{
  "company": "<company name>",
  "claims": [
    {
      "claim_id": 1,
      "claim_text": "<exact quote or close paraphrase>",
      "category": "<Environmental|Social|Governance>",
      "subcategory": "<e.g. Carbon emissions, Labor practices, Board diversity>",
      "metric": "<number or commitment, if stated>",
      "timeline": "<year, quarter, 'by 2030', ...>",
      "claim_type": "<Achievement|Target|Policy|Certification>",
      "specificity_score": <0-10, 10 = specific with metrics>
    }
  ]
}

Rules:
1. Split compound claims into individually verifiable statements.
2. Flag vague language ("eco-friendly", "sustainable", "green") used without metrics.
3. Extract implicit claims ("carbon neutral" implies zero net emissions).
4. Separate past achievements from future targets.

COMPANY: {{ company }}

CONTENT TO ANALYZE:
{{ content | clip(4000) }}

Return ONLY valid JSON in the format above. No markdown, no explanations."#,
    )
}

/// One-word relationship between a claim and an evidence snippet
pub fn evidence_relationship() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        EVIDENCE_RELATIONSHIP,
        r"ROLE: Evidence Cross-Verification Specialist
GOAL: Decide whether the evidence supports, contradicts, or is neutral to the claim.

CLAIM: {{ claim | clip(200) }}
EVIDENCE: {{ evidence | clip(500) }}

Answer with ONE word: Supports, Contradicts, Neutral, or Partial",
    )
}

/// Forensic comparison of a claim against grouped evidence
pub fn contradiction_analysis() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        CONTRADICTION_ANALYSIS,
        r#"ROLE: ESG Claim Verification & Contradiction Detection Expert
GOAL: Compare what the company claims with what independent sources report.

CLAIM: {{ claim }}

EVIDENCE:
{{ evidence }}

Analyse:
1. Factual verification: does the evidence confirm the claim?
2. Contradictions: what does not match?
3. Timing: are dates or deadlines inconsistent?
4. Omissions: what context is missing?

Return JSON:
{
  "claim_id": {{ claim_id }},
  "overall_verdict": "<Verified|Contradicted|Partially True|Unverifiable>",
  "verification_confidence": <0-100>,
  "specific_contradictions": [
    {
      "aspect": "<what contradicts>",
      "claim_states": "<company says>",
      "evidence_shows": "<sources reveal>",
      "severity": "<Minor|Moderate|Major>"
    }
  ],
  "supportive_evidence": ["<what confirms>"],
  "key_issues": ["<main problems found>"]
}"#,
    )
}

/// Comma-separated list of direct competitors
pub fn peer_identification() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        PEER_IDENTIFICATION,
        r"List 5 main direct competitors of {{ company }} in the same industry.

Examples:
- Tesla: Ford, GM, Volkswagen, Toyota, BYD
- BP: Shell, Chevron, ExxonMobil, TotalEnergies, ConocoPhillips
- Nike: Adidas, Puma, Under Armour, Lululemon, Reebok
- Coca-Cola: PepsiCo, Nestle, Unilever, Danone, Keurig Dr Pepper
- Microsoft: Google, Apple, Amazon, Meta, IBM

Return ONLY company names separated by commas, no other text.
Company: {{ company }}
Competitors:",
    )
}

/// ESG figures for a peer, extracted from search snippets
pub fn peer_esg_extraction() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        PEER_ESG_EXTRACTION,
        r#"Extract ESG data for {{ peer }} from this text:

{{ content | clip(800) }}

Return ONLY valid JSON (no markdown, no explanation):
{
  "esg_score": 45,
  "carbon_neutral_target": "2050",
  "sustainability_certifications": ["B Corp"],
  "recent_violations": "yes"
}

If a value is not found, use "unknown" for strings or null for numbers.
JSON:"#,
    )
}

/// Linguistic greenwashing markers in a claim
pub fn sentiment_analysis() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        SENTIMENT_ANALYSIS,
        r#"ROLE: ESG Communication Sentiment & Linguistic Analysis Expert
GOAL: Detect greenwashing through sentiment and linguistic patterns.

TEXT: {{ text }}

Detect:
1. Sentiment polarity (-1.0 to +1.0)
2. Subjectivity (0.0 to 1.0)
3. Buzzword count (sustainable, green, eco, planet, ...)
4. Vague quantifiers (significant, substantial, considerable)
5. Hedge words (might, could, potentially)

Return JSON:
{
  "polarity_score": <-1.0 to 1.0>,
  "subjectivity_score": <0.0 to 1.0>,
  "buzzword_count": <number>,
  "vague_terms": ["..."],
  "hedge_words": ["..."],
  "specificity_deficit": <true|false>
}"#,
    )
}

/// Industry key for the risk baselines
pub fn industry_classification() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        INDUSTRY_CLASSIFICATION,
        r"Classify {{ company }} into ONE of these industries:

{{ industries | join(', ') }}

Return ONLY the industry name from the list above, nothing else.

Examples:
- BP: oil_and_gas
- Tesla: automotive
- Microsoft: technology
- H&M: fast_fashion
- Coca-Cola: food_beverage

Company: {{ company }}
Industry:",
    )
}
