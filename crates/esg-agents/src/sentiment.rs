//! Linguistic greenwashing markers
//!
//! Scores the claim and the gathered evidence with a small polarity lexicon,
//! measures how far the company's tone diverges from what sources say, and
//! flags common greenwashing phrasings. The fast LLM adds a free-form reading
//! that is kept alongside the deterministic scores.

use crate::claim_extraction::{ExtractedClaims, primary_claim};
use crate::json::parse_json_reply;
use crate::{AgentContext, names, prompts};
use async_trait::async_trait;
use esg_core::text::truncate_chars;
use esg_core::{Agent, AgentOutput, EsgState, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

const BUZZWORDS: &[&str] = &[
    "sustainable",
    "green",
    "eco-friendly",
    "carbon neutral",
    "net zero",
    "climate positive",
    "100% renewable",
    "zero waste",
    "planet-friendly",
    "environmentally friendly",
    "clean energy",
    "carbon negative",
];

const VAGUE_QUANTIFIERS: &[&str] = &[
    "significant",
    "substantial",
    "considerable",
    "major",
    "leading",
    "groundbreaking",
    "revolutionary",
    "world-class",
    "best-in-class",
];

const HEDGE_WORDS: &[&str] = &[
    "might",
    "could",
    "may",
    "possibly",
    "potentially",
    "approximately",
    "around",
    "roughly",
    "about",
    "nearly",
    "almost",
    "up to",
];

const FUTURE_WORDS: &[&str] = &["will", "plans to", "aims to", "targets", "committed to", "by 20"];
const ABSOLUTES: &[&str] = &["100%", "completely", "entirely", "always", "never", "zero", "all"];
const PASSIVE_PHRASES: &[&str] = &["is achieved", "was reduced", "has been", "were implemented"];
const QUALIFIERS: &[&str] = &["leading", "revolutionary", "groundbreaking", "world-class", "best"];

const NEGATIONS: &[&str] = &["not", "no", "never", "without"];

/// Word, polarity, subjectivity
const LEXICON: &[(&str, f64, f64)] = &[
    ("amazing", 0.6, 0.9),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("clean", 0.37, 0.69),
    ("excellent", 1.0, 1.0),
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("groundbreaking", 0.6, 0.9),
    ("innovative", 0.5, 0.9),
    ("leading", 0.4, 0.6),
    ("positive", 0.23, 0.55),
    ("proud", 0.8, 1.0),
    ("revolutionary", 0.5, 0.8),
    ("significant", 0.38, 0.88),
    ("strong", 0.43, 0.73),
    ("substantial", 0.2, 0.5),
    ("successful", 0.75, 0.95),
    ("accused", -0.3, 0.5),
    ("bad", -0.7, 0.67),
    ("controversial", -0.3, 0.7),
    ("dirty", -0.6, 0.8),
    ("failed", -0.5, 0.3),
    ("false", -0.4, 0.6),
    ("fined", -0.3, 0.4),
    ("greenwashing", -0.5, 0.7),
    ("harmful", -0.6, 0.7),
    ("illegal", -0.5, 0.5),
    ("misleading", -0.5, 0.8),
    ("overstated", -0.4, 0.6),
    ("polluting", -0.5, 0.6),
    ("poor", -0.4, 0.6),
    ("risky", -0.3, 0.7),
    ("scandal", -0.6, 0.7),
    ("toxic", -0.5, 0.6),
    ("violation", -0.4, 0.5),
    ("weak", -0.375, 0.625),
    ("worst", -1.0, 1.0),
];

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn found<'a>(text: &str, terms: &[&'a str]) -> Vec<&'a str> {
    terms.iter().copied().filter(|t| text.contains(t)).collect()
}

/// Lexicon polarity in [-1, 1] and subjectivity in [0, 1]
///
/// Scores of matched words are averaged; a preceding negation flips and
/// halves a word's polarity.
pub fn polarity_subjectivity(text: &str) -> (f64, f64) {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|w| !w.is_empty())
        .collect();

    let mut polarity = 0.0;
    let mut subjectivity = 0.0;
    let mut matched = 0_u32;
    for (i, word) in words.iter().enumerate() {
        let Some((_, p, s)) = LEXICON.iter().find(|(w, _, _)| w == word) else {
            continue;
        };
        let negated = i > 0 && NEGATIONS.contains(&words[i - 1]);
        polarity += if negated { -0.5 * p } else { *p };
        subjectivity += s;
        matched += 1;
    }

    if matched == 0 {
        return (0.0, 0.0);
    }
    let n = f64::from(matched);
    (round3((polarity / n).clamp(-1.0, 1.0)), round3((subjectivity / n).clamp(0.0, 1.0)))
}

/// Tone and vocabulary of one body of text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSentiment {
    pub polarity_score: f64,
    pub subjectivity_score: f64,
    pub buzzword_count: usize,
    pub vague_terms: Vec<String>,
    pub hedge_words: Vec<String>,
    /// Many buzzwords and vague quantifiers together
    pub specificity_deficit: bool,
}

impl TextSentiment {
    pub fn analyze(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }
        let lower = text.to_lowercase();
        let (polarity_score, subjectivity_score) = polarity_subjectivity(text);
        let buzzword_count = found(&lower, BUZZWORDS).len();
        let vague_terms: Vec<String> = found(&lower, VAGUE_QUANTIFIERS)
            .into_iter()
            .map(str::to_string)
            .collect();

        Self {
            polarity_score,
            subjectivity_score,
            buzzword_count,
            specificity_deficit: buzzword_count > 3 && vague_terms.len() > 2,
            vague_terms,
            hedge_words: found(&lower, HEDGE_WORDS).into_iter().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagSeverity {
    High,
    Moderate,
    Low,
}

impl FlagSeverity {
    fn weight(self) -> u32 {
        match self {
            Self::High => 12,
            Self::Moderate => 7,
            Self::Low => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinguisticFlag {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: FlagSeverity,
    pub description: String,
}

impl LinguisticFlag {
    fn new(kind: &str, severity: FlagSeverity, description: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            severity,
            description: description.into(),
        }
    }
}

/// Specificity on 0-10 from numbers, years, units and certifications
pub fn estimate_specificity(claim: &str) -> f64 {
    let lower = claim.to_lowercase();
    let mut score = 0.0;
    if lower.chars().any(|c| c.is_ascii_digit()) {
        score += 3.0;
    }
    if lower
        .split(|c: char| !c.is_ascii_digit())
        .any(|n| n.len() == 4 && n.starts_with("20"))
    {
        score += 2.0;
    }
    if ["%", "tonnes", "tons", "mwh", "gw", "co2", "kg"]
        .iter()
        .any(|u| lower.contains(u))
    {
        score += 2.0;
    }
    if ["iso", "b corp", "b-corp", "sbti", "certified", "verified"]
        .iter()
        .any(|c| lower.contains(c))
    {
        score += 3.0;
    }
    f64::min(score, 10.0)
}

/// Greenwashing phrasings in the claim
pub fn detect_flags(claim: &str, specificity: f64, claim_type: &str) -> Vec<LinguisticFlag> {
    let lower = claim.to_lowercase();
    let mut flags = Vec::new();

    let buzzwords = found(&lower, BUZZWORDS).len();
    if buzzwords >= 2 && specificity < 6.0 {
        flags.push(LinguisticFlag::new(
            "Vague Buzzwords",
            FlagSeverity::High,
            format!("{buzzwords} buzzwords without specific metrics"),
        ));
    }

    if found(&lower, FUTURE_WORDS).len() >= 2 && claim_type == "Target" {
        flags.push(LinguisticFlag::new(
            "Future Promise Heavy",
            FlagSeverity::Moderate,
            "Focus on future targets rather than current achievements",
        ));
    }

    if !found(&lower, ABSOLUTES).is_empty() && specificity < 8.0 {
        flags.push(LinguisticFlag::new(
            "Absolute Claims",
            FlagSeverity::High,
            "Absolute statements without sufficient detail",
        ));
    }

    if !found(&lower, PASSIVE_PHRASES).is_empty() {
        flags.push(LinguisticFlag::new(
            "Passive Voice",
            FlagSeverity::Low,
            "Passive construction may obscure responsibility",
        ));
    }

    let qualifiers = found(&lower, QUALIFIERS).len();
    if qualifiers >= 2 {
        flags.push(LinguisticFlag::new(
            "Excessive Qualifiers",
            FlagSeverity::Moderate,
            format!("{qualifiers} promotional qualifiers detected"),
        ));
    }

    flags
}

/// Linguistic risk on 0-100
pub fn linguistic_risk(claim: &TextSentiment, divergence: f64, flags: &[LinguisticFlag]) -> u32 {
    let mut risk = ((divergence * 30.0) as u32).min(30);
    risk += (claim.buzzword_count as u32 * 5).min(20);
    risk += (claim.vague_terms.len() as u32 * 5).min(15);
    risk += flags.iter().map(|f| f.severity.weight()).sum::<u32>().min(35);
    if claim.subjectivity_score > 0.7 {
        risk += 10;
    }
    risk.min(100)
}

/// Payload of the sentiment agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub claim_id: u32,
    pub claim_sentiment: TextSentiment,
    pub evidence_sentiment: TextSentiment,
    pub specificity_score: f64,
    pub sentiment_divergence: f64,
    /// `min(100, divergence * 100)`
    pub divergence_score: u32,
    pub greenwashing_flags: Vec<LinguisticFlag>,
    pub llm_linguistic_analysis: Value,
    pub overall_linguistic_risk: u32,
}

/// Analyses the language of the claim against the evidence
pub struct SentimentAgent {
    ctx: AgentContext,
}

impl SentimentAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    async fn llm_analysis(&self, claim: &str) -> Value {
        let reply = match self
            .ctx
            .render(prompts::SENTIMENT_ANALYSIS, &json!({ "text": claim }))
        {
            Ok(prompt) => self
                .ctx
                .fast()
                .complete(&prompt)
                .await
                .map_err(esg_core::Error::from),
            Err(e) => Err(e),
        };

        match reply {
            Ok(reply) => parse_json_reply::<Value>(&reply).unwrap_or_else(|_| {
                json!({ "raw_analysis": truncate_chars(&reply, 300), "parsed": false })
            }),
            Err(e) => {
                warn!("LLM linguistic analysis failed: {e}");
                json!({ "analysis_failed": true })
            }
        }
    }
}

#[async_trait]
impl Agent for SentimentAgent {
    fn name(&self) -> &str {
        names::SENTIMENT_ANALYSIS
    }

    #[tracing::instrument(skip_all, fields(company = %state.company))]
    async fn run(&self, state: &mut EsgState) -> Result<AgentOutput> {
        let claim = primary_claim(state);
        let extracted = crate::report::<ExtractedClaims>(state, names::CLAIM_EXTRACTION)
            .is_some_and(|r| !r.claims.is_empty());
        let specificity_score = if extracted {
            claim.specificity_score
        } else {
            estimate_specificity(&claim.claim_text)
        };

        let claim_sentiment = TextSentiment::analyze(&claim.claim_text);
        let evidence_text = state
            .evidence
            .iter()
            .take(10)
            .map(|e| e.snippet.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let evidence_sentiment = TextSentiment::analyze(&evidence_text);

        let divergence = round3((claim_sentiment.polarity_score - evidence_sentiment.polarity_score).abs());
        let flags = detect_flags(&claim.claim_text, specificity_score, &claim.claim_type);
        let llm_linguistic_analysis = self.llm_analysis(&claim.claim_text).await;
        let risk = linguistic_risk(&claim_sentiment, divergence, &flags);

        info!(
            "Divergence {divergence:.3}, {} flags, linguistic risk {risk}/100",
            flags.len()
        );

        let report = SentimentReport {
            claim_id: claim.claim_id,
            claim_sentiment,
            evidence_sentiment,
            specificity_score,
            sentiment_divergence: divergence,
            divergence_score: ((divergence * 100.0) as u32).min(100),
            greenwashing_flags: flags,
            llm_linguistic_analysis,
            overall_linguistic_risk: risk,
        };
        Ok(AgentOutput::success(names::SENTIMENT_ANALYSIS, serde_json::to_value(&report)?, 0.7))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, evidence};
    use esg_core::{Relationship, SourceType};
    use esg_llm::testing::ScriptedProvider;

    const HM_CLAIM: &str =
        "H&M is committed to 100% sustainable fashion and eco-friendly materials across all collections";

    #[test]
    fn test_flags_for_absolute_buzzword_claim() {
        let specificity = estimate_specificity(HM_CLAIM);
        assert!((specificity - 5.0).abs() < f64::EPSILON);

        let flags = detect_flags(HM_CLAIM, specificity, "Achievement");
        let kinds: Vec<&str> = flags.iter().map(|f| f.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Vague Buzzwords", "Absolute Claims"]);
    }

    #[test]
    fn test_future_and_qualifier_flags() {
        let claim = "We will lead and plans to be the leading, best partner by 2030";
        let flags = detect_flags(claim, 9.0, "Target");
        let kinds: Vec<&str> = flags.iter().map(|f| f.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Future Promise Heavy", "Excessive Qualifiers"]);
    }

    #[test]
    fn test_polarity_with_negation() {
        let (p, s) = polarity_subjectivity("a good plan");
        assert!((p - 0.7).abs() < 1e-9);
        assert!((s - 0.6).abs() < 1e-9);
        let (p, _) = polarity_subjectivity("not good");
        assert!((p + 0.35).abs() < 1e-9);
        assert_eq!(polarity_subjectivity("quarterly filing"), (0.0, 0.0));
    }

    #[tokio::test]
    async fn test_hm_claim_risk() {
        let provider = ScriptedProvider::new().default_reply(r#"{"polarity_score": 0.6, "buzzword_count": 2}"#);
        let agent = SentimentAgent::new(context(provider, Vec::new()));
        let mut state = EsgState::new("H&M", HM_CLAIM, "Consumer Goods");

        let output = agent.run(&mut state).await.unwrap();
        let report: SentimentReport = serde_json::from_value(output.output).unwrap();

        assert_eq!(report.claim_sentiment.buzzword_count, 2);
        assert_eq!(report.greenwashing_flags.len(), 2);
        assert_eq!(report.overall_linguistic_risk, 34);
        assert_eq!(report.llm_linguistic_analysis["buzzword_count"], 2);
    }

    #[tokio::test]
    async fn test_divergence_against_critical_evidence() {
        let provider = ScriptedProvider::new().default_reply("The claim sounds upbeat.");
        let agent = SentimentAgent::new(context(provider, Vec::new()));
        let mut state = EsgState::new("BP", "BP delivers excellent clean energy", "Energy");
        state.evidence.push(evidence(
            1,
            SourceType::Ngo,
            Relationship::Contradicts,
            "Regulators said the disclosures were misleading and harmful",
        ));

        let output = agent.run(&mut state).await.unwrap();
        let report: SentimentReport = serde_json::from_value(output.output).unwrap();

        assert!(report.sentiment_divergence > 1.0);
        assert_eq!(report.divergence_score, 100);
        assert_eq!(report.llm_linguistic_analysis["parsed"], false);
    }

    #[tokio::test]
    async fn test_llm_failure_is_recorded() {
        let agent = SentimentAgent::new(context(ScriptedProvider::new().failing(), Vec::new()));
        let mut state = EsgState::new("BP", "Net zero by 2050", "Energy");

        let output = agent.run(&mut state).await.unwrap();
        assert_eq!(output.output["llm_linguistic_analysis"]["analysis_failed"], true);
    }
}
