//! Peer comparison and leadership-claim checks
//!
//! Asks the fast LLM for the company's direct competitors, looks up public ESG
//! information for each and flags superlative claims ("industry-leading",
//! "first") that the peer data cannot confirm.

use crate::json::{parse_json_reply, scalar_string};
use crate::{AgentContext, names, prompts};
use async_trait::async_trait;
use esg_core::text::truncate_chars;
use esg_core::{Agent, AgentOutput, EsgState, Result};
use esg_sources::SearchRequest;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

const MAX_PEERS: usize = 5;
const RESULTS_PER_PEER: usize = 5;
const MIN_CONTENT_CHARS: usize = 50;

/// Peers with data needed before a leadership claim counts as unconfirmed
const PEERS_FOR_COMPARISON: usize = 2;

const SUPERLATIVES: &[&str] = &[
    "industry-leading",
    "best-in-class",
    "first",
    "only",
    "leading",
    "top",
    "most",
    "largest",
    "biggest",
    "strongest",
];

/// ESG figures the LLM pulled out of search snippets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerEsgData {
    #[serde(default, deserialize_with = "scalar_string")]
    pub esg_score: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub carbon_neutral_target: Option<String>,
    #[serde(default)]
    pub sustainability_certifications: Vec<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub recent_violations: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerProfile {
    pub name: String,
    pub data_available: bool,
    pub results_found: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esg_data: Option<PeerEsgData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuperlativeStatus {
    /// Peer data exists and does not establish the claimed lead
    Unverified,
    /// Too little peer data to compare against
    InsufficientPeerData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuperlativeCheck {
    pub term: String,
    pub status: SuperlativeStatus,
    pub peers_with_data: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryPosition {
    /// Unknown, Claims Leadership or Average
    pub position: String,
    pub score: u32,
    pub rationale: String,
}

impl IndustryPosition {
    fn unknown(rationale: impl Into<String>) -> Self {
        Self {
            position: "Unknown".to_string(),
            score: 0,
            rationale: rationale.into(),
        }
    }
}

/// Payload of the peer comparison agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerReport {
    pub company: String,
    pub peers: Vec<PeerProfile>,
    pub superlative_checks: Vec<SuperlativeCheck>,
    pub industry_position: IndustryPosition,
}

impl PeerReport {
    pub fn peers_with_data(&self) -> usize {
        self.peers.iter().filter(|p| p.data_available).count()
    }

    /// Leadership claims the peer data leaves unconfirmed
    pub fn unverified_superlatives(&self) -> usize {
        self.superlative_checks
            .iter()
            .filter(|c| c.status == SuperlativeStatus::Unverified)
            .count()
    }
}

/// Competitor names from a comma-separated LLM reply
pub fn parse_peers(reply: &str, company: &str) -> Vec<String> {
    let line = reply
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    let line = line
        .strip_prefix("Competitors:")
        .unwrap_or(line);

    line.split(',')
        .map(|name| name.trim().trim_matches(|c: char| c == '.' || c == '-' || c == '*').trim())
        .filter(|name| (3..50).contains(&name.chars().count()))
        .filter(|name| !name.eq_ignore_ascii_case(company))
        .take(MAX_PEERS)
        .map(str::to_string)
        .collect()
}

/// Superlative terms used in the claim
pub fn find_superlatives(claim: &str) -> Vec<String> {
    let lower = claim.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|w| !w.is_empty())
        .collect();

    SUPERLATIVES
        .iter()
        .filter(|term| words.contains(term))
        .map(|term| (*term).to_string())
        .collect()
}

/// Compares the company against its direct competitors
pub struct PeerComparisonAgent {
    ctx: AgentContext,
}

impl PeerComparisonAgent {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    async fn identify_peers(&self, company: &str) -> Result<Vec<String>> {
        let prompt = self
            .ctx
            .render(prompts::PEER_IDENTIFICATION, &json!({ "company": company }))?;
        let reply = self.ctx.fast().complete(&prompt).await?;
        Ok(parse_peers(&reply, company))
    }

    async fn profile(&self, peer: String) -> PeerProfile {
        let queries = [
            format!("\"{peer}\" ESG rating MSCI Sustainalytics 2024 2025"),
            format!("\"{peer}\" sustainability score CDP rating"),
            format!("\"{peer}\" environmental social governance performance"),
            format!("{peer} carbon emissions reduction target climate"),
        ];

        let mut results = Vec::new();
        for query in queries {
            if results.len() >= RESULTS_PER_PEER {
                break;
            }
            results.extend(self.ctx.sources().fetch_all(&SearchRequest::new(query, 2)).await);
        }

        let content = results
            .iter()
            .take(RESULTS_PER_PEER)
            .map(|a| {
                let text = if a.snippet.trim().is_empty() { &a.title } else { &a.snippet };
                truncate_chars(text, 200).to_string()
            })
            .collect::<Vec<_>>()
            .join("\n");

        if content.chars().count() < MIN_CONTENT_CHARS {
            debug!("Not enough public ESG data for {peer}");
            return PeerProfile {
                name: peer,
                data_available: false,
                results_found: results.len(),
                esg_data: None,
            };
        }

        let esg_data = match self.extract(&peer, &content).await {
            Ok(data) => data,
            Err(e) => {
                debug!("ESG extraction for {peer} failed: {e}");
                PeerEsgData {
                    esg_score: Some("data_found_parsing_failed".to_string()),
                    ..PeerEsgData::default()
                }
            }
        };

        PeerProfile {
            name: peer,
            data_available: true,
            results_found: results.len(),
            esg_data: Some(esg_data),
        }
    }

    async fn extract(&self, peer: &str, content: &str) -> Result<PeerEsgData> {
        let prompt = self.ctx.render(
            prompts::PEER_ESG_EXTRACTION,
            &json!({ "peer": peer, "content": content }),
        )?;
        let reply = self.ctx.fast().complete(&prompt).await?;
        Ok(parse_json_reply(&reply)?)
    }
}

fn industry_position(peers: &[PeerProfile], superlatives: &[String]) -> IndustryPosition {
    if peers.is_empty() {
        return IndustryPosition::unknown("No competitors identified");
    }

    let with_data = peers.iter().filter(|p| p.data_available).count();
    if superlatives.is_empty() {
        IndustryPosition {
            position: "Average".to_string(),
            score: 50,
            rationale: format!(
                "No leadership claim made; {with_data} of {} peers have public ESG data",
                peers.len()
            ),
        }
    } else {
        IndustryPosition {
            position: "Claims Leadership".to_string(),
            score: 40,
            rationale: format!(
                "Claim uses {} without comparative evidence against {} peers",
                superlatives.join(", "),
                peers.len()
            ),
        }
    }
}

#[async_trait]
impl Agent for PeerComparisonAgent {
    fn name(&self) -> &str {
        names::PEER_COMPARISON
    }

    #[tracing::instrument(skip_all, fields(company = %state.company))]
    async fn run(&self, state: &mut EsgState) -> Result<AgentOutput> {
        let peer_names = match self.identify_peers(&state.company).await {
            Ok(peers) => peers,
            Err(e) => {
                warn!("Peer identification failed: {e}");
                Vec::new()
            }
        };

        if peer_names.is_empty() {
            info!("No peers identified for {}", state.company);
            let report = PeerReport {
                company: state.company.clone(),
                peers: Vec::new(),
                superlative_checks: Vec::new(),
                industry_position: IndustryPosition::unknown("No competitors identified"),
            };
            return Ok(AgentOutput::success(names::PEER_COMPARISON, serde_json::to_value(&report)?, 0.75));
        }

        info!("Comparing against peers: {}", peer_names.join(", "));
        let peers = join_all(peer_names.into_iter().map(|p| self.profile(p))).await;
        let with_data = peers.iter().filter(|p| p.data_available).count();

        let superlatives = find_superlatives(&state.claim);
        let superlative_checks = superlatives
            .iter()
            .map(|term| SuperlativeCheck {
                term: term.clone(),
                status: if with_data >= PEERS_FOR_COMPARISON {
                    SuperlativeStatus::Unverified
                } else {
                    SuperlativeStatus::InsufficientPeerData
                },
                peers_with_data: with_data,
            })
            .collect();

        let report = PeerReport {
            company: state.company.clone(),
            industry_position: industry_position(&peers, &superlatives),
            peers,
            superlative_checks,
        };
        Ok(AgentOutput::success(names::PEER_COMPARISON, serde_json::to_value(&report)?, 0.75).live())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, raw};
    use esg_llm::testing::ScriptedProvider;

    fn coverage() -> Vec<esg_sources::RawArticle> {
        vec![
            raw(
                "Peer ESG rating",
                "MSCI rates the company BBB with a 2050 net zero target and ISO 14001 sites",
                "https://example.com/rating",
                Some("2025-01-01"),
            ),
            raw(
                "Peer CDP score",
                "CDP awarded a B score for climate disclosure in the latest cycle",
                "https://example.com/cdp",
                Some("2024-11-01"),
            ),
        ]
    }

    #[test]
    fn test_parse_peers() {
        assert_eq!(
            parse_peers("Competitors: Shell, Chevron, ExxonMobil, BP, X", "BP"),
            vec!["Shell", "Chevron", "ExxonMobil"]
        );
        assert_eq!(parse_peers("", "BP"), Vec::<String>::new());
    }

    #[test]
    fn test_find_superlatives() {
        assert_eq!(
            find_superlatives("The industry-leading and largest solar fleet"),
            vec!["industry-leading", "largest"]
        );
        assert!(find_superlatives("We mostly recycle").is_empty());
    }

    #[tokio::test]
    async fn test_leadership_claim_unverified_with_peer_data() {
        let provider = ScriptedProvider::new()
            .when("direct competitors", "Shell, Chevron")
            .when("Extract ESG data", r#"{"esg_score": 41, "carbon_neutral_target": "2050", "sustainability_certifications": [], "recent_violations": "unknown"}"#);
        let agent = PeerComparisonAgent::new(context(provider, coverage()));
        let mut state = EsgState::new("BP", "BP is the industry-leading renewable investor", "Energy");

        let output = agent.run(&mut state).await.unwrap();
        let report: PeerReport = serde_json::from_value(output.output).unwrap();

        assert_eq!(report.peers.len(), 2);
        assert_eq!(report.peers_with_data(), 2);
        assert_eq!(
            report.peers[0].esg_data.as_ref().and_then(|d| d.esg_score.clone()),
            Some("41".to_string())
        );
        assert_eq!(report.unverified_superlatives(), 1);
        assert_eq!(report.industry_position.position, "Claims Leadership");
        assert_eq!(report.industry_position.score, 40);
    }

    #[tokio::test]
    async fn test_unparseable_extraction_is_marked() {
        let provider = ScriptedProvider::new()
            .when("direct competitors", "Shell")
            .default_reply("no idea");
        let agent = PeerComparisonAgent::new(context(provider, coverage()));
        let mut state = EsgState::new("BP", "BP invests in wind", "Energy");

        let output = agent.run(&mut state).await.unwrap();
        let report: PeerReport = serde_json::from_value(output.output).unwrap();

        let data = report.peers[0].esg_data.clone().unwrap();
        assert_eq!(data.esg_score.as_deref(), Some("data_found_parsing_failed"));
        assert_eq!(report.industry_position.position, "Average");
        assert!(report.superlative_checks.is_empty());
    }

    #[tokio::test]
    async fn test_no_peers_is_unknown() {
        let agent = PeerComparisonAgent::new(context(ScriptedProvider::new().failing(), coverage()));
        let mut state = EsgState::new("BP", "BP is the first to act", "Energy");

        let output = agent.run(&mut state).await.unwrap();
        let report: PeerReport = serde_json::from_value(output.output).unwrap();

        assert!(report.peers.is_empty());
        assert_eq!(report.industry_position.position, "Unknown");
        assert_eq!(report.unverified_superlatives(), 0);
    }

    #[tokio::test]
    async fn test_thin_coverage_skips_extraction() {
        let provider = ScriptedProvider::new().when("direct competitors", "Shell");
        let thin = vec![raw("Shell", "short", "https://example.com/s", None)];
        let agent = PeerComparisonAgent::new(context(provider.clone(), thin));
        let mut state = EsgState::new("BP", "BP is the top investor", "Energy");

        let output = agent.run(&mut state).await.unwrap();
        let report: PeerReport = serde_json::from_value(output.output).unwrap();

        assert!(!report.peers[0].data_available);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(
            report.superlative_checks[0].status,
            SuperlativeStatus::InsufficientPeerData
        );
    }
}
