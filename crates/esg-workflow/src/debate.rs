//! Multi-agent debate for conflicting findings
//!
//! Each analysing agent's record is read as a position (a risk level with a
//! confidence). When positions disagree, every agent argues its case for a
//! fixed number of rounds and the outcome is settled by a confidence-weighted
//! vote.

use crate::names;
use crate::prompts::DEBATE_ARGUMENT;
use crate::workflow::Stage;
use async_trait::async_trait;
use esg_agents::AgentContext;
use esg_agents::names::{CONTRADICTION_ANALYSIS, RISK_SCORING};
use esg_core::text::truncate_chars;
use esg_core::{AgentOutput, EsgState, Result, RiskLevel};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Debate rounds run once a conflict is found
pub const DEBATE_ROUNDS: usize = 3;

/// Arguments from earlier rounds shown to each speaker
const CONTEXT_ARGUMENTS: usize = 3;

const HIGH_MARKERS: &[&str] = &["high risk", "severe", "critical", "major concern"];
const LOW_MARKERS: &[&str] = &["low risk", "minimal", "acceptable", "verified"];

/// One agent's stance going into the debate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub agent: String,
    pub verdict: RiskLevel,
    pub confidence: f64,
    pub reasoning: String,
}

/// An argument made during a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub round: usize,
    pub agent: String,
    pub position: RiskLevel,
    pub argument: String,
}

/// Outcome of the weighted vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub verdict: RiskLevel,
    pub confidence: f64,
    /// Weighted votes per level
    pub vote_distribution: BTreeMap<String, usize>,
    /// Share of votes won by the verdict
    pub consensus_strength: f64,
    /// Agents whose position differs from the verdict
    pub dissenting_agents: Vec<String>,
    pub conflict_ratio: f64,
    pub total_agents: usize,
}

/// Level implied by risk wording in an agent's payload
pub fn infer_verdict(output: &Value) -> RiskLevel {
    let text = output.to_string().to_lowercase();
    if HIGH_MARKERS.iter().any(|m| text.contains(m)) {
        RiskLevel::High
    } else if LOW_MARKERS.iter().any(|m| text.contains(m)) {
        RiskLevel::Low
    } else {
        RiskLevel::Moderate
    }
}

fn position_of(output: &AgentOutput) -> Position {
    let (verdict, reasoning) = match output.agent.as_str() {
        RISK_SCORING => {
            let score = output
                .field("greenwashing_risk_score")
                .map_or_else(|| "N/A".to_string(), ToString::to_string);
            (
                output.risk_level.unwrap_or(RiskLevel::Moderate),
                format!("Risk score: {score}"),
            )
        }
        CONTRADICTION_ANALYSIS => {
            let count = output
                .detail("contradictions_count")
                .and_then(Value::as_u64)
                .unwrap_or_default();
            let verdict = match count {
                0 => RiskLevel::Low,
                1 | 2 => RiskLevel::Moderate,
                _ => RiskLevel::High,
            };
            (verdict, format!("{count} contradiction(s) found"))
        }
        _ => (
            infer_verdict(&output.output),
            truncate_chars(&output.output.to_string(), 200).to_string(),
        ),
    };

    Position {
        agent: output.agent.clone(),
        verdict,
        confidence: output.confidence,
        reasoning,
    }
}

/// One position per analysing agent, from its latest successful record
///
/// Routing, debate and report records are not positions.
pub fn extract_positions(state: &EsgState) -> Vec<Position> {
    let mut positions: Vec<Position> = Vec::new();

    for output in &state.agent_outputs {
        if !output.is_success()
            || matches!(
                output.agent.as_str(),
                names::SUPERVISOR
                    | names::REPORT_GENERATION
                    | names::DEBATE_ORCHESTRATOR
                    | names::CONFIDENCE_MONITOR
            )
        {
            continue;
        }

        let position = position_of(output);
        match positions.iter_mut().find(|p| p.agent == position.agent) {
            Some(existing) => *existing = position,
            None => positions.push(position),
        }
    }
    positions
}

/// Whether at least two positions exist and they disagree
pub fn has_conflict(positions: &[Position]) -> bool {
    positions.len() >= 2
        && positions
            .iter()
            .any(|p| p.verdict != positions[0].verdict)
}

/// Settle the debate by confidence-weighted vote
///
/// Each position casts `floor(confidence * 10)` votes. Ties go to the level
/// that received votes first. Every argument made adds a point of confidence,
/// up to ten, and strong dissent takes some back.
pub fn resolve_by_voting(positions: &[Position], argument_count: usize) -> Resolution {
    let mut tally: Vec<(RiskLevel, usize)> = Vec::new();
    for position in positions {
        let weight = (position.confidence * 10.0).floor().max(0.0) as usize;
        if weight == 0 {
            continue;
        }
        match tally.iter_mut().find(|(level, _)| *level == position.verdict) {
            Some((_, votes)) => *votes += weight,
            None => tally.push((position.verdict, weight)),
        }
    }

    let total_votes: usize = tally.iter().map(|(_, votes)| votes).sum();
    let Some(&(winner, winning_votes)) = tally
        .iter()
        .fold(None, |best: Option<&(RiskLevel, usize)>, entry| match best {
            Some(b) if b.1 >= entry.1 => Some(b),
            _ => Some(entry),
        })
    else {
        return Resolution {
            verdict: RiskLevel::Moderate,
            confidence: 0.5,
            vote_distribution: BTreeMap::new(),
            consensus_strength: 0.0,
            dissenting_agents: Vec::new(),
            conflict_ratio: 0.0,
            total_agents: positions.len(),
        };
    };

    let consensus = winning_votes as f64 / total_votes as f64;
    let debate_bonus = (argument_count as f64 * 0.01).min(0.1);
    let mut confidence = (consensus + debate_bonus).min(0.95);

    let dissenting_agents: Vec<String> = positions
        .iter()
        .filter(|p| p.verdict != winner)
        .map(|p| p.agent.clone())
        .collect();
    let conflict_ratio = dissenting_agents.len() as f64 / positions.len().max(1) as f64;
    if conflict_ratio >= 0.60 {
        confidence *= 1.0 - conflict_ratio * 0.3;
        warn!(
            "High conflict: {}/{} agents disagree with {winner}",
            dissenting_agents.len(),
            positions.len()
        );
    }

    Resolution {
        verdict: winner,
        confidence,
        vote_distribution: tally
            .into_iter()
            .map(|(level, votes)| (level.as_str().to_string(), votes))
            .collect(),
        consensus_strength: consensus,
        dissenting_agents,
        conflict_ratio,
        total_agents: positions.len(),
    }
}

fn opposing_views(positions: &[Position], speaker: &str) -> String {
    let lines: Vec<String> = positions
        .iter()
        .filter(|p| p.agent != speaker)
        .map(|p| {
            format!(
                "- {}: {} risk ({:.0}% confidence)",
                p.agent,
                p.verdict,
                p.confidence * 100.0
            )
        })
        .collect();
    if lines.is_empty() {
        "No opposing views".to_string()
    } else {
        lines.join("\n")
    }
}

fn previous_context(history: &[Argument]) -> String {
    if history.is_empty() {
        return "No previous arguments".to_string();
    }
    history[history.len().saturating_sub(CONTEXT_ARGUMENTS)..]
        .iter()
        .map(|a| format!("- {}: {}...", a.agent, truncate_chars(&a.argument, 150)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs the debate and records its outcome
pub struct DebateOrchestrator {
    ctx: AgentContext,
    rounds: usize,
}

impl DebateOrchestrator {
    pub fn new(ctx: AgentContext) -> Self {
        Self {
            ctx,
            rounds: DEBATE_ROUNDS,
        }
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    async fn round(
        &self,
        state: &EsgState,
        positions: &[Position],
        history: &[Argument],
        round: usize,
    ) -> Vec<Argument> {
        let previous = previous_context(history);
        let mut arguments = Vec::new();

        for position in positions {
            let vars = json!({
                "agent": position.agent,
                "company": state.company,
                "industry": state.industry,
                "claim": state.claim,
                "verdict": position.verdict.as_str(),
                "confidence": format!("{:.2}%", position.confidence * 100.0),
                "reasoning": position.reasoning,
                "opposing": opposing_views(positions, &position.agent),
                "round": round + 1,
                "rounds": self.rounds,
                "previous": previous,
            });

            let reply = match self.ctx.render(DEBATE_ARGUMENT, &vars) {
                Ok(prompt) => self
                    .ctx
                    .primary()
                    .complete(&prompt)
                    .await
                    .map_err(esg_core::Error::from),
                Err(e) => Err(e),
            };
            match reply {
                Ok(argument) => arguments.push(Argument {
                    round: round + 1,
                    agent: position.agent.clone(),
                    position: position.verdict,
                    argument,
                }),
                Err(e) => warn!("Debate argument from {} failed: {e}", position.agent),
            }
        }
        arguments
    }
}

#[async_trait]
impl Stage for DebateOrchestrator {
    fn name(&self) -> &str {
        names::DEBATE_ORCHESTRATOR
    }

    #[tracing::instrument(skip_all, fields(company = %state.company))]
    async fn run(&self, state: &mut EsgState) -> Result<()> {
        let positions = extract_positions(state);

        if !has_conflict(&positions) {
            info!("All {} agents agree, skipping debate", positions.len());
            state.record(
                AgentOutput::success(names::DEBATE_ORCHESTRATOR, Value::Null, 0.0)
                    .with_action("no_conflict_detected")
                    .with_detail("message", json!("All agents in agreement, skipping debate")),
            );
            return Ok(());
        }

        let conflicting: Vec<&str> = positions.iter().map(|p| p.agent.as_str()).collect();
        info!("Conflict between {} agents, debating", conflicting.len());
        state.record(
            AgentOutput::success(names::DEBATE_ORCHESTRATOR, Value::Null, 0.0)
                .with_action("conflict_detected")
                .with_detail("conflicting_agents", json!(conflicting))
                .with_detail("initiating_debate", json!(true)),
        );

        let mut history: Vec<Argument> = Vec::new();
        for round in 0..self.rounds {
            let arguments = self.round(state, &positions, &history, round).await;
            history.extend(arguments);
        }

        let resolution = resolve_by_voting(&positions, history.len());
        info!(
            "Debate resolved to {} (confidence {:.1}%, conflict ratio {:.2})",
            resolution.verdict,
            resolution.confidence * 100.0,
            resolution.conflict_ratio
        );

        state.risk_level = Some(resolution.verdict);
        state.confidence = resolution.confidence;
        state.record(
            AgentOutput::success(
                names::DEBATE_RESOLUTION,
                json!({
                    "debate_rounds": self.rounds,
                    "total_arguments": history.len(),
                    "debate_summary": history,
                }),
                resolution.confidence,
            )
            .with_risk_level(resolution.verdict)
            .with_detail("vote_distribution", json!(resolution.vote_distribution))
            .with_detail("consensus_strength", json!(resolution.consensus_strength))
            .with_detail("dissenting_agents", json!(resolution.dissenting_agents))
            .with_detail("conflict_ratio", json!(resolution.conflict_ratio)),
        );
        Ok(())
    }
}
