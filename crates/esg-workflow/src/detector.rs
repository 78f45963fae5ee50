//! End-to-end analysis of one claim
//!
//! [`Detector`] routes a claim through the supervisor, runs the chosen track,
//! renders the reports and prints the console summary the batch harness
//! filters on.

use crate::executor::execute_stage;
use crate::names;
use crate::report::{ReportGenerator, title_case};
use crate::supervisor::Supervisor;
use crate::tracks::Tracks;
use chrono::{DateTime, Local};
use esg_agents::AgentContext;
use esg_core::text::ellipsize;
use esg_core::{AgentOutput, EsgState, Result, WorkflowPath};
use esg_llm::LlmClients;
use esg_sources::SourceHub;
use esg_utils::Settings;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Marker line the batch harness looks for
pub const SUMMARY_MARKER: &str = "📊 EXECUTIVE SUMMARY";

const RULE: usize = 80;
const CLAIM_PREVIEW: usize = 100;

/// Company-name fragments and the industry they imply, checked in order
const INDUSTRY_HINTS: &[(&str, &str)] = &[
    ("bp", "Energy"),
    ("shell", "Energy"),
    ("exxon", "Energy"),
    ("chevron", "Energy"),
    ("conocophillips", "Energy"),
    ("microsoft", "Technology"),
    ("apple", "Technology"),
    ("google", "Technology"),
    ("amazon", "Technology"),
    ("meta", "Technology"),
    ("facebook", "Technology"),
    ("coca-cola", "Consumer Goods"),
    ("pepsi", "Consumer Goods"),
    ("unilever", "Consumer Goods"),
    ("procter", "Consumer Goods"),
    ("nike", "Consumer Goods"),
    ("adidas", "Consumer Goods"),
    ("tesla", "Automotive"),
    ("volkswagen", "Automotive"),
    ("ford", "Automotive"),
    ("gm", "Automotive"),
    ("toyota", "Automotive"),
    ("jpmorgan", "Financial Services"),
    ("goldman", "Financial Services"),
    ("bank of america", "Financial Services"),
    ("wells fargo", "Financial Services"),
    ("pfizer", "Healthcare"),
    ("johnson", "Healthcare"),
    ("moderna", "Healthcare"),
];

/// Industry guessed from the company name, "General" when nothing matches
pub fn detect_industry(company: &str) -> &'static str {
    let lower = company.to_lowercase();
    INDUSTRY_HINTS
        .iter()
        .find(|(hint, _)| lower.contains(hint))
        .map_or("General", |&(_, industry)| industry)
}

/// Everything one analysis produced
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub state: EsgState,
    pub report: String,
    pub json_export: String,
    /// Report files written, empty when saving was disabled or failed
    pub saved: Vec<PathBuf>,
}

pub struct Detector {
    supervisor: Supervisor,
    tracks: Tracks,
    reports_dir: Option<PathBuf>,
}

impl Detector {
    /// Detector over an existing context; registers the workflow prompts
    pub fn new(ctx: AgentContext) -> Result<Self> {
        crate::prompts::register_prompts(ctx.prompts())?;
        let tracks = Tracks::new(&ctx)?;
        Ok(Self {
            supervisor: Supervisor::new(ctx),
            tracks,
            reports_dir: None,
        })
    }

    /// Detector wired to the configured LLM providers and news sources
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let llm = LlmClients::from_settings(settings)?;
        let sources = SourceHub::from_settings(settings);
        let detector = Self::new(AgentContext::new(llm, sources)?)?;
        Ok(detector.with_reports_dir(Some(settings.reports_dir.clone())))
    }

    /// Directory for report files, `None` disables saving
    pub fn with_reports_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.reports_dir = dir;
        self
    }

    /// Route the claim and run the selected track
    pub async fn run(&self, state: &mut EsgState) {
        execute_stage(&self.supervisor, state).await;
        let path = state.workflow_path.unwrap_or(WorkflowPath::StandardTrack);
        info!("Running {}", path.display_name());
        self.tracks.for_path(path).execute(state).await;
    }

    /// Analyse one claim, printing progress and the executive summary
    pub async fn analyze(
        &self,
        company: &str,
        claim: &str,
        industry: Option<&str>,
    ) -> Result<AnalysisOutcome> {
        let industry = industry
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| detect_industry(company));

        let heavy = "=".repeat(RULE);
        println!("\n{heavy}");
        println!("🔍 ANALYZING: {company}");
        println!("{heavy}");
        println!("📋 Claim: {claim}");
        println!("🏢 Industry: {industry}");
        println!("⏰ Started: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        println!("{heavy}");
        println!("\n🚀 Running analysis workflow...");
        println!("{}", "─".repeat(RULE));

        let mut state = EsgState::new(company, claim, industry);
        self.run(&mut state).await;

        println!("\n{heavy}");
        println!("✅ ANALYSIS COMPLETE");
        println!("{heavy}");

        let generator = ReportGenerator::new();
        let report = generator.executive_report(&state);
        let json_export = generator.export_json(&state)?;

        let mut outcome = AnalysisOutcome {
            state,
            report,
            json_export,
            saved: Vec::new(),
        };

        if let Some(dir) = &self.reports_dir {
            match save_reports(&outcome, dir, Local::now()) {
                Ok(paths) => {
                    println!("\n💾 Reports saved:");
                    for (icon, path) in ["📄", "📊", "🔍"].iter().zip(&paths) {
                        println!("   {icon} {}", path.display());
                    }
                    outcome.saved = paths;
                }
                Err(e) => warn!("Could not save reports to {}: {e}", dir.display()),
            }
        }

        print!("{}", executive_summary(&outcome.state));
        println!("\n⏰ Completed: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        Ok(outcome)
    }
}

/// Write the text report, the JSON export and the full state under `dir`
///
/// Files are named `ESG_Report_{company}_{YYYYmmdd_HHMMSS}` with `.txt`,
/// `.json` and `_FULL.json` suffixes.
pub fn save_reports(
    outcome: &AnalysisOutcome,
    dir: &Path,
    at: DateTime<Local>,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let company: String = outcome
        .state
        .company
        .chars()
        .map(|c| if c == ' ' || c == '/' || c == '\\' { '_' } else { c })
        .collect();
    let base = format!("ESG_Report_{company}_{}", at.format("%Y%m%d_%H%M%S"));

    let text = dir.join(format!("{base}.txt"));
    fs::write(&text, &outcome.report)?;

    let json = dir.join(format!("{base}.json"));
    fs::write(&json, &outcome.json_export)?;

    let full = dir.join(format!("{base}_FULL.json"));
    fs::write(&full, serde_json::to_string_pretty(&outcome.state)?)?;

    Ok(vec![text, json, full])
}

/// Console summary of a finished analysis
///
/// The ten lines after the marker run from the rule through the evidence
/// count whenever a track was selected.
pub fn executive_summary(state: &EsgState) -> String {
    let heavy = "=".repeat(RULE);
    let mut lines = vec![
        String::new(),
        heavy.clone(),
        SUMMARY_MARKER.to_string(),
        heavy.clone(),
        String::new(),
        format!("🏢 Company: {}", state.company),
        format!("🏭 Industry: {}", state.industry),
        format!("📋 Claim: {}", ellipsize(&state.claim, CLAIM_PREVIEW)),
    ];

    let (risk, confidence) = match &state.final_verdict {
        Some(verdict) => (Some(verdict.risk_level), verdict.final_confidence),
        None => (state.risk_level, state.confidence),
    };
    let (marker, label) = risk.map_or(("⚪", "N/A"), |r| (r.emoji(), r.as_str()));
    lines.push(String::new());
    lines.push(format!("{marker} Risk Level: {label}"));
    lines.push(format!("📈 Confidence: {:.1}%", confidence * 100.0));
    if let Some(path) = state.workflow_path {
        lines.push(format!("🔀 Analysis Path: {}", path.display_name()));
    }
    lines.push(format!("📚 Evidence Sources: {}", state.evidence.len()));

    let mut seen = HashSet::new();
    let unique: Vec<&AgentOutput> = state
        .agent_outputs
        .iter()
        .filter(|o| seen.insert((o.agent.as_str(), o.timestamp)))
        .collect();
    let agents: BTreeSet<&str> = unique.iter().map(|o| o.agent.as_str()).collect();
    let failed: BTreeSet<&str> = unique
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| o.agent.as_str())
        .collect();
    let successful = agents.difference(&failed).count();

    lines.push(String::new());
    lines.push(format!("🤖 Agents Executed: {}", agents.len()));
    lines.push(format!(
        "✅ Successful: {successful}/{} ({:.0}%)",
        agents.len(),
        successful as f64 / agents.len().max(1) as f64 * 100.0
    ));

    if !agents.is_empty() {
        lines.push(String::new());
        lines.push("📋 Agents Used:".to_string());
        lines.extend(agents.iter().map(|agent| {
            let status = if failed.contains(agent) { "❌" } else { "✅" };
            format!("   {status} {}", title_case(agent))
        }));
    }

    let debates: Vec<&&AgentOutput> = unique
        .iter()
        .filter(|o| o.agent == names::DEBATE_ORCHESTRATOR)
        .collect();
    if !debates.is_empty() {
        lines.push(String::new());
        lines.push("🗣️  Multi-Agent Debate: ACTIVATED".to_string());
        for debate in debates {
            match debate.action.as_deref() {
                Some("conflict_detected") => {
                    let conflicting: Vec<&str> = debate
                        .detail("conflicting_agents")
                        .and_then(Value::as_array)
                        .map(|a| a.iter().filter_map(Value::as_str).collect())
                        .unwrap_or_default();
                    lines.push(format!("   Conflicting agents: {}", conflicting.join(", ")));
                }
                Some("no_conflict_detected") => {
                    lines.push("   All agents in agreement - debate skipped".to_string());
                }
                _ => {}
            }
        }
    }

    lines.push(String::new());
    lines.push(format!("⏱️  Total Processing Steps: {}", unique.len()));
    lines.push(String::new());
    lines.push(heavy);

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context;
    use chrono::TimeZone;
    use esg_core::RiskLevel;
    use esg_llm::testing::ScriptedProvider;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn summarised_state() -> EsgState {
        let mut state = EsgState::new(
            "H&M",
            "H&M is committed to using 100% recycled or sustainably sourced materials by 2030",
            "Fashion & Retail",
        );
        state.workflow_path = Some(WorkflowPath::DeepAnalysis);
        state.risk_level = Some(RiskLevel::High);
        state.confidence = 0.48;
        state.record(AgentOutput::success("claim_extraction", Value::Null, 0.8));
        state.record(AgentOutput::failure("peer_comparison", "timeout", 0.5));
        state.record(
            AgentOutput::success(names::DEBATE_ORCHESTRATOR, Value::Null, 0.0)
                .with_action("conflict_detected")
                .with_detail("conflicting_agents", json!(["risk_scoring", "sentiment_analysis"])),
        );
        state
    }

    #[test]
    fn test_detect_industry() {
        assert_eq!(detect_industry("BP"), "Energy");
        assert_eq!(detect_industry("Coca-Cola Company"), "Consumer Goods");
        assert_eq!(detect_industry("Volkswagen"), "Automotive");
        assert_eq!(detect_industry("Bank of America"), "Financial Services");
        assert_eq!(detect_industry("Acme Widgets"), "General");
    }

    #[test]
    fn test_summary_has_ten_lines_after_marker() {
        let summary = executive_summary(&summarised_state());
        let lines: Vec<&str> = summary.lines().collect();
        let marker = lines.iter().position(|l| l.contains("EXECUTIVE SUMMARY")).unwrap();

        assert_eq!(
            lines[marker + 1..=marker + 10].to_vec(),
            vec![
                "=".repeat(RULE).as_str(),
                "",
                "🏢 Company: H&M",
                "🏭 Industry: Fashion & Retail",
                "📋 Claim: H&M is committed to using 100% recycled or sustainably sourced materials by 2030",
                "",
                "🔴 Risk Level: HIGH",
                "📈 Confidence: 48.0%",
                "🔀 Analysis Path: Deep Analysis with Multi-Agent Debate (High Complexity)",
                "📚 Evidence Sources: 0",
            ]
        );
    }

    #[test]
    fn test_summary_agent_status_and_debate() {
        let summary = executive_summary(&summarised_state());
        assert!(summary.contains("🤖 Agents Executed: 3"));
        assert!(summary.contains("✅ Successful: 2/3 (67%)"));
        assert!(summary.contains("   ❌ Peer Comparison"));
        assert!(summary.contains("   ✅ Claim Extraction"));
        assert!(summary.contains("   Conflicting agents: risk_scoring, sentiment_analysis"));
        assert!(summary.contains("⏱️  Total Processing Steps: 3"));
    }

    #[test]
    fn test_summary_is_framed_by_rules() {
        let summary = executive_summary(&summarised_state());
        let heavy = "=".repeat(RULE);

        assert!(summary.starts_with(&format!("\n{heavy}\n{SUMMARY_MARKER}\n{heavy}\n\n")));
        assert!(summary.ends_with(&format!("Total Processing Steps: 3\n\n{heavy}\n")));
        assert_eq!(summary.matches(SUMMARY_MARKER).count(), 1);
    }

    #[test]
    fn test_summary_clips_long_claims() {
        let state = EsgState::new("BP", "x".repeat(150), "Energy");
        let summary = executive_summary(&state);
        assert!(summary.contains(&format!("📋 Claim: {}...", "x".repeat(100))));
        assert!(summary.contains("⚪ Risk Level: N/A"));
    }

    #[test]
    fn test_save_reports_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = AnalysisOutcome {
            state: summarised_state(),
            report: "report body".to_string(),
            json_export: "{}".to_string(),
            saved: Vec::new(),
        };
        let at = Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();

        let paths = save_reports(&outcome, dir.path(), at).unwrap();

        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "ESG_Report_H&M_20250314_092653.txt",
                "ESG_Report_H&M_20250314_092653.json",
                "ESG_Report_H&M_20250314_092653_FULL.json",
            ]
        );
        assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "report body");
        let full: Value = serde_json::from_str(&fs::read_to_string(&paths[2]).unwrap()).unwrap();
        assert_eq!(full["company"], "H&M");
    }

    #[tokio::test]
    async fn test_analyze_fast_track_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let detector = Detector::new(context(ScriptedProvider::new().default_reply("0.1")))
            .unwrap()
            .with_reports_dir(Some(dir.path().to_path_buf()));

        let outcome = detector
            .analyze("Microsoft", "Microsoft will be carbon negative by 2030", None)
            .await
            .unwrap();

        assert_eq!(outcome.state.industry, "Technology");
        assert_eq!(outcome.state.workflow_path, Some(WorkflowPath::FastTrack));
        assert!(outcome.state.final_verdict.is_some());
        assert!(outcome.report.contains("EXECUTIVE SUMMARY"));
        assert_eq!(outcome.saved.len(), 3);
        assert!(
            outcome
                .state
                .outputs_for(names::REPORT_GENERATION)
                .next()
                .is_some()
        );
    }
}
