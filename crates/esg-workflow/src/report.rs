//! Investor-style report rendering
//!
//! [`ReportGenerator`] turns a finished [`EsgState`] into the plain-text
//! assessment report and the machine-readable JSON export. Ratings follow an
//! MSCI-style letter scale (LOW → AA, MODERATE → BBB, HIGH → CCC).

use crate::names;
use crate::scoring::carries_confidence;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use esg_agents::{EvidenceReport, names as agents};
use esg_core::text::ellipsize;
use esg_core::{Agent, AgentOutput, EsgState, Evidence, Result, RiskLevel, WorkflowPath};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use tracing::info;

pub const REPORT_VERSION: &str = "1.0";
pub const METHODOLOGY: &str = "Hybrid Multi-Agent Analysis with Typed Workflow Orchestration";

const WIDE: usize = 80;
const EVIDENCE_LISTED: usize = 15;
const PER_SOURCE: usize = 5;
const JSON_SOURCES: usize = 10;

fn heavy() -> String {
    "=".repeat(WIDE)
}

fn light() -> String {
    "─".repeat(WIDE)
}

fn banner(out: &mut String, title: &str) {
    let _ = write!(out, "{}\n{title}\n{}\n\n", heavy(), heavy());
}

/// `YYYYmmdd-HHMMSS-XXXX` with the first four alphanumerics of the company
pub fn report_id(company: &str, at: DateTime<Utc>) -> String {
    let tag: String = company
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(4)
        .collect::<String>()
        .to_ascii_uppercase();
    format!("{}-{tag}", at.format("%Y%m%d-%H%M%S"))
}

pub fn evidence_quality(count: usize) -> &'static str {
    if count > 5 {
        "High"
    } else if count > 2 {
        "Moderate"
    } else {
        "Limited"
    }
}

/// `"peer_comparison"` → `"Peer Comparison"`
pub fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Distinct agents that ran and those with no failed record
fn agent_counts(outputs: &[AgentOutput]) -> (usize, usize) {
    let all: BTreeSet<&str> = outputs.iter().map(|o| o.agent.as_str()).collect();
    let failed: BTreeSet<&str> = outputs
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| o.agent.as_str())
        .collect();
    (all.len(), all.difference(&failed).count())
}

fn percent_of(part: usize, whole: usize) -> f64 {
    part as f64 / whole.max(1) as f64 * 100.0
}

#[derive(Debug, Clone)]
pub struct ReportGenerator {
    generated_at: DateTime<Utc>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Generator stamping reports with a fixed time
    pub fn at(generated_at: DateTime<Utc>) -> Self {
        Self { generated_at }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Full plain-text assessment report
    pub fn executive_report(&self, state: &EsgState) -> String {
        let risk = state.risk_or_moderate();
        let evidence_count = state.evidence.len();
        let (total, successful) = agent_counts(&state.agent_outputs);
        let success_pct = percent_of(successful, total);
        let workflow = state
            .workflow_path
            .unwrap_or(WorkflowPath::StandardTrack)
            .display_name();
        let at = self.generated_at;

        let mut out = String::new();
        let _ = write!(
            out,
            "\n{}\nESG GREENWASHING RISK ASSESSMENT REPORT\n{}\n\n",
            heavy(),
            heavy()
        );

        let _ = writeln!(out, "REPORT METADATA\n{}", light());
        let _ = writeln!(out, "Report ID:           {}", report_id(&state.company, at));
        let _ = writeln!(
            out,
            "Analysis Date:       {}",
            at.format("%B %d, %Y at %H:%M:%S UTC")
        );
        let _ = writeln!(out, "Report Version:      {REPORT_VERSION}");
        let _ = writeln!(out, "Methodology:         {METHODOLOGY}");
        let _ = writeln!(out, "Analysis Workflow:   {workflow}\n");

        banner(&mut out, "EXECUTIVE SUMMARY");
        let _ = writeln!(out, "Company Information\n{}", light());
        let _ = writeln!(out, "Company Name:        {}", state.company);
        let _ = writeln!(out, "Industry Sector:     {}", state.industry);
        let _ = writeln!(out, "Claim Analyzed:      {}\n", state.claim);

        let _ = writeln!(out, "Overall Assessment\n{}", light());
        let _ = writeln!(out, "ESG Risk Rating:     {} ({risk} RISK)", risk.rating());
        let _ = writeln!(out, "Confidence Score:    {:.1}%", state.confidence * 100.0);
        let _ = writeln!(out, "Evidence Quality:    {}", evidence_quality(evidence_count));
        let _ = writeln!(out, "Data Sources:        {evidence_count} verified sources");
        let _ = writeln!(
            out,
            "Agent Performance:   {successful}/{total} agents successful ({success_pct:.0}%)\n"
        );

        let _ = writeln!(out, "RISK RATING SCALE (MSCI-Style)\n{}", light());
        out.push_str("AAA - AA  : Low Risk (Best-in-class ESG performance)\n");
        out.push_str("A - BBB   : Moderate Risk (Industry average ESG performance)\n");
        out.push_str("BB - CCC  : High Risk (Significant ESG concerns)\n\n");

        banner(&mut out, "KEY FINDINGS");
        out.push_str(&key_findings(risk, state.confidence, evidence_count));
        out.push_str("\n\n");

        banner(&mut out, "AGENT ANALYSIS BREAKDOWN");
        out.push_str(&agent_breakdown(&state.agent_outputs));
        out.push_str("\n\n");

        banner(&mut out, "DETAILED ANALYSIS");
        out.push_str(&detailed_analysis(state));
        out.push('\n');

        banner(&mut out, "EVIDENCE SUMMARY");
        out.push_str(&evidence_summary(&state.evidence));
        out.push_str("\n\n");

        banner(&mut out, "METHODOLOGY & DATA QUALITY");
        out.push_str("Analysis Framework:\n");
        let _ = writeln!(out, "  • Multi-Agent AI System with {total} specialized agents");
        out.push_str("  • Industry-adjusted risk thresholds (MSCI-based)\n");
        let _ = writeln!(out, "  • Real-time data integration from {evidence_count} sources");
        out.push_str("  • Consensus-based validation through agent debate mechanism\n\n");
        out.push_str("Data Quality Assurance:\n");
        let _ = writeln!(out, "  • Successful Agents:  {successful}/{total} ({success_pct:.0}%)");
        let _ = writeln!(out, "  • Confidence Level:   {:.1}%", state.confidence * 100.0);
        let _ = writeln!(out, "  • Evidence Coverage:  {evidence_count} independent sources");
        out.push_str("  • Temporal Relevance: Real-time monitoring (last 24-48 hours)\n\n");
        let _ = writeln!(out, "Analysis Workflow: {workflow}");
        out.push_str("  • Complexity Assessment → Dynamic Routing\n");
        out.push_str("  • Claim Extraction → Evidence Retrieval → Contradiction Analysis\n");
        out.push_str("  • Historical Pattern Analysis → Industry Peer Comparison\n");
        out.push_str("  • Risk Scoring with Industry Thresholds → Final Verdict\n\n");

        banner(&mut out, "REGULATORY COMPLIANCE & STANDARDS");
        out.push_str("This report aligns with the following ESG frameworks:\n");
        for framework in [
            "MSCI ESG Ratings Methodology",
            "Sustainalytics ESG Risk Ratings",
            "GRI (Global Reporting Initiative) Standards",
            "SASB (Sustainability Accounting Standards Board)",
            "TCFD (Task Force on Climate-related Financial Disclosures)",
        ] {
            let _ = writeln!(out, "  ✓ {framework}");
        }
        out.push('\n');

        banner(&mut out, "DISCLAIMERS & LIMITATIONS");
        out.push_str(
            "Scope: This analysis is based on publicly available information and real-time\n       \
             data sources. It reflects conditions as of the analysis date.\n\n",
        );
        out.push_str("Limitations:\n");
        out.push_str("  • Analysis quality depends on data availability and source reliability\n");
        out.push_str("  • ESG claims evolve over time; regular monitoring recommended\n");
        out.push_str("  • Industry comparisons based on available peer data\n");
        out.push_str(
            "  • AI-generated insights require human expert validation for investment decisions\n\n",
        );
        out.push_str("Forward-Looking Statements:\n");
        out.push_str("  This report may contain assessments based on forward-looking statements.\n");
        out.push_str("  Actual ESG performance may differ materially from analyzed claims.\n\n");

        banner(&mut out, "CONTACT & SUPPORT");
        out.push_str("For inquiries regarding this report:\n");
        out.push_str("  System:     ESG Greenwashing Detection Platform\n");
        let _ = writeln!(out, "  Version:    {REPORT_VERSION}");
        let _ = writeln!(out, "  Generated:  {}\n", at.format("%Y-%m-%d %H:%M:%S UTC"));

        banner(&mut out, "END OF REPORT");
        out.push_str(
            "This report is confidential and intended for the recipient's internal use only.\n",
        );
        out.push_str("Redistribution requires explicit authorization.\n");
        out
    }

    /// Machine-readable export of the assessment
    pub fn export_json(&self, state: &EsgState) -> Result<String> {
        let (total, successful) = agent_counts(&state.agent_outputs);
        let risk = state.risk_or_moderate();
        let export = json!({
            "report_metadata": {
                "report_id": report_id(&state.company, self.generated_at),
                "timestamp": self.generated_at.to_rfc3339(),
                "version": REPORT_VERSION,
                "methodology": METHODOLOGY,
            },
            "company_info": {
                "name": state.company,
                "industry": state.industry,
                "claim": state.claim,
            },
            "assessment": {
                "risk_level": state.risk_level,
                "confidence_score": state.confidence,
                "esg_rating": risk.rating(),
                "workflow_path": state.workflow_path,
            },
            "evidence": {
                "total_sources": state.evidence.len(),
                "sources": state.evidence.iter().take(JSON_SOURCES).collect::<Vec<_>>(),
            },
            "agent_performance": {
                "total_agents": total,
                "successful_agents": successful,
                "success_rate": successful as f64 / total.max(1) as f64,
            },
            "agent_details": state.agent_outputs.iter().map(|o| json!({
                "agent": o.agent,
                "confidence": o.confidence,
                "timestamp": o.timestamp,
                "status": if o.is_success() { "success" } else { "error" },
            })).collect::<Vec<_>>(),
        });
        Ok(serde_json::to_string_pretty(&export)?)
    }
}

fn key_findings(risk: RiskLevel, confidence: f64, evidence_count: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let risk_lines: [&str; 5] = match risk {
        RiskLevel::High => [
            "⚠ HIGH GREENWASHING RISK DETECTED",
            "  • Claim lacks sufficient evidence or contains contradictions",
            "  • Peer comparison shows below-industry-average performance",
            "  • Historical data reveals inconsistent ESG commitments",
            "  • Recommended Action: Deep due diligence required before engagement",
        ],
        RiskLevel::Moderate => [
            "⚡ MODERATE GREENWASHING RISK IDENTIFIED",
            "  • Claim partially supported by available evidence",
            "  • Some contradictions or ambiguities detected",
            "  • Mixed signals from historical performance",
            "  • Recommended Action: Additional verification and monitoring",
        ],
        RiskLevel::Low => [
            "✓ LOW GREENWASHING RISK",
            "  • Claim well-supported by multiple credible sources",
            "  • Consistent with historical ESG performance",
            "  • Aligns with industry best practices",
            "  • Recommended Action: Standard monitoring protocols",
        ],
    };
    lines.extend(risk_lines.iter().map(ToString::to_string));
    lines.push(String::new());

    let confidence_lines: [&str; 4] = if confidence >= 0.8 {
        [
            "✓ HIGH CONFIDENCE ASSESSMENT",
            "  • Robust evidence base from multiple independent sources",
            "  • Agent consensus achieved across analytical dimensions",
            "  • Low uncertainty in risk classification",
        ]
    } else if confidence >= 0.6 {
        [
            "⚡ MODERATE CONFIDENCE ASSESSMENT",
            "  • Adequate evidence but some information gaps identified",
            "  • Partial agent consensus with minor disagreements",
            "  • Moderate uncertainty in final assessment",
        ]
    } else {
        [
            "⚠ LIMITED CONFIDENCE",
            "  • Insufficient evidence for definitive assessment",
            "  • Significant information gaps remain",
            "  • Further investigation strongly recommended",
        ]
    };
    lines.extend(confidence_lines.iter().map(ToString::to_string));
    lines.push(String::new());

    if evidence_count >= 10 {
        lines.push("✓ COMPREHENSIVE EVIDENCE COVERAGE".to_string());
        lines.push(format!("  • {evidence_count} independent sources analyzed"));
    } else if evidence_count >= 5 {
        lines.push("⚡ ADEQUATE EVIDENCE COVERAGE".to_string());
        lines.push(format!("  • {evidence_count} sources analyzed"));
    } else {
        lines.push("⚠ LIMITED EVIDENCE AVAILABILITY".to_string());
        lines.push(format!("  • Only {evidence_count} sources available"));
        lines.push("  • Assessment reliability may be affected".to_string());
    }
    lines.join("\n")
}

#[derive(Default)]
struct AgentTally {
    runs: usize,
    errors: usize,
    confidence_sum: f64,
    confidence_count: usize,
}

fn agent_breakdown(outputs: &[AgentOutput]) -> String {
    let mut tallies: BTreeMap<&str, AgentTally> = BTreeMap::new();
    for output in outputs {
        let tally = tallies.entry(output.agent.as_str()).or_default();
        tally.runs += 1;
        if !output.is_success() {
            tally.errors += 1;
        }
        if carries_confidence(output) {
            tally.confidence_sum += output.confidence;
            tally.confidence_count += 1;
        }
    }

    let mut lines = vec![
        "Agent Execution Summary:".to_string(),
        light(),
        format!(
            "{:<35} | {:<8} | {:<10} | {:<5}",
            "Agent Name", "Status", "Confidence", "Runs"
        ),
        light(),
    ];
    for (agent, tally) in &tallies {
        let confidence = if tally.confidence_count > 0 {
            format!(
                "{:.1}%",
                tally.confidence_sum / tally.confidence_count as f64 * 100.0
            )
        } else {
            "N/A".to_string()
        };
        let status = if tally.errors > 0 { "FAILED" } else { "SUCCESS" };
        lines.push(format!(
            "{:<35} | {status:<8} | {confidence:<10} | {:<5}",
            title_case(agent),
            tally.runs
        ));
    }
    lines.push(light());
    lines.join("\n")
}

fn detailed_analysis(state: &EsgState) -> String {
    let ran = |agent: &'static str| state.outputs_for(agent).next();
    let mut lines = vec!["ENVIRONMENTAL DIMENSION".to_string(), light()];

    if let Some(output) = ran(agents::CONTRADICTION_ANALYSIS) {
        let count = output
            .detail("contradictions_count")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        if count > 0 {
            lines.push(format!("⚠ Claim Consistency:    {count} contradiction(s) detected"));
        } else {
            lines.push("✓ Claim Consistency:    No contradictions found".to_string());
        }
    }
    if ran(agents::EVIDENCE_RETRIEVAL).is_some() {
        let count = esg_agents::report::<EvidenceReport>(state, agents::EVIDENCE_RETRIEVAL)
            .map_or(0, |r| r.evidence.len());
        lines.push(format!("  Evidence Coverage:    {count} independent source(s)"));
    }
    if ran(agents::TEMPORAL_ANALYSIS).is_some() {
        lines.push("  Historical Track Record: Past ESG performance evaluated".to_string());
    }
    lines.push(String::new());

    lines.push("SOCIAL DIMENSION".to_string());
    lines.push(light());
    if ran(agents::SENTIMENT_ANALYSIS).is_some() {
        lines.push("  Public Sentiment:     Analyzed from recent media coverage".to_string());
    }
    if ran(agents::CREDIBILITY_ANALYSIS).is_some() {
        lines.push("  Source Credibility:   Verified against trusted repositories".to_string());
    }
    if ran(agents::REALTIME_MONITORING).is_some() {
        lines.push("  Real-time Monitoring: Latest news and developments tracked".to_string());
    }
    lines.push(String::new());

    lines.push("GOVERNANCE DIMENSION".to_string());
    lines.push(light());
    if ran(agents::PEER_COMPARISON).is_some() {
        lines.push("  Industry Benchmarking:   Compared against sector peers".to_string());
    }
    if let Some(output) = ran(agents::RISK_SCORING) {
        let level = output.risk_level.map_or("N/A", |l| l.as_str());
        lines.push(format!("  Risk Assessment:         {level} risk classification"));
    }
    lines.push(String::new());
    lines.join("\n")
}

fn evidence_summary(evidence: &[Evidence]) -> String {
    if evidence.is_empty() {
        return "No evidence sources available for this analysis.\n\
                This may indicate data collection issues or claim verification challenges."
            .to_string();
    }

    let mut groups: BTreeMap<&str, Vec<&Evidence>> = BTreeMap::new();
    for item in evidence.iter().take(EVIDENCE_LISTED) {
        groups.entry(item.source_name.as_str()).or_default().push(item);
    }

    let mut lines = vec![
        format!("Total Evidence Sources: {}", evidence.len()),
        light(),
        String::new(),
    ];
    for (source, items) in &groups {
        lines.push(format!("{}: {} item(s)", title_case(source), items.len()));
        lines.push("─".repeat(40));
        for (i, item) in items.iter().take(PER_SOURCE).enumerate() {
            let title = if item.title.is_empty() {
                item.snippet.as_str()
            } else {
                item.title.as_str()
            };
            let title = if title.chars().count() > 75 {
                ellipsize(title, 72)
            } else {
                title.to_string()
            };
            lines.push(format!("  {}. {title}", i + 1));
        }
        if items.len() > PER_SOURCE {
            lines.push(format!("  ... and {} more items", items.len() - PER_SOURCE));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Renders the text report into `state.report`
#[derive(Debug, Default)]
pub struct ReportGenerationAgent;

impl ReportGenerationAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for ReportGenerationAgent {
    fn name(&self) -> &str {
        names::REPORT_GENERATION
    }

    async fn run(&self, state: &mut EsgState) -> Result<AgentOutput> {
        let report = ReportGenerator::new().executive_report(state);
        info!("Report generated ({} characters)", report.len());
        let length = report.len();
        state.report = report;
        Ok(AgentOutput::success(
            names::REPORT_GENERATION,
            json!({ "report_length": length }),
            0.95,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use esg_core::{Relationship, SourceType};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn evidence(source: &str, title: &str) -> Evidence {
        Evidence {
            source_id: "ev_001".to_string(),
            source_name: source.to_string(),
            source_type: SourceType::NewsSource,
            url: String::new(),
            title: title.to_string(),
            snippet: String::new(),
            date: None,
            relationship: Relationship::Neutral,
            freshness_days: 3,
            data_source_api: "test".to_string(),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    fn finished_state() -> EsgState {
        let mut state = EsgState::new("H&M", "100% recycled materials", "Fashion & Retail");
        state.workflow_path = Some(WorkflowPath::StandardTrack);
        state.risk_level = Some(RiskLevel::High);
        state.confidence = 0.48;
        state.evidence = vec![
            evidence("realtime_news", "H&M recycling claims questioned"),
            evidence("wire", "Fast fashion and recycled fibres"),
        ];
        state.record(AgentOutput::success(names::SUPERVISOR, Value::Null, 0.0));
        state.record(AgentOutput::success("claim_extraction", Value::Null, 0.8));
        state.record(AgentOutput::failure("evidence_retrieval", "timeout", 0.3));
        state.record(
            AgentOutput::success("risk_scoring", Value::Null, 0.7).with_risk_level(RiskLevel::High),
        );
        state
    }

    #[test]
    fn test_report_id_uses_alphanumerics() {
        assert_eq!(report_id("H&M", fixed_time()), "20250314-092653-HM");
        assert_eq!(report_id("Volkswagen", fixed_time()), "20250314-092653-VOLK");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("peer_comparison"), "Peer Comparison");
        assert_eq!(title_case("realtime_news"), "Realtime News");
    }

    #[test]
    fn test_executive_report_sections() {
        let report = ReportGenerator::at(fixed_time()).executive_report(&finished_state());

        for section in [
            "REPORT METADATA",
            "EXECUTIVE SUMMARY",
            "KEY FINDINGS",
            "AGENT ANALYSIS BREAKDOWN",
            "DETAILED ANALYSIS",
            "EVIDENCE SUMMARY",
            "END OF REPORT",
        ] {
            assert!(report.contains(section), "missing {section}");
        }
        assert!(report.contains("ESG Risk Rating:     CCC (HIGH RISK)"));
        assert!(report.contains("Confidence Score:    48.0%"));
        assert!(report.contains("Evidence Quality:    Limited"));
        assert!(report.contains("Agent Performance:   3/4 agents successful (75%)"));
        assert!(report.contains("⚠ HIGH GREENWASHING RISK DETECTED"));
        assert!(report.contains("Risk Assessment:         HIGH risk classification"));
        assert!(report.contains("Realtime News: 1 item(s)"));
    }

    #[test]
    fn test_breakdown_marks_placeholder_confidence() {
        let breakdown = agent_breakdown(&finished_state().agent_outputs);
        let supervisor = breakdown
            .lines()
            .find(|l| l.starts_with("Supervisor"))
            .unwrap();
        assert!(supervisor.contains("N/A"));
        let failed = breakdown
            .lines()
            .find(|l| l.starts_with("Evidence Retrieval"))
            .unwrap();
        assert!(failed.contains("FAILED"));
    }

    #[test]
    fn test_evidence_summary_caps_per_source() {
        let items: Vec<Evidence> = (0..7)
            .map(|i| evidence("wire", &format!("Story {i}")))
            .chain(std::iter::once(evidence("wire", &"x".repeat(90))))
            .collect();
        let summary = evidence_summary(&items);
        assert!(summary.contains("Wire: 8 item(s)"));
        assert!(summary.contains("  ... and 3 more items"));
        assert!(!summary.contains("Story 5"));
    }

    #[test]
    fn test_export_json_shape() {
        let json = ReportGenerator::at(fixed_time())
            .export_json(&finished_state())
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["assessment"]["esg_rating"], "CCC");
        assert_eq!(value["assessment"]["risk_level"], "HIGH");
        assert_eq!(value["assessment"]["workflow_path"], "standard_track");
        assert_eq!(value["evidence"]["total_sources"], 2);
        assert_eq!(value["agent_performance"]["successful_agents"], 3);
        assert_eq!(value["agent_details"][2]["status"], "error");
    }

    #[tokio::test]
    async fn test_agent_stores_report() {
        let mut state = finished_state();
        let output = ReportGenerationAgent::new().run(&mut state).await.unwrap();
        assert!(state.report.contains("ESG GREENWASHING RISK ASSESSMENT REPORT"));
        assert!((output.confidence - 0.95).abs() < f64::EPSILON);
    }
}
