//! Paced sequential runs over a case list

use crate::case::BatchCase;
use crate::filter::SummaryFilter;
use crate::invoker::Invoker;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::io::Write;
use std::time::Duration;
use tracing::{info, warn};

/// Pause between consecutive invocations
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

/// What happened to one case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    pub case: BatchCase,
    /// Position in the run, starting at 1
    pub index: usize,
    pub exit_code: Option<i32>,
    pub summary_lines: Vec<String>,
    pub error: Option<String>,
}

impl CaseOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes of a whole run, in case order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<CaseOutcome>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Table of cases with exit code, summary size and status
    pub fn format_report(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["#", "Subject", "Industry", "Exit", "Summary", "Status"]);

        for outcome in &self.outcomes {
            let exit = outcome
                .exit_code
                .map_or_else(|| "-".to_string(), |c| c.to_string());
            let status = outcome.error.as_deref().unwrap_or("ok");
            table.add_row(vec![
                outcome.index.to_string(),
                outcome.case.subject.clone(),
                outcome.case.industry.clone(),
                exit,
                format!("{} lines", outcome.summary_lines.len()),
                status.to_string(),
            ]);
        }

        format!(
            "{table}\n{}/{} cases produced a summary",
            self.success_count(),
            self.outcomes.len()
        )
    }
}

/// Invokes each case once, in order, with a fixed pause in between
pub struct BatchRunner<I> {
    invoker: I,
    filter: SummaryFilter,
    delay: Duration,
}

impl<I: Invoker> BatchRunner<I> {
    pub fn new(invoker: I) -> Self {
        Self {
            invoker,
            filter: SummaryFilter::default(),
            delay: DEFAULT_DELAY,
        }
    }

    pub fn with_filter(mut self, filter: SummaryFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Run every case, writing each filtered summary to `sink`
    ///
    /// A failing case is logged and recorded; the remaining cases still run.
    pub async fn run<W: Write>(&self, cases: &[BatchCase], sink: &mut W) -> BatchReport {
        let mut report = BatchReport::default();

        for (i, case) in cases.iter().enumerate() {
            let index = i + 1;
            info!("Case {index}/{}: {}", cases.len(), case.subject);

            let outcome = self.run_case(index, case).await;
            for line in &outcome.summary_lines {
                if let Err(e) = writeln!(sink, "{line}") {
                    warn!("Could not write summary for {}: {e}", case.subject);
                    break;
                }
            }
            if let Err(e) = sink.flush() {
                warn!("Could not flush output: {e}");
            }
            report.outcomes.push(outcome);

            if index < cases.len() {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!(
            "Batch finished: {}/{} cases produced a summary",
            report.success_count(),
            cases.len()
        );
        report
    }

    async fn run_case(&self, index: usize, case: &BatchCase) -> CaseOutcome {
        let mut outcome = CaseOutcome {
            case: case.clone(),
            index,
            exit_code: None,
            summary_lines: Vec::new(),
            error: None,
        };

        let output = match self.invoker.invoke(case).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Case {index} ({}) failed: {e}", case.subject);
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };

        outcome.exit_code = output.exit_code;
        outcome.summary_lines = self.filter.apply(&output.stdout);

        if !output.succeeded() {
            let status = output
                .exit_code
                .map_or_else(|| "a signal".to_string(), |c| format!("status {c}"));
            warn!("Case {index} ({}) exited with {status}", case.subject);
            outcome.error = Some(format!("exited with {status}"));
        } else if outcome.summary_lines.is_empty() {
            warn!(
                "Case {index} ({}) printed no '{}' line",
                case.subject,
                self.filter.marker()
            );
            outcome.error = Some(format!("no '{}' in output", self.filter.marker()));
        }
        outcome
    }
}
