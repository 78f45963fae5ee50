//! Command-line interface for the ESG greenwashing detector
//!
//! # Usage
//!
//! ```bash
//! # Configure at least one LLM provider (or put these in .env)
//! export GROQ_API_KEY="..."
//! export NEWS_API_KEY="..."
//!
//! # Analyse one claim
//! esg-detector analyze "BP" "Net zero by 2050" "Energy"
//!
//! # Run the six standard cases and print their executive summaries
//! esg-detector batch
//!
//! # Prompt for claims
//! esg-detector interactive
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use esg_batch::{BatchRunner, ProcessInvoker, ProgramSpec, SummaryFilter, default_cases, load_cases};
use esg_utils::{LogOptions, Settings};
use esg_workflow::Detector;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "esg-detector", version)]
#[command(about = "Multi-agent greenwashing risk analysis for corporate ESG claims", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse one ESG claim
    Analyze {
        /// Company name
        subject: String,
        /// Claim text to verify
        claim: String,
        /// Industry label, detected from the company name when omitted
        industry: Option<String>,
        #[command(flatten)]
        reports: ReportArgs,
    },
    /// Run the analysis program over a fixed case list, printing only summaries
    Batch(BatchArgs),
    /// Prompt for companies and claims until told to quit
    Interactive {
        #[command(flatten)]
        reports: ReportArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct ReportArgs {
    /// Do not write report files
    #[arg(long)]
    no_save: bool,

    /// Directory for report files (overrides REPORTS_DIR)
    #[arg(long)]
    reports_dir: Option<PathBuf>,
}

impl ReportArgs {
    fn resolve(&self, settings: &Settings) -> Option<PathBuf> {
        if self.no_save {
            None
        } else {
            Some(
                self.reports_dir
                    .clone()
                    .unwrap_or_else(|| settings.reports_dir.clone()),
            )
        }
    }

    /// The same options as arguments for a child `analyze`
    fn forwarded(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.no_save {
            args.push("--no-save".to_string());
        }
        if let Some(dir) = &self.reports_dir {
            args.push("--reports-dir".to_string());
            args.push(dir.display().to_string());
        }
        args
    }
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Seconds to wait between cases
    #[arg(long, default_value_t = 5)]
    delay_secs: u64,

    /// Analysis program to run instead of this binary's `analyze`
    #[arg(long)]
    program: Option<String>,

    /// Argument placed before the case arguments (repeatable)
    #[arg(long = "program-arg", allow_hyphen_values = true)]
    program_args: Vec<String>,

    /// JSON file with an array of {subject, claim, industry} cases
    #[arg(long)]
    cases: Option<PathBuf>,

    /// Lines to keep after the EXECUTIVE SUMMARY marker
    #[arg(long, default_value_t = esg_batch::filter::DEFAULT_CONTEXT_LINES)]
    context_lines: usize,

    #[command(flatten)]
    reports: ReportArgs,
}

impl BatchArgs {
    fn program(&self) -> anyhow::Result<ProgramSpec> {
        if let Some(program) = &self.program {
            return Ok(ProgramSpec::new(program.clone()).with_args(self.program_args.clone()));
        }
        let exe = std::env::current_exe().context("cannot locate the esg-detector binary")?;
        // Claims such as "-40% emissions by 2030" must stay positional
        Ok(ProgramSpec::new(exe.display().to_string())
            .with_args(["analyze".to_string()])
            .with_args(self.reports.forwarded())
            .with_args(self.program_args.clone())
            .with_args(["--"]))
    }
}

fn detector(reports: &ReportArgs) -> anyhow::Result<Detector> {
    let settings = Settings::from_env()?;
    settings
        .validate()
        .context("set GROQ_API_KEY or GEMINI_API_KEY (environment or .env)")?;
    let reports_dir = reports.resolve(&settings);
    Ok(Detector::from_settings(&settings)?.with_reports_dir(reports_dir))
}

async fn run_batch(args: BatchArgs) -> anyhow::Result<()> {
    let cases = match &args.cases {
        Some(path) => load_cases(path)?,
        None => default_cases(),
    };
    let program = args.program()?;
    info!("Running {} cases with {}", cases.len(), program.command);

    let runner = BatchRunner::new(ProcessInvoker::new(program))
        .with_filter(SummaryFilter::new(
            esg_batch::filter::DEFAULT_MARKER,
            args.context_lines,
        ))
        .with_delay(Duration::from_secs(args.delay_secs));

    let report = runner.run(&cases, &mut io::stdout()).await;
    eprintln!("{}", report.format_report());
    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

async fn run_interactive(reports: &ReportArgs) -> anyhow::Result<()> {
    let detector = detector(reports)?;
    let rule = "=".repeat(80);

    loop {
        println!("\n{rule}");
        println!("🌱 ESG GREENWASHING DETECTOR - Interactive Mode");
        println!("{rule}");

        let Some(company) = prompt("\n🏢 Enter company name (or 'quit' to exit): ")? else {
            break;
        };
        if matches!(company.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }
        if company.is_empty() {
            println!("❌ Company name cannot be empty");
            continue;
        }

        let Some(claim) = prompt("📋 Enter ESG claim to verify: ")? else {
            break;
        };
        if claim.is_empty() {
            println!("❌ Claim cannot be empty");
            continue;
        }

        let industry = prompt("🏭 Enter industry (or press Enter to auto-detect): ")?
            .filter(|i| !i.is_empty());

        if let Err(e) = detector.analyze(&company, &claim, industry.as_deref()).await {
            println!("\n❌ Analysis failed: {e}");
        }

        let again = prompt("\n\n🔄 Analyze another company? (y/n): ")?;
        if again.as_deref().map(str::to_lowercase).as_deref() != Some("y") {
            break;
        }
    }

    println!("\n👋 Thank you for using ESG Greenwashing Detector!");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    esg_utils::init_tracing_with(LogOptions {
        verbose: cli.verbose,
        json: cli.log_json,
    });

    match cli.command {
        Command::Analyze {
            subject,
            claim,
            industry,
            reports,
        } => {
            let detector = detector(&reports)?;
            detector
                .analyze(&subject, &claim, industry.as_deref())
                .await?;
        }
        Command::Batch(args) => run_batch(args).await?,
        Command::Interactive { reports } => run_interactive(&reports).await?,
    }
    Ok(())
}
