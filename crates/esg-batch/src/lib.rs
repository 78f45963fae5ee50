//! Batch harness for the ESG greenwashing detector
//!
//! Runs an analysis program once per [`BatchCase`], in order, and prints only
//! the executive summary of each run: the marker line and the ten lines after
//! it. Runs are paced with a fixed delay that is skipped after the last case.
//!
//! ```no_run
//! use esg_batch::{BatchRunner, ProcessInvoker, ProgramSpec, default_cases};
//!
//! # async fn example() {
//! let program = ProgramSpec::new("esg-detector").with_args(["analyze"]);
//! let runner = BatchRunner::new(ProcessInvoker::new(program));
//! let report = runner.run(&default_cases(), &mut std::io::stdout()).await;
//! eprintln!("{}", report.format_report());
//! # }
//! ```

pub mod case;
pub mod error;
pub mod filter;
pub mod invoker;
pub mod runner;

pub use case::{BatchCase, default_cases, load_cases};
pub use error::{BatchError, Result};
pub use filter::SummaryFilter;
pub use invoker::{CaseOutput, Invoker, ProcessInvoker, ProgramSpec};
pub use runner::{BatchReport, BatchRunner, CaseOutcome, DEFAULT_DELAY};
