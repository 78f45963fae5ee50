//! Core abstractions for the ESG greenwashing detector
//!
//! This crate defines the shared analysis state that flows through every
//! agent, the records agents append to it, and the [`Agent`] trait the
//! workflow drives.

pub mod agent;
pub mod error;
pub mod output;
pub mod state;
pub mod text;
pub mod verdict;

pub use agent::Agent;
pub use error::{Error, Result};
pub use output::AgentOutput;
pub use state::{EsgState, Evidence, Relationship, RiskLevel, SourceType, WorkflowPath};
pub use verdict::{IntelligenceSource, Verdict};
