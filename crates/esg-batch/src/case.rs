//! Cases the harness runs

use crate::error::{BatchError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One (subject, claim, industry) triple, passed to the program unmodified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCase {
    pub subject: String,
    pub claim: String,
    pub industry: String,
}

impl BatchCase {
    pub fn new(
        subject: impl Into<String>,
        claim: impl Into<String>,
        industry: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            claim: claim.into(),
            industry: industry.into(),
        }
    }

    /// The three positional arguments, in invocation order
    pub fn args(&self) -> [&str; 3] {
        [&self.subject, &self.claim, &self.industry]
    }
}

/// The six standard cases, in run order
pub fn default_cases() -> Vec<BatchCase> {
    vec![
        BatchCase::new(
            "BP",
            "BP is committed to achieving net zero emissions by 2050 and investing heavily in renewable energy",
            "Energy",
        ),
        BatchCase::new(
            "H&M",
            "H&M is committed to 100% sustainable fashion and eco-friendly materials across all collections",
            "Consumer Goods",
        ),
        BatchCase::new(
            "Volkswagen",
            "Volkswagen is leading the transition to sustainable mobility with zero-emission electric vehicles",
            "Automotive",
        ),
        BatchCase::new(
            "Coca-Cola",
            "Coca-Cola is committed to making 100% of its packaging recyclable globally by 2025",
            "Consumer Goods",
        ),
        BatchCase::new(
            "Microsoft",
            "Microsoft will be carbon negative by 2030 and remove all historical carbon emissions by 2050",
            "Technology",
        ),
        BatchCase::new(
            "Shell",
            "Shell is a leader in the energy transition, becoming a net-zero emissions energy business by 2050",
            "Energy",
        ),
    ]
}

/// Cases from a JSON array of `{subject, claim, industry}` objects
pub fn load_cases(path: &Path) -> Result<Vec<BatchCase>> {
    let text = fs::read_to_string(path)?;
    let cases: Vec<BatchCase> = serde_json::from_str(&text)?;
    if cases.is_empty() {
        return Err(BatchError::NoCases(path.to_path_buf()));
    }
    Ok(cases)
}
