//! Running the analysis program for one case

use crate::case::BatchCase;
use crate::error::{BatchError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Captured result of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaseOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
}

impl CaseOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs the analysis program for a case
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, case: &BatchCase) -> Result<CaseOutput>;
}

/// Program invoked as `command leading_args... subject claim industry`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSpec {
    pub command: String,
    pub leading_args: Vec<String>,
}

impl ProgramSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Full argument list for a case
    pub fn args_for<'a>(&'a self, case: &'a BatchCase) -> Vec<&'a str> {
        self.leading_args
            .iter()
            .map(String::as_str)
            .chain(case.args())
            .collect()
    }
}

/// Spawns the program as a child process
///
/// Stdout is captured for filtering; stderr passes through so progress logs
/// of the child stay visible.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    program: ProgramSpec,
}

impl ProcessInvoker {
    pub fn new(program: ProgramSpec) -> Self {
        Self { program }
    }

    pub fn program(&self) -> &ProgramSpec {
        &self.program
    }
}

#[async_trait]
impl Invoker for ProcessInvoker {
    async fn invoke(&self, case: &BatchCase) -> Result<CaseOutput> {
        let args = self.program.args_for(case);
        debug!("Running {} {:?}", self.program.command, args);

        let mut command = Command::new(&self.program.command);
        command.args(&args);
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::inherit());
        command.kill_on_drop(true);

        let output = command.output().await.map_err(|source| BatchError::Spawn {
            command: self.program.command.clone(),
            source,
        })?;

        Ok(CaseOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm() -> BatchCase {
        BatchCase::new("H&M", "100% sustainable fashion", "Consumer Goods")
    }

    #[test]
    fn test_args_follow_leading_args() {
        let program = ProgramSpec::new("esg-detector").with_args(["analyze"]);
        assert_eq!(
            program.args_for(&hm()),
            vec!["analyze", "H&M", "100% sustainable fashion", "Consumer Goods"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_receives_arguments_unmodified() {
        let program = ProgramSpec::new("sh").with_args([
            "-c",
            r#"printf '%s|%s|%s\n' "$1" "$2" "$3"; exit 3"#,
            "sh",
        ]);
        let output = ProcessInvoker::new(program).invoke(&hm()).await.unwrap();

        assert_eq!(output.stdout, "H&M|100% sustainable fashion|Consumer Goods\n");
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.succeeded());
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let invoker = ProcessInvoker::new(ProgramSpec::new("esg-detector-does-not-exist"));
        let err = invoker.invoke(&hm()).await.unwrap_err();
        assert!(matches!(err, BatchError::Spawn { .. }));
    }
}
