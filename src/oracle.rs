//! Oracle runner: executes the fixed verification suite and classifies it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{error, info, instrument, warn};

use crate::target::Target;

/// Classification of one verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Pass,
    Fail,
    /// The suite exited cleanly but skipped checks. Never counts as a pass.
    Inconclusive,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => write!(f, "PASS"),
            Outcome::Fail => write!(f, "FAIL"),
            Outcome::Inconclusive => write!(f, "INCONCLUSIVE"),
        }
    }
}

/// Outcome plus the captured report the suite printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub outcome: Outcome,
    pub report: String,
}

impl Verdict {
    pub fn new(outcome: Outcome, report: impl Into<String>) -> Self {
        Self {
            outcome,
            report: report.into(),
        }
    }
}

pub trait Oracle {
    /// Evaluate whatever artifact is currently persisted for `target`.
    async fn verify(&self, target: &Target) -> Verdict;
}

/// Apply the classification policy to a finished suite run.
///
/// Non-zero exit is a failure; a clean exit whose output mentions skipped
/// tests is inconclusive; anything else passes.
pub fn classify(exit_success: bool, stdout: &str) -> Outcome {
    if !exit_success {
        Outcome::Fail
    } else if stdout.to_lowercase().contains("skipped") {
        Outcome::Inconclusive
    } else {
        Outcome::Pass
    }
}

/// Runs an external test command (pytest by default) from the current directory.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    command: Vec<String>,
}

impl CommandOracle {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    fn display_command(&self) -> String {
        self.command.join(" ")
    }
}

impl Oracle for CommandOracle {
    #[instrument(skip_all, fields(target = %target, command = %self.display_command()))]
    async fn verify(&self, target: &Target) -> Verdict {
        let Some((program, args)) = self.command.split_first() else {
            error!("empty oracle command");
            return Verdict::new(Outcome::Fail, "oracle command is empty");
        };

        let output = match Command::new(program).args(args).output().await {
            Ok(output) => output,
            Err(e) => {
                error!(err = %e, "failed to launch verification suite");
                return Verdict::new(
                    Outcome::Fail,
                    format!("could not run `{}`: {e}", self.display_command()),
                );
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let outcome = classify(output.status.success(), &stdout);
        match outcome {
            Outcome::Fail => {
                error!(exit_code = ?output.status.code(), "verification suite failed");
                error!("stdout:\n{stdout}");
                error!("stderr:\n{stderr}");
            }
            Outcome::Inconclusive => {
                warn!("verification suite skipped tests, treating as failure");
                warn!("output:\n{stdout}");
            }
            Outcome::Pass => {
                info!("verification suite passed");
                info!("output:\n{stdout}");
            }
        }

        Verdict::new(outcome, format_report(&stdout, &stderr))
    }
}

fn format_report(stdout: &str, stderr: &str) -> String {
    let mut buf = String::new();
    buf.push_str("=== stdout ===\n");
    buf.push_str(stdout);
    buf.push_str("\n=== stderr ===\n");
    buf.push_str(stderr);
    buf
}
