use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::{MAX_ATTEMPTS, Phase};
use crate::error::GenerationError;
use crate::oracle::{Outcome, Verdict};
use crate::target::Target;

/// Fed back to the generator when the oracle rejects an artifact.
pub const VERIFY_FAILED: &str = "Parser test failed";

/// Prefix of the feedback when the backend produced nothing usable.
pub const GENERATION_FAILED: &str = "generation failed";

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The oracle passed the last artifact.
    Verified,
    /// The attempt budget ran out without a pass.
    Exhausted,
}

/// Iteration state for one run, owned by the controller.
///
/// Mutated only through the `record_*` handlers and
/// [`StateMachine::decide`](super::StateMachine::decide); each handler
/// applies its whole update at once.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    target: Target,
    candidate_source: Option<String>,
    last_error: Option<String>,
    verified: bool,
    pub(super) attempt_count: u32,
    phase: Phase,
    phase_history: Vec<Phase>,
    last_outcome: Option<Outcome>,
    started_at: DateTime<Utc>,
}

impl WorkflowState {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            candidate_source: None,
            last_error: None,
            verified: false,
            attempt_count: 0,
            phase: Phase::Generate,
            phase_history: Vec::new(),
            last_outcome: None,
            started_at: Utc::now(),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn candidate_source(&self) -> Option<&str> {
        self.candidate_source.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn verified(&self) -> bool {
        self.verified
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Move to `phase`, remembering the one we left. Entering the current
    /// phase again records nothing.
    pub(crate) fn enter(&mut self, phase: Phase) {
        if self.phase == phase {
            return;
        }
        self.phase_history.push(self.phase);
        self.phase = phase;
    }

    pub(crate) fn record_candidate(&mut self, source: String) {
        self.candidate_source = Some(source);
    }

    pub(crate) fn record_generation_failure(&mut self, err: &GenerationError) {
        self.verified = false;
        self.last_outcome = None;
        self.last_error = Some(format!("{GENERATION_FAILED}: {err}"));
    }

    /// Apply an oracle verdict. `report_limit` appends up to that many
    /// trailing characters of the suite report to the feedback.
    pub(crate) fn record_verdict(&mut self, verdict: &Verdict, report_limit: Option<usize>) {
        self.last_outcome = Some(verdict.outcome);
        if verdict.outcome == Outcome::Pass {
            self.verified = true;
            self.last_error = None;
        } else {
            self.verified = false;
            self.last_error = Some(verify_feedback(verdict, report_limit));
        }
    }
}

fn verify_feedback(verdict: &Verdict, report_limit: Option<usize>) -> String {
    let mut msg = match verdict.outcome {
        Outcome::Inconclusive => format!("{VERIFY_FAILED} (tests were skipped)"),
        _ => VERIFY_FAILED.to_string(),
    };
    if let Some(limit) = report_limit {
        let tail = tail_chars(&verdict.report, limit).trim();
        if !tail.is_empty() {
            msg.push('\n');
            msg.push_str(tail);
        }
    }
    msg
}

fn tail_chars(s: &str, n: usize) -> &str {
    let total = s.chars().count();
    if total <= n {
        return s;
    }
    let start = s
        .char_indices()
        .nth(total - n)
        .map_or(s.len(), |(idx, _)| idx);
    &s[start..]
}

/// Structured summary produced when a run terminates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub target: Target,
    pub termination: Termination,
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_outcome: Option<Outcome>,
    pub last_error: Option<String>,
    pub phase_history: Vec<Phase>,
    pub artifact_path: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl RunReport {
    pub fn from_state(state: &WorkflowState, artifact_path: Option<PathBuf>) -> Self {
        let now = Utc::now();
        let mut history = state.phase_history.clone();
        history.push(state.phase);

        Self {
            run_id: Uuid::new_v4().to_string(),
            target: state.target.clone(),
            termination: if state.verified {
                Termination::Verified
            } else {
                Termination::Exhausted
            },
            attempts: state.attempt_count,
            max_attempts: MAX_ATTEMPTS,
            last_outcome: state.last_outcome,
            last_error: state.last_error.clone(),
            phase_history: history,
            artifact_path,
            started_at: state.started_at,
            completed_at: now,
            duration_ms: (now - state.started_at).num_milliseconds(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.termination == Termination::Verified
    }
}
