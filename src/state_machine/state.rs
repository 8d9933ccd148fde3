use std::fmt;

use serde::{Deserialize, Serialize};

use super::workflow::WorkflowState;

/// Attempt budget for one run. Each full generate/persist/verify cycle
/// consumes exactly one attempt.
pub const MAX_ATTEMPTS: u32 = 3;

/// The phases of the parser generation workflow.
///
/// Each attempt flows through: GENERATE → PERSIST → VERIFY → DECIDE, then
/// either back to GENERATE or on to TERMINATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Generate,
    Persist,
    Verify,
    Decide,
    Terminate,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Generate => write!(f, "GENERATE"),
            Phase::Persist => write!(f, "PERSIST"),
            Phase::Verify => write!(f, "VERIFY"),
            Phase::Decide => write!(f, "DECIDE"),
            Phase::Terminate => write!(f, "TERMINATE"),
        }
    }
}

/// What DECIDE concluded about the attempt that just finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Loop back to GENERATE, carrying the last error forward.
    Retry,
    /// Terminate: the artifact passed.
    Verified,
    /// Terminate: no attempts left.
    Exhausted,
}

impl Decision {
    /// The phase the workflow moves to after this decision.
    pub fn next_phase(self) -> Phase {
        match self {
            Decision::Retry => Phase::Generate,
            Decision::Verified | Decision::Exhausted => Phase::Terminate,
        }
    }
}

/// Drives a [`WorkflowState`] through DECIDE.
pub struct StateMachine;

impl StateMachine {
    /// Close out the current attempt.
    ///
    /// Increments the attempt counter exactly once, then terminates on a
    /// verified artifact or an exhausted budget and retries otherwise.
    pub fn decide(state: &mut WorkflowState) -> Decision {
        state.attempt_count += 1;
        if state.verified() {
            Decision::Verified
        } else if state.attempt_count >= MAX_ATTEMPTS {
            Decision::Exhausted
        } else {
            Decision::Retry
        }
    }
}
