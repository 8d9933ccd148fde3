mod state;
mod workflow;

pub use state::{Decision, MAX_ATTEMPTS, Phase, StateMachine};
pub use workflow::{RunReport, Termination, VERIFY_FAILED, WorkflowState};
