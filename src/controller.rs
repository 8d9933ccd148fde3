use std::path::PathBuf;

use tracing::{error, info, instrument, warn};

use crate::error::AgentError;
use crate::generator::CodeGenerator;
use crate::oracle::Oracle;
use crate::state_machine::{
    Decision, MAX_ATTEMPTS, Phase, RunReport, StateMachine, Termination, VERIFY_FAILED,
    WorkflowState,
};
use crate::store::ArtifactStore;
use crate::target::Target;
use crate::ui::ProgressSink;

/// Default ceiling on GENERATE entries per run.
pub const DEFAULT_STEP_LIMIT: u32 = 10;

/// Drives one target through generate → persist → verify until the oracle
/// passes or the attempt budget runs out.
pub struct WorkflowController<G, S, O> {
    generator: G,
    store: S,
    oracle: O,
    step_limit: u32,
    report_limit: Option<usize>,
}

impl<G, S, O> WorkflowController<G, S, O>
where
    G: CodeGenerator,
    S: ArtifactStore,
    O: Oracle,
{
    pub fn new(generator: G, store: S, oracle: O) -> Self {
        Self {
            generator,
            store,
            oracle,
            step_limit: DEFAULT_STEP_LIMIT,
            report_limit: None,
        }
    }

    /// Hard cap on GENERATE entries, independent of [`MAX_ATTEMPTS`].
    pub fn with_step_limit(mut self, step_limit: u32) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// When set, the tail of the oracle report (up to `limit` chars) is
    /// appended to the feedback sent to the next generation.
    pub fn with_report_feedback(mut self, limit: Option<usize>) -> Self {
        self.report_limit = limit;
        self
    }

    /// Run the workflow for `target` to termination.
    ///
    /// Verification and generation failures are absorbed into the retry
    /// loop. Only a storage failure or hitting the step limit returns `Err`.
    #[instrument(skip_all, fields(target = %target))]
    pub async fn run(
        &self,
        target: Target,
        progress: &impl ProgressSink,
    ) -> Result<RunReport, AgentError> {
        let mut state = WorkflowState::new(target);
        let mut artifact_path: Option<PathBuf> = None;
        let mut generate_entries = 0u32;
        info!(max_attempts = MAX_ATTEMPTS, step_limit = self.step_limit, "starting run");

        loop {
            if generate_entries >= self.step_limit {
                error!(step_limit = self.step_limit, "step limit reached, aborting run");
                return Err(AgentError::StepLimitExceeded {
                    limit: self.step_limit,
                    attempts: state.attempt_count(),
                });
            }
            generate_entries += 1;
            let attempt = state.attempt_count() + 1;

            // GENERATE
            state.enter(Phase::Generate);
            progress.phase(Phase::Generate, attempt);
            let generated = self
                .generator
                .generate(state.target(), state.last_error())
                .await;
            match generated {
                Ok(source) => {
                    state.record_candidate(source);

                    // PERSIST
                    state.enter(Phase::Persist);
                    progress.phase(Phase::Persist, attempt);
                    let source = state.candidate_source().unwrap_or_default();
                    let path = self.store.save(state.target(), source).map_err(|err| {
                        error!(attempt, err = %err, "cannot persist artifact");
                        err
                    })?;
                    artifact_path = Some(path);

                    // VERIFY
                    state.enter(Phase::Verify);
                    progress.phase(Phase::Verify, attempt);
                    let verdict = self.oracle.verify(state.target()).await;
                    info!(attempt, outcome = %verdict.outcome, "verification finished");
                    state.record_verdict(&verdict, self.report_limit);
                }
                Err(err) => {
                    warn!(attempt, err = %err, "generation failed");
                    state.record_generation_failure(&err);
                }
            }

            // DECIDE
            state.enter(Phase::Decide);
            progress.phase(Phase::Decide, attempt);
            let decision = StateMachine::decide(&mut state);
            state.enter(decision.next_phase());

            match decision {
                Decision::Retry => {
                    let reason = state.last_error().unwrap_or(VERIFY_FAILED);
                    info!(attempt = state.attempt_count(), "retrying");
                    progress.retry(state.attempt_count(), MAX_ATTEMPTS, reason);
                }
                Decision::Verified => {
                    info!(attempts = state.attempt_count(), "parser verified");
                    progress.finished(Termination::Verified, state.attempt_count());
                    break;
                }
                Decision::Exhausted => {
                    warn!(attempts = state.attempt_count(), "attempt budget exhausted");
                    progress.finished(Termination::Exhausted, state.attempt_count());
                    break;
                }
            }
        }

        Ok(RunReport::from_state(&state, artifact_path))
    }
}
