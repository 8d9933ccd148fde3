use std::path::PathBuf;

use thiserror::Error;

use crate::groq::GroqError;

/// Errors that end a run abnormally.
///
/// Verification failures and generation failures are not in here: the
/// controller absorbs those into its own retry loop.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Step limit of {limit} reached after {attempts} attempt(s)")]
    StepLimitExceeded { limit: u32, attempts: u32 },
}

/// The generator could not produce usable source text.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("backend call failed: {0}")]
    Backend(#[from] GroqError),

    #[error("backend returned no code")]
    EmptyResponse,
}

/// The artifact could not be written. Always fatal to the run.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot create artifact directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write artifact {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
