use thiserror::Error;

/// Errors surfaced by a sampling run.
///
/// Nothing is retried internally: a run either yields a complete summary or
/// fails with one of these.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("worker {worker} failed: {reason}")]
    GenerationFailure { worker: usize, reason: String },

    #[error("cannot summarize empty series `{label}`")]
    EmptySeries { label: String },
}

pub type Result<T> = std::result::Result<T, Error>;
