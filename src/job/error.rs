use super::models::{JobId, ValidationErrors};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job not found")]
    NotFound,

    #[error("Invalid job: {0}")]
    ValidationFailed(ValidationErrors),

    #[error("Job {id} was modified by someone else")]
    ConcurrencyConflict { id: JobId },

    #[error("Missing permission to edit jobs")]
    Unauthorized,

    #[error("Job store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl JobError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::NotFound => "not_found",
            JobError::ValidationFailed(_) => "invalid",
            JobError::ConcurrencyConflict { .. } => "conflict",
            JobError::Unauthorized => "unauthorized",
            JobError::Store(_) => "store_error",
        }
    }
}
