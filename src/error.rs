//! Crate error type.

use thiserror::Error;

use crate::engine::{EngineError, JobId};
use crate::validation::{join_messages, ValidationError};

/// Errors returned by the timetabling service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimetableError {
    /// A settings draft failed validation; every issue is listed.
    #[error("{}", join_messages(.0))]
    InvalidSetting(Vec<ValidationError>),

    /// Catalog rules cannot be deleted.
    #[error("Cannot delete core constraint: {0}")]
    CoreConstraint(String),

    #[error("Constraint not found: {0}")]
    ConstraintNotFound(u64),

    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    /// The job's latest state is a failure.
    #[error("Solving failed for job {job_id}: {cause}")]
    SolveFailed { job_id: JobId, cause: String },

    /// The solver could not be rebuilt; the previous one stays active.
    #[error("Solver reload failed: {0}")]
    ReloadFailed(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<Vec<ValidationError>> for TimetableError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::InvalidSetting(errors)
    }
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, TimetableError>;
