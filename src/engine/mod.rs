//! Optimization engine seam.
//!
//! The rest of the crate only talks to an engine through two traits:
//! an [`EngineFactory`] builds a [`SolverHandle`] for one constraint set,
//! and a handle runs solve jobs asynchronously, reporting progress through
//! a per-job listener.
//!
//! # Handle contract
//! - `solve_and_listen` returns immediately; the listener receives at least
//!   one [`SolverEvent::BestSolutionChanged`] before the terminal
//!   [`SolverEvent::Finished`] (or [`SolverEvent::Failed`]).
//! - `close` stops the handle accepting new jobs. Jobs already running
//!   keep running, keep reporting, and stay cancellable through it.
//! - Scores compare lexicographically, hard before soft.
//!
//! [`LocalSearchEngine`] is the bundled implementation.

mod config;
mod local_search;

pub use config::{SolverConfig, DEFAULT_LATE_ACCEPTANCE_SIZE, DEFAULT_TIME_LIMIT_SECS};
pub use local_search::{LocalSearchEngine, LocalSearchHandle};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::constraints::ConstraintSet;
use crate::models::Schedule;

/// Opaque solve job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// A fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Status of a job on an engine handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    /// Unknown to the handle, or finished.
    NotSolving,
    /// Accepted, worker not started yet.
    SolvingScheduled,
    /// Worker is searching.
    SolvingActive,
}

impl SolverStatus {
    /// The status as a SCREAMING_SNAKE_CASE string for API responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotSolving => "NOT_SOLVING",
            Self::SolvingScheduled => "SOLVING_SCHEDULED",
            Self::SolvingActive => "SOLVING_ACTIVE",
        }
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress notification for one job.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverEvent {
    /// A new best schedule (score filled in).
    BestSolutionChanged(Schedule),
    /// The job stopped; no more events follow.
    Finished { terminated_early: bool },
    /// The job aborted; no more events follow.
    Failed(String),
}

/// Per-job event callback, invoked on the engine's worker thread.
pub type EventListener = Arc<dyn Fn(SolverEvent) + Send + Sync>;

/// Engine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Solver handle is closed")]
    Closed,

    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Job {0} is already solving")]
    DuplicateJob(JobId),

    #[error("Solver build failed: {0}")]
    BuildFailed(String),

    #[error("Failed to start solver worker: {0}")]
    WorkerSpawn(String),
}

/// Builds engine handles for a constraint set.
pub trait EngineFactory: Send + Sync {
    fn build(&self, constraints: ConstraintSet) -> Result<Arc<dyn SolverHandle>, EngineError>;
}

/// A built engine instance.
pub trait SolverHandle: Send + Sync {
    /// Starts solving `problem` in the background.
    fn solve_and_listen(
        &self,
        job_id: JobId,
        problem: Schedule,
        listener: EventListener,
    ) -> Result<(), EngineError>;

    fn status(&self, job_id: JobId) -> SolverStatus;

    /// Requests cooperative termination. Returns whether the job was running.
    fn terminate_early(&self, job_id: JobId) -> bool;

    /// Stops accepting new jobs and releases idle resources.
    fn close(&self);

    fn is_closed(&self) -> bool;

    /// The constraint set this handle scores with.
    fn constraints(&self) -> &ConstraintSet;
}
