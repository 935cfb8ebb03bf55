//! Job orchestrator.
//!
//! Gives each solve request a stable id and non-blocking access to its
//! latest schedule.
//!
//! # Job states
//!
//! ```text
//! Submitted ──► Solving ──► TerminatedEarly
//!     │            │
//!     │            ├──────► Converged
//!     └────────────┴──────► Failed
//! ```
//!
//! Terminal phases are final: notifications arriving after one are dropped.
//! Every notification is applied as a single per-key update of the job
//! table, so readers see either the previous or the next state.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::{EngineError, EventListener, JobId, SolverEvent, SolverHandle, SolverStatus};
use crate::error::{Result, TimetableError};
use crate::models::Schedule;
use crate::solver::SolverLifecycle;

/// Progress of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobPhase {
    /// Recorded, no improvement received yet.
    Submitted,
    /// At least one improvement received.
    Solving,
    /// Stopped on request.
    TerminatedEarly,
    /// Stopped by the engine's own termination.
    Converged,
    Failed,
}

impl JobPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::TerminatedEarly | Self::Converged | Self::Failed)
    }
}

/// What is stored under a job id.
#[derive(Debug, Clone)]
enum JobState {
    Solution(Schedule),
    Failed(String),
}

struct JobEntry {
    /// Handle the job was started on; survives reloads. Released once the
    /// engine reports the job finished or failed.
    handle: Option<Arc<dyn SolverHandle>>,
    state: JobState,
    phase: JobPhase,
    lesson_count: usize,
}

/// Latest known state of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub schedule: Schedule,
    pub status: SolverStatus,
    pub phase: JobPhase,
}

/// Concurrent job table in front of the active engine handle.
pub struct JobOrchestrator {
    lifecycle: Arc<SolverLifecycle>,
    jobs: Arc<DashMap<JobId, JobEntry>>,
}

impl JobOrchestrator {
    pub fn new(lifecycle: Arc<SolverLifecycle>) -> Self {
        Self {
            lifecycle,
            jobs: Arc::new(DashMap::new()),
        }
    }

    /// Records `problem` under a fresh id and starts solving it.
    ///
    /// Returns as soon as the engine has accepted the job. If the handle
    /// was closed by a concurrent reload, the job is retried once on the
    /// newly installed handle.
    pub fn submit(&self, problem: Schedule) -> Result<JobId> {
        let job_id = JobId::new();
        let mut handle = self.lifecycle.current()?;

        self.jobs.insert(
            job_id,
            JobEntry {
                handle: Some(Arc::clone(&handle)),
                state: JobState::Solution(problem.clone()),
                phase: JobPhase::Submitted,
                lesson_count: problem.lesson_count(),
            },
        );

        let mut result = handle.solve_and_listen(job_id, problem.clone(), self.listener(job_id));
        if matches!(result, Err(EngineError::Closed)) {
            debug!(job_id = %job_id, "Handle closed during submit, retrying on current");
            handle = match self.lifecycle.current() {
                Ok(handle) => handle,
                Err(e) => {
                    self.jobs.remove(&job_id);
                    return Err(e);
                }
            };
            if let Some(mut entry) = self.jobs.get_mut(&job_id) {
                entry.handle = Some(Arc::clone(&handle));
            }
            result = handle.solve_and_listen(job_id, problem, self.listener(job_id));
        }

        if let Err(e) = result {
            self.jobs.remove(&job_id);
            warn!(job_id = %job_id, error = %e, "Job rejected by engine");
            return Err(e.into());
        }
        info!(job_id = %job_id, "Job submitted");
        Ok(job_id)
    }

    /// Latest schedule of a job.
    ///
    /// # Errors
    /// - [`TimetableError::JobNotFound`] for an unknown id
    /// - [`TimetableError::SolveFailed`] if the job's last state is a failure
    pub fn get(&self, job_id: JobId) -> Result<JobSnapshot> {
        let (handle, state, phase) = {
            let entry = self
                .jobs
                .get(&job_id)
                .ok_or(TimetableError::JobNotFound(job_id))?;
            (entry.handle.clone(), entry.state.clone(), entry.phase)
        };

        match state {
            JobState::Failed(cause) => Err(TimetableError::SolveFailed { job_id, cause }),
            JobState::Solution(schedule) => Ok(JobSnapshot {
                job_id,
                schedule,
                status: handle.map_or(SolverStatus::NotSolving, |h| h.status(job_id)),
                phase,
            }),
        }
    }

    /// Requests early termination and returns the last known schedule.
    ///
    /// The job is marked terminated before the engine is signalled, so any
    /// improvement still in flight is not applied.
    pub fn cancel(&self, job_id: JobId) -> Result<JobSnapshot> {
        let handle = {
            let mut entry = self
                .jobs
                .get_mut(&job_id)
                .ok_or(TimetableError::JobNotFound(job_id))?;
            if !entry.phase.is_terminal() {
                entry.phase = JobPhase::TerminatedEarly;
            }
            entry.handle.clone()
        };

        let signalled = handle.is_some_and(|h| h.terminate_early(job_id));
        info!(job_id = %job_id, signalled, "Job cancelled");
        self.get(job_id)
    }

    /// Forgets a job, stopping it first if it is still running.
    pub fn remove(&self, job_id: JobId) -> Result<()> {
        let (_, entry) = self
            .jobs
            .remove(&job_id)
            .ok_or(TimetableError::JobNotFound(job_id))?;
        if let Some(handle) = entry.handle {
            handle.terminate_early(job_id);
        }
        info!(job_id = %job_id, phase = ?entry.phase, "Job removed");
        Ok(())
    }

    /// Ids of every known job, sorted.
    pub fn list_jobs(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = self.jobs.iter().map(|e| *e.key()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn listener(&self, job_id: JobId) -> EventListener {
        let jobs = Arc::clone(&self.jobs);
        Arc::new(move |event| apply_event(&jobs, job_id, event))
    }
}

/// Applies one engine notification to the job table.
fn apply_event(jobs: &DashMap<JobId, JobEntry>, job_id: JobId, event: SolverEvent) {
    let Some(mut entry) = jobs.get_mut(&job_id) else {
        return;
    };
    if matches!(event, SolverEvent::Finished { .. } | SolverEvent::Failed(_)) {
        entry.handle = None;
    }
    if entry.phase.is_terminal() {
        debug!(job_id = %job_id, phase = ?entry.phase, "Ignoring event for finished job");
        return;
    }

    match event {
        SolverEvent::BestSolutionChanged(schedule) => {
            if schedule.lesson_count() != entry.lesson_count {
                let cause = format!(
                    "Improved schedule has {} lessons, expected {}",
                    schedule.lesson_count(),
                    entry.lesson_count
                );
                warn!(job_id = %job_id, cause = %cause, "Rejecting improvement");
                entry.state = JobState::Failed(cause);
                entry.phase = JobPhase::Failed;
                return;
            }
            if let Some(score) = schedule.score {
                debug!(job_id = %job_id, score = %score, "New best solution");
            }
            entry.state = JobState::Solution(schedule);
            entry.phase = JobPhase::Solving;
        }
        SolverEvent::Finished { terminated_early } => {
            entry.phase = if terminated_early {
                JobPhase::TerminatedEarly
            } else {
                JobPhase::Converged
            };
            info!(job_id = %job_id, phase = ?entry.phase, "Job finished");
        }
        SolverEvent::Failed(cause) => {
            warn!(job_id = %job_id, cause = %cause, "Job failed");
            entry.state = JobState::Failed(cause);
            entry.phase = JobPhase::Failed;
        }
    }
}
