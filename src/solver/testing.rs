//! Scripted engine for lifecycle and job tests.
//!
//! Handles never search on their own; tests push events to a job's
//! listener explicitly, so interleavings are deterministic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::constraints::ConstraintSet;
use crate::engine::{
    EngineError, EngineFactory, EventListener, JobId, SolverEvent, SolverHandle, SolverStatus,
};
use crate::models::Schedule;

#[derive(Default)]
pub(crate) struct ScriptedFactory {
    built: Mutex<Vec<Arc<ScriptedHandle>>>,
    pub fail_builds: AtomicBool,
}

impl ScriptedFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn build_count(&self) -> usize {
        self.built.lock().len()
    }

    pub fn latest(&self) -> Arc<ScriptedHandle> {
        let built = self.built.lock();
        Arc::clone(&built[built.len() - 1])
    }
}

impl EngineFactory for ScriptedFactory {
    fn build(&self, constraints: ConstraintSet) -> Result<Arc<dyn SolverHandle>, EngineError> {
        if self.fail_builds.load(Ordering::SeqCst) {
            return Err(EngineError::BuildFailed("scripted build failure".into()));
        }
        let handle = Arc::new(ScriptedHandle::new(constraints));
        self.built.lock().push(Arc::clone(&handle));
        let handle: Arc<dyn SolverHandle> = handle;
        Ok(handle)
    }
}

struct ScriptedJob {
    problem: Schedule,
    listener: EventListener,
    running: bool,
}

type Hook = Box<dyn FnOnce() + Send>;

pub(crate) struct ScriptedHandle {
    constraints: ConstraintSet,
    jobs: Mutex<HashMap<JobId, ScriptedJob>>,
    closed: AtomicBool,
    before_submit: Mutex<Option<Hook>>,
}

impl ScriptedHandle {
    fn new(constraints: ConstraintSet) -> Self {
        Self {
            constraints,
            jobs: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
            before_submit: Mutex::new(None),
        }
    }

    /// Runs `hook` at the start of the next `solve_and_listen` call.
    pub fn before_next_submit(&self, hook: impl FnOnce() + Send + 'static) {
        *self.before_submit.lock() = Some(Box::new(hook));
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn job_ids(&self) -> Vec<JobId> {
        self.jobs.lock().keys().copied().collect()
    }

    fn listener(&self, job_id: JobId) -> Option<EventListener> {
        self.jobs.lock().get(&job_id).map(|j| Arc::clone(&j.listener))
    }

    /// Delivers an arbitrary event.
    pub fn emit(&self, job_id: JobId, event: SolverEvent) {
        if let Some(listener) = self.listener(job_id) {
            listener(event);
        }
    }

    /// Delivers a scored improvement derived from the submitted problem.
    pub fn improve(&self, job_id: JobId, edit: impl FnOnce(&mut Schedule)) {
        let problem = self.jobs.lock().get(&job_id).map(|j| j.problem.clone());
        if let Some(mut schedule) = problem {
            edit(&mut schedule);
            schedule.score = Some(self.constraints.score(&schedule));
            self.emit(job_id, SolverEvent::BestSolutionChanged(schedule));
        }
    }

    /// Ends the job as converged.
    pub fn finish(&self, job_id: JobId) {
        if let Some(job) = self.jobs.lock().get_mut(&job_id) {
            job.running = false;
        }
        self.emit(job_id, SolverEvent::Finished { terminated_early: false });
    }
}

impl SolverHandle for ScriptedHandle {
    fn solve_and_listen(
        &self,
        job_id: JobId,
        problem: Schedule,
        listener: EventListener,
    ) -> Result<(), EngineError> {
        let hook = self.before_submit.lock().take();
        if let Some(hook) = hook {
            hook();
        }
        if self.closed.load(Ordering::SeqCst) {
            return Err(EngineError::Closed);
        }
        self.jobs.lock().insert(
            job_id,
            ScriptedJob {
                problem,
                listener,
                running: true,
            },
        );
        Ok(())
    }

    fn status(&self, job_id: JobId) -> SolverStatus {
        match self.jobs.lock().get(&job_id) {
            Some(job) if job.running => SolverStatus::SolvingActive,
            _ => SolverStatus::NotSolving,
        }
    }

    fn terminate_early(&self, job_id: JobId) -> bool {
        let was_running = match self.jobs.lock().get_mut(&job_id) {
            Some(job) => std::mem::replace(&mut job.running, false),
            None => false,
        };
        if was_running {
            self.emit(job_id, SolverEvent::Finished { terminated_early: true });
        }
        was_running
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }
}
