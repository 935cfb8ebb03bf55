//! Late acceptance local search engine.
//!
//! Each job runs on its own worker thread:
//! 1. **Construction**: every unassigned lesson is placed in the timeslot
//!    that gives the best total score at that point (first best wins).
//! 2. **Late acceptance**: random change moves (one lesson → another
//!    timeslot) and swap moves (two lessons exchange timeslots). A move is
//!    kept when its score is at least the current score or the score from
//!    `late_acceptance_size` steps ago.
//!
//! Every new best schedule is reported to the job's listener.
//!
//! # Reference
//! Burke & Bykov (2017), "The late acceptance hill-climbing heuristic",
//! European Journal of Operational Research 258(1)

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::{
    EngineError, EngineFactory, EventListener, JobId, SolverConfig, SolverEvent, SolverHandle,
    SolverStatus,
};
use crate::constraints::ConstraintSet;
use crate::models::{HardSoftScore, Schedule, Timeslot};
use crate::validation::{join_messages, validate_problem};

/// Factory for [`LocalSearchHandle`]s sharing one configuration.
#[derive(Debug, Clone, Default)]
pub struct LocalSearchEngine {
    config: SolverConfig,
}

impl LocalSearchEngine {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

impl EngineFactory for LocalSearchEngine {
    fn build(&self, constraints: ConstraintSet) -> Result<Arc<dyn SolverHandle>, EngineError> {
        info!(
            constraints = constraints.len(),
            late_acceptance_size = self.config.late_acceptance_size,
            "Building local search solver"
        );
        Ok(Arc::new(LocalSearchHandle::new(
            constraints,
            self.config.clone(),
        )))
    }
}

#[derive(Debug, Clone, Default)]
struct JobControl {
    stop: Arc<AtomicBool>,
    active: Arc<AtomicBool>,
}

/// Engine handle running one worker thread per job.
#[derive(Debug)]
pub struct LocalSearchHandle {
    constraints: Arc<ConstraintSet>,
    config: SolverConfig,
    jobs: Arc<DashMap<JobId, JobControl>>,
    closed: AtomicBool,
}

impl LocalSearchHandle {
    pub fn new(constraints: ConstraintSet, config: SolverConfig) -> Self {
        Self {
            constraints: Arc::new(constraints),
            config,
            jobs: Arc::new(DashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of jobs still running on this handle.
    pub fn running_jobs(&self) -> usize {
        self.jobs.len()
    }
}

impl SolverHandle for LocalSearchHandle {
    fn solve_and_listen(
        &self,
        job_id: JobId,
        problem: Schedule,
        listener: EventListener,
    ) -> Result<(), EngineError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(EngineError::Closed);
        }
        validate_problem(&problem).map_err(|e| EngineError::InvalidProblem(join_messages(&e)))?;

        let control = JobControl::default();
        match self.jobs.entry(job_id) {
            Entry::Occupied(_) => return Err(EngineError::DuplicateJob(job_id)),
            Entry::Vacant(slot) => {
                slot.insert(control.clone());
            }
        }

        let constraints = Arc::clone(&self.constraints);
        let config = self.config.clone();
        let jobs = Arc::clone(&self.jobs);
        let spawned = thread::Builder::new()
            .name(format!("solver-{job_id}"))
            .spawn(move || {
                control.active.store(true, Ordering::SeqCst);
                info!(
                    job_id = %job_id,
                    lessons = problem.lessons.len(),
                    timeslots = problem.timeslots.len(),
                    "Starting local search"
                );

                let on_best = |best: Schedule| listener(SolverEvent::BestSolutionChanged(best));
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    Search::new(&constraints, &config, &control.stop).run(problem, &on_best)
                }));

                jobs.remove(&job_id);
                match outcome {
                    Ok(summary) => {
                        let terminated_early = control.stop.load(Ordering::SeqCst);
                        info!(
                            job_id = %job_id,
                            steps = summary.steps,
                            score = %summary.best_score,
                            feasible = summary.best_score.is_feasible(),
                            terminated_early,
                            "Solving complete"
                        );
                        listener(SolverEvent::Finished { terminated_early });
                    }
                    Err(_) => {
                        warn!(job_id = %job_id, "Solver worker panicked");
                        listener(SolverEvent::Failed("solver worker panicked".to_string()));
                    }
                }
            });

        if let Err(e) = spawned {
            self.jobs.remove(&job_id);
            return Err(EngineError::WorkerSpawn(e.to_string()));
        }
        Ok(())
    }

    fn status(&self, job_id: JobId) -> SolverStatus {
        match self.jobs.get(&job_id) {
            Some(control) if control.active.load(Ordering::SeqCst) => SolverStatus::SolvingActive,
            Some(_) => SolverStatus::SolvingScheduled,
            None => SolverStatus::NotSolving,
        }
    }

    fn terminate_early(&self, job_id: JobId) -> bool {
        match self.jobs.get(&job_id) {
            Some(control) => {
                control.stop.store(true, Ordering::SeqCst);
                debug!(job_id = %job_id, "Termination requested");
                true
            }
            None => false,
        }
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!(running = self.jobs.len(), "Closed local search handle");
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }
}

// ======================== Search ========================

/// Result of one search run.
#[derive(Debug, Clone, Copy)]
struct SearchSummary {
    steps: u64,
    best_score: HardSoftScore,
}

#[derive(Debug, Clone, Copy)]
enum Move {
    /// Put lesson at `lesson` into timeslot `slot`.
    Change { lesson: usize, slot: usize },
    /// Exchange the timeslots of two lessons.
    Swap { a: usize, b: usize },
}

struct Search<'a> {
    constraints: &'a ConstraintSet,
    config: &'a SolverConfig,
    stop: &'a AtomicBool,
    rng: SmallRng,
    started: Instant,
}

impl<'a> Search<'a> {
    fn new(constraints: &'a ConstraintSet, config: &'a SolverConfig, stop: &'a AtomicBool) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            constraints,
            config,
            stop,
            rng,
            started: Instant::now(),
        }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn should_stop(&self, step: u64, unimproved: u64) -> bool {
        if self.stopped() {
            return true;
        }
        if self.config.step_limit.is_some_and(|limit| step >= limit) {
            return true;
        }
        if self
            .config
            .unimproved_step_limit
            .is_some_and(|limit| unimproved >= limit)
        {
            return true;
        }
        self.config
            .time_limit
            .is_some_and(|limit| self.started.elapsed() >= limit)
    }

    fn run(mut self, mut working: Schedule, on_best: &dyn Fn(Schedule)) -> SearchSummary {
        let mut current = self.construct(&mut working);
        working.score = Some(current);
        on_best(working.clone());

        let mut summary = SearchSummary {
            steps: 0,
            best_score: current,
        };
        if working.lessons.is_empty() || working.timeslots.is_empty() {
            return summary;
        }

        let mut history = vec![current; self.config.late_acceptance_size.max(1)];
        let mut unimproved = 0u64;
        while !self.should_stop(summary.steps, unimproved) {
            let mv = self.pick_move(&working);
            let undo = apply(&mut working, mv);
            let candidate = self.constraints.score(&working);

            let slot = (summary.steps % history.len() as u64) as usize;
            if candidate >= current || candidate >= history[slot] {
                current = candidate;
            } else {
                revert(&mut working, undo);
            }
            history[slot] = current;
            summary.steps += 1;

            if current > summary.best_score {
                summary.best_score = current;
                unimproved = 0;
                working.score = Some(current);
                debug!(step = summary.steps, score = %current, "New best solution");
                on_best(working.clone());
            } else {
                unimproved += 1;
            }
        }
        summary
    }

    /// Greedy placement of unassigned lessons. Returns the resulting score.
    fn construct(&self, working: &mut Schedule) -> HardSoftScore {
        let unassigned: Vec<usize> = working
            .lessons
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.is_assigned())
            .map(|(i, _)| i)
            .collect();

        for index in unassigned {
            if self.stopped() {
                break;
            }
            let mut best: Option<(HardSoftScore, usize)> = None;
            for slot in 0..working.timeslots.len() {
                let timeslot = working.timeslots[slot].clone();
                working.assign(index, Some(timeslot));
                let score = self.constraints.score(working);
                match best {
                    Some((s, _)) if score <= s => {}
                    _ => best = Some((score, slot)),
                }
            }
            let chosen = best.map(|(_, slot)| working.timeslots[slot].clone());
            working.assign(index, chosen);
        }
        self.constraints.score(working)
    }

    fn pick_move(&mut self, working: &Schedule) -> Move {
        let lessons = working.lessons.len();
        if lessons >= 2 && self.rng.random_bool(0.5) {
            let a = self.rng.random_range(0..lessons);
            let mut b = self.rng.random_range(0..lessons - 1);
            if b >= a {
                b += 1;
            }
            Move::Swap { a, b }
        } else {
            Move::Change {
                lesson: self.rng.random_range(0..lessons),
                slot: self.rng.random_range(0..working.timeslots.len()),
            }
        }
    }
}

type Undo = Vec<(usize, Option<Timeslot>)>;

fn apply(working: &mut Schedule, mv: Move) -> Undo {
    match mv {
        Move::Change { lesson, slot } => {
            let previous = working.lessons[lesson].timeslot.clone();
            let next = working.timeslots[slot].clone();
            working.assign(lesson, Some(next));
            vec![(lesson, previous)]
        }
        Move::Swap { a, b } => {
            let slot_a = working.lessons[a].timeslot.clone();
            let slot_b = working.lessons[b].timeslot.clone();
            working.assign(a, slot_b.clone());
            working.assign(b, slot_a.clone());
            vec![(a, slot_a), (b, slot_b)]
        }
    }
}

fn revert(working: &mut Schedule, undo: Undo) {
    for (lesson, timeslot) in undo {
        working.assign(lesson, timeslot);
    }
}
