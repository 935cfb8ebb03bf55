//! Timetabling service.
//!
//! The job API surface: solve jobs, constraint settings management and
//! solver configuration reloads behind one type.
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveTime;
//! use u_timetable::models::{Section, Subject, Teacher};
//! use u_timetable::problem::{LessonDemand, PeriodTiming, ProblemBuilder};
//! use u_timetable::solver::{ServiceConfig, TimetableService};
//!
//! let service = TimetableService::in_memory(ServiceConfig::default());
//!
//! let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
//! let problem = ProblemBuilder::new()
//!     .with_timing_group("day", vec![PeriodTiming::new(t(9), t(10)), PeriodTiming::new(t(10), t(11))])
//!     .with_demand(LessonDemand::new(Section::new("S1"), Subject::new("MATH"), Teacher::new("T1"), 3))
//!     .build();
//!
//! let job = service.submit_job(problem).unwrap();
//! let latest = service.get_job(job).unwrap();
//! println!("{}: {:?}", latest.job_id, latest.schedule.score);
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::ScoreAnalysis;
use crate::constraints::{CatalogRule, ConstraintRegistry};
use crate::engine::{EngineFactory, JobId, LocalSearchEngine, SolverConfig};
use crate::error::{Result, TimetableError};
use crate::models::{ConstraintDraft, ConstraintSetting, Schedule};
use crate::solver::{JobOrchestrator, JobSnapshot, SolverInfo, SolverLifecycle};
use crate::store::{seed_default_settings, InMemorySettingsStore, SettingsStore};
use crate::validation::{prepare_setting, validate_weight};

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Engine settings used by [`TimetableService::with_local_search`].
    pub solver: SolverConfig,
    /// Longest wait for a replaced handle to close.
    pub teardown_timeout: Duration,
    /// Reload the solver after each successful settings change.
    pub reload_on_change: bool,
    /// Insert the default catalog rows at startup.
    pub seed_defaults: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            teardown_timeout: Duration::from_secs(5),
            reload_on_change: true,
            seed_defaults: true,
        }
    }
}

impl ServiceConfig {
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_teardown_timeout(mut self, timeout: Duration) -> Self {
        self.teardown_timeout = timeout;
        self
    }

    pub fn with_reload_on_change(mut self, reload: bool) -> Self {
        self.reload_on_change = reload;
        self
    }

    pub fn with_seed_defaults(mut self, seed: bool) -> Self {
        self.seed_defaults = seed;
        self
    }
}

/// Enabled/disabled split of the stored settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintOverview {
    pub enabled: Vec<String>,
    pub disabled: Vec<String>,
    pub total: usize,
    pub solver_info: String,
}

/// Solve jobs and constraint settings over one settings store.
pub struct TimetableService {
    config: ServiceConfig,
    store: Arc<dyn SettingsStore>,
    lifecycle: Arc<SolverLifecycle>,
    jobs: JobOrchestrator,
    /// Serializes read-validate-save sequences on the store.
    writes: Mutex<()>,
}

impl TimetableService {
    /// Creates the service and installs the first solver.
    ///
    /// A failing first build is logged; the next call that needs a solver
    /// tries again.
    pub fn new(
        store: Arc<dyn SettingsStore>,
        factory: Arc<dyn EngineFactory>,
        config: ServiceConfig,
    ) -> Self {
        if config.seed_defaults {
            seed_default_settings(store.as_ref());
        }
        let registry = ConstraintRegistry::new(Arc::clone(&store));
        let lifecycle = Arc::new(SolverLifecycle::new(
            factory,
            registry,
            config.teardown_timeout,
        ));
        if let Err(e) = lifecycle.reload() {
            warn!(error = %e, "Initial solver build failed");
        }

        Self {
            jobs: JobOrchestrator::new(Arc::clone(&lifecycle)),
            writes: Mutex::new(()),
            config,
            store,
            lifecycle,
        }
    }

    /// Service backed by the local search engine.
    pub fn with_local_search(store: Arc<dyn SettingsStore>, config: ServiceConfig) -> Self {
        let factory = Arc::new(LocalSearchEngine::new(config.solver.clone()));
        Self::new(store, factory, config)
    }

    /// Local search over a fresh in-memory store.
    pub fn in_memory(config: ServiceConfig) -> Self {
        Self::with_local_search(Arc::new(InMemorySettingsStore::new()), config)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ======================== Jobs ========================

    /// Starts solving `problem` and returns its job id immediately.
    pub fn submit_job(&self, problem: Schedule) -> Result<JobId> {
        self.jobs.submit(problem)
    }

    /// Latest schedule of a job.
    pub fn get_job(&self, job_id: JobId) -> Result<JobSnapshot> {
        self.jobs.get(job_id)
    }

    /// Stops a job early and returns its last schedule.
    pub fn cancel_job(&self, job_id: JobId) -> Result<JobSnapshot> {
        self.jobs.cancel(job_id)
    }

    /// Forgets a job, stopping it first if it is still running.
    pub fn remove_job(&self, job_id: JobId) -> Result<()> {
        self.jobs.remove(job_id)
    }

    pub fn list_jobs(&self) -> Vec<JobId> {
        self.jobs.list_jobs()
    }

    // ======================== Solver ========================

    /// Rebuilds the solver from the stored settings.
    ///
    /// Running jobs keep going on the handle they started on.
    pub fn reload_configuration(&self) -> Result<()> {
        self.lifecycle.reload()
    }

    pub fn solver_info(&self) -> SolverInfo {
        self.lifecycle.info()
    }

    /// Score breakdown of `schedule` under the active constraints.
    pub fn analyze(&self, schedule: &Schedule) -> Result<ScoreAnalysis> {
        let handle = self.lifecycle.current()?;
        Ok(ScoreAnalysis::calculate(schedule, handle.constraints()))
    }

    /// Closes the active solver. Running jobs finish on their own.
    pub fn shutdown(&self) {
        self.lifecycle.shutdown();
    }

    // ======================== Settings ========================

    pub fn list_constraints(&self) -> Vec<ConstraintSetting> {
        self.store.list_all()
    }

    /// Creates or updates a setting.
    ///
    /// # Errors
    /// - [`TimetableError::ConstraintNotFound`] if the draft names an id
    ///   that has no row
    /// - [`TimetableError::InvalidSetting`] with every validation issue
    pub fn upsert_constraint(&self, draft: &ConstraintDraft) -> Result<ConstraintSetting> {
        let saved = {
            let _writes = self.writes.lock();
            if let Some(id) = draft.id {
                if self.store.find_by_id(id).is_none() {
                    return Err(TimetableError::ConstraintNotFound(id));
                }
            }
            let existing = self.store.list_all();
            let setting = prepare_setting(draft, &existing)?;
            self.store.save(setting)
        };
        info!(
            id = saved.id,
            name = %saved.name,
            kind = %saved.kind,
            weight = saved.weight,
            enabled = saved.enabled,
            "Saved constraint setting"
        );
        self.after_change();
        Ok(saved)
    }

    pub fn toggle_constraint(&self, id: u64, enabled: bool) -> Result<ConstraintSetting> {
        let saved = {
            let _writes = self.writes.lock();
            let mut setting = self.find(id)?;
            setting.enabled = enabled;
            self.store.save(setting)
        };
        info!(id, name = %saved.name, enabled, "Toggled constraint");
        self.after_change();
        Ok(saved)
    }

    pub fn update_constraint_weight(&self, id: u64, weight: i64) -> Result<ConstraintSetting> {
        let saved = {
            let _writes = self.writes.lock();
            let mut setting = self.find(id)?;
            setting.weight = validate_weight(weight)?;
            self.store.save(setting)
        };
        info!(id, name = %saved.name, weight = saved.weight, "Updated constraint weight");
        self.after_change();
        Ok(saved)
    }

    /// Deletes a custom setting. Catalog rows are forbidden.
    pub fn delete_constraint(&self, id: u64) -> Result<()> {
        let setting = {
            let _writes = self.writes.lock();
            let setting = self.find(id)?;
            if CatalogRule::is_reserved(&setting.name) {
                warn!(id, name = %setting.name, "Refusing to delete core constraint");
                return Err(TimetableError::CoreConstraint(setting.name));
            }
            if !self.store.delete_by_id(id) {
                return Err(TimetableError::ConstraintNotFound(id));
            }
            setting
        };
        info!(id, name = %setting.name, "Deleted constraint setting");
        self.after_change();
        Ok(())
    }

    pub fn constraint_overview(&self) -> ConstraintOverview {
        let settings = self.store.list_all();
        let (enabled, disabled): (Vec<_>, Vec<_>) = settings.iter().partition(|s| s.enabled);
        ConstraintOverview {
            enabled: enabled.into_iter().map(|s| s.name.clone()).collect(),
            disabled: disabled.into_iter().map(|s| s.name.clone()).collect(),
            total: settings.len(),
            solver_info: self.lifecycle.info().to_string(),
        }
    }

    fn find(&self, id: u64) -> Result<ConstraintSetting> {
        self.store
            .find_by_id(id)
            .ok_or(TimetableError::ConstraintNotFound(id))
    }

    /// A failed reload never fails the mutation that triggered it.
    fn after_change(&self) {
        if !self.config.reload_on_change {
            return;
        }
        if let Err(e) = self.lifecycle.reload() {
            warn!(error = %e, "Settings saved but solver reload failed");
        }
    }
}

impl Drop for TimetableService {
    fn drop(&mut self) {
        self.lifecycle.shutdown();
    }
}
