//! Solver orchestration.
//!
//! - [`SolverLifecycle`]: owns the active engine handle and hot-swaps it
//!   on configuration reloads
//! - [`JobOrchestrator`]: job ids and the concurrent job table
//! - [`TimetableService`]: the job API surface over both, plus settings
//!   management

mod jobs;
mod lifecycle;
mod service;
#[cfg(test)]
pub(crate) mod testing;

pub use jobs::{JobOrchestrator, JobPhase, JobSnapshot};
pub use lifecycle::{SolverInfo, SolverLifecycle};
pub use service::{ConstraintOverview, ServiceConfig, TimetableService};
