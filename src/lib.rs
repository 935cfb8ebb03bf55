//! School timetabling engine.
//!
//! Assigns lessons to weekly timeslots under hard and soft constraints whose
//! activation, kind and weight are read from operator-editable settings.
//! The active solver is rebuilt whenever the settings change, without
//! interrupting the solve jobs already running.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Timeslot`, `Lesson`, `Subject`, `Teacher`,
//!   `Section`, `Schedule`, `HardSoftScore`, `ConstraintSetting`
//! - **`constraints`**: The fourteen catalog rules and the settings-driven
//!   `ConstraintRegistry`
//! - **`analysis`**: Per-constraint score breakdown
//! - **`validation`**: Settings and problem integrity checks
//! - **`store`**: Settings storage and default seeding
//! - **`engine`**: Optimization engine seam and a late acceptance local search
//! - **`problem`**: Expands period timings and lesson demands into a problem
//! - **`solver`**: Solver lifecycle, job table and `TimetableService`
//!
//! # Architecture
//!
//! ```text
//! SettingsStore ──► ConstraintRegistry ──► EngineFactory ──► SolverHandle
//!                                                  ▲               │
//!                                          SolverLifecycle    SolverEvent
//!                                                  ▲               ▼
//!                              TimetableService ──► JobOrchestrator (job table)
//! ```
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Burke & Bykov (2017), "The late acceptance hill-climbing heuristic"

pub mod analysis;
pub mod constraints;
pub mod engine;
pub mod error;
pub mod models;
pub mod problem;
pub mod solver;
pub mod store;
pub mod validation;

pub use error::{Result, TimetableError};
