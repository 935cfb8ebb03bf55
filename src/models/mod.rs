//! Timetabling domain models.
//!
//! Provides the data types for representing school timetabling problems
//! and their solutions, plus the stored settings rows that configure the
//! scoring rules.
//!
//! # Domain Mappings
//!
//! | u-timetable | Role in optimization |
//! |-------------|----------------------|
//! | Timeslot | Value range element |
//! | Lesson | Planning entity (timeslot is the planning variable) |
//! | Subject / Teacher / Section | Problem facts |
//! | Schedule | Solution (value range + entities + score) |
//! | ConstraintSetting | Scoring configuration |

mod constraint;
mod lesson;
mod schedule;
mod score;
pub(crate) mod timeslot;

pub use constraint::{ConstraintDraft, ConstraintKind, ConstraintSetting};
pub use lesson::{DifficultyLevel, Lesson, Section, Subject, Teacher};
pub use schedule::Schedule;
pub use score::HardSoftScore;
pub use timeslot::{Timeslot, ADJACENCY_WINDOW_MINUTES};
