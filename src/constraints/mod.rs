//! Scoring constraints for timetables.
//!
//! Provides the fourteen catalog rules and the weighted, ordered
//! constraint set an engine scores schedules with.
//!
//! # Usage
//!
//! ```
//! use u_timetable::constraints::{ActiveConstraint, CatalogRule, ConstraintSet};
//! use u_timetable::models::Schedule;
//!
//! let set = ConstraintSet::new()
//!     .with_constraint(ActiveConstraint::catalog(CatalogRule::TeacherConflict))
//!     .with_constraint(ActiveConstraint::catalog(CatalogRule::NoFreeTimeslots));
//!
//! let score = set.score(&Schedule::new());
//! assert!(score.is_feasible());
//! ```
//!
//! # Dispatch
//! Rule selection is a tagged union ([`ConstraintImpl`]) resolved by name
//! in the [`registry`], not trait objects: unknown names get a generic
//! placeholder rule in the requested band.

mod catalog;
pub mod registry;

pub use catalog::{
    CatalogRule, RuleMatch, MAX_DAILY_LESSONS_PER_TEACHER, MAX_PRACTICAL_DAYS_PER_WEEK,
    MAX_WEEKLY_LOW_DIFFICULTY_LESSONS,
};
pub use registry::ConstraintRegistry;

use serde::{Deserialize, Serialize};

use crate::models::{ConstraintKind, HardSoftScore, Schedule};

/// The implementation behind an active constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintImpl {
    /// A named catalog rule.
    Catalog(CatalogRule),
    /// Placeholder hard rule: penalizes every unassigned lesson.
    CustomHard,
    /// Placeholder soft rule: rewards every assigned lesson.
    CustomSoft,
}

impl ConstraintImpl {
    /// Whether matches add to the score.
    pub fn is_reward(&self) -> bool {
        match self {
            Self::Catalog(rule) => rule.is_reward(),
            Self::CustomHard => false,
            Self::CustomSoft => true,
        }
    }

    /// Unweighted matches against `schedule`.
    pub fn evaluate(&self, schedule: &Schedule) -> Vec<RuleMatch> {
        match self {
            Self::Catalog(rule) => rule.evaluate(schedule),
            Self::CustomHard => schedule
                .lessons
                .iter()
                .filter(|l| !l.is_assigned())
                .map(|l| RuleMatch {
                    lesson_ids: vec![l.id.clone()],
                    units: 1,
                    justification: format!("lesson {} has no timeslot", l.id),
                })
                .collect(),
            Self::CustomSoft => schedule
                .assigned_lessons()
                .map(|l| RuleMatch {
                    lesson_ids: vec![l.id.clone()],
                    units: 1,
                    justification: format!("lesson {} is assigned", l.id),
                })
                .collect(),
        }
    }
}

/// One justified score contribution of an active constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintMatch {
    /// Constraint name.
    pub constraint: String,
    /// Score band.
    pub kind: ConstraintKind,
    /// Weighted, signed contribution.
    pub score: HardSoftScore,
    /// Lessons involved.
    pub lesson_ids: Vec<String>,
    /// Justification.
    pub description: String,
}

/// A constraint ready to score schedules: a rule plus its band and weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveConstraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub weight: u32,
    pub rule: ConstraintImpl,
}

impl ActiveConstraint {
    /// A catalog rule with its default band and weight.
    pub fn catalog(rule: CatalogRule) -> Self {
        Self {
            name: rule.name().to_string(),
            kind: rule.default_kind(),
            weight: rule.default_weight(),
            rule: ConstraintImpl::Catalog(rule),
        }
    }

    /// Overrides the band.
    pub fn with_kind(mut self, kind: ConstraintKind) -> Self {
        self.kind = kind;
        self
    }

    /// Overrides the weight.
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Score of `units` points in this constraint's band, signed and weighted.
    fn points(&self, units: i64) -> HardSoftScore {
        let magnitude = units * i64::from(self.weight);
        let signed = if self.rule.is_reward() {
            magnitude
        } else {
            -magnitude
        };
        match self.kind {
            ConstraintKind::Hard => HardSoftScore::of_hard(signed),
            ConstraintKind::Soft => HardSoftScore::of_soft(signed),
        }
    }

    /// Total contribution to the score of `schedule`.
    pub fn score(&self, schedule: &Schedule) -> HardSoftScore {
        let units: i64 = self.rule.evaluate(schedule).iter().map(|m| m.units).sum();
        self.points(units)
    }

    /// Justified contributions to the score of `schedule`.
    pub fn matches(&self, schedule: &Schedule) -> Vec<ConstraintMatch> {
        self.rule
            .evaluate(schedule)
            .into_iter()
            .map(|m| ConstraintMatch {
                constraint: self.name.clone(),
                kind: self.kind,
                score: self.points(m.units),
                lesson_ids: m.lesson_ids,
                description: m.justification,
            })
            .collect()
    }
}

/// Ordered list of active constraints.
///
/// Immutable once handed to an engine; a reload builds a new set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSet {
    pub constraints: Vec<ActiveConstraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// All fourteen catalog rules with default bands and weights.
    pub fn catalog_defaults() -> Self {
        Self {
            constraints: CatalogRule::ALL
                .into_iter()
                .map(ActiveConstraint::catalog)
                .collect(),
        }
    }

    pub fn with_constraint(mut self, constraint: ActiveConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Constraint names in evaluation order.
    pub fn names(&self) -> Vec<String> {
        self.constraints.iter().map(|c| c.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ActiveConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Total score of `schedule`.
    pub fn score(&self, schedule: &Schedule) -> HardSoftScore {
        self.constraints.iter().map(|c| c.score(schedule)).sum()
    }

    /// Every justified contribution, in constraint order.
    pub fn matches(&self, schedule: &Schedule) -> Vec<ConstraintMatch> {
        self.constraints
            .iter()
            .flat_map(|c| c.matches(schedule))
            .collect()
    }
}
