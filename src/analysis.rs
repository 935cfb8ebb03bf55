//! Score analysis.
//!
//! Breaks a schedule's score down per active constraint, with the
//! individual matches that justify each contribution.
//!
//! # Report
//!
//! | Field | Definition |
//! |-------|-----------|
//! | score | Sum of every constraint's contribution |
//! | feasible | `score.hard >= 0` |
//! | unassigned | Lessons without a timeslot |
//! | constraints | One summary per active constraint, in set order |

use serde::{Deserialize, Serialize};

use crate::constraints::{ConstraintMatch, ConstraintSet};
use crate::models::{ConstraintKind, HardSoftScore, Schedule};

/// Contribution of one constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSummary {
    pub name: String,
    pub kind: ConstraintKind,
    pub weight: u32,
    /// Weighted, signed contribution.
    pub score: HardSoftScore,
    /// Number of matches.
    pub match_count: usize,
    pub matches: Vec<ConstraintMatch>,
}

/// Score breakdown of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreAnalysis {
    pub score: HardSoftScore,
    pub feasible: bool,
    pub unassigned: usize,
    pub constraints: Vec<ConstraintSummary>,
}

impl ScoreAnalysis {
    /// Analyzes `schedule` against `constraints`.
    pub fn calculate(schedule: &Schedule, constraints: &ConstraintSet) -> Self {
        let summaries: Vec<ConstraintSummary> = constraints
            .constraints
            .iter()
            .map(|c| {
                let matches = c.matches(schedule);
                ConstraintSummary {
                    name: c.name.clone(),
                    kind: c.kind,
                    weight: c.weight,
                    score: matches.iter().map(|m| m.score).sum(),
                    match_count: matches.len(),
                    matches,
                }
            })
            .collect();

        let score: HardSoftScore = summaries.iter().map(|s| s.score).sum();
        Self {
            score,
            feasible: score.is_feasible(),
            unassigned: schedule.unassigned_count(),
            constraints: summaries,
        }
    }

    /// Summary for one constraint.
    pub fn constraint(&self, name: &str) -> Option<&ConstraintSummary> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Constraints with at least one match.
    pub fn violated(&self) -> impl Iterator<Item = &ConstraintSummary> {
        self.constraints.iter().filter(|c| c.match_count > 0)
    }
}
