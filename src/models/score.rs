//! Hard/soft score.
//!
//! Scores compare lexicographically: any hard difference outranks every
//! soft difference. Higher is better; penalties are negative, rewards
//! positive. A schedule is feasible when its hard part is zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Two-level score. Field order drives the derived `Ord`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HardSoftScore {
    pub hard: i64,
    pub soft: i64,
}

impl HardSoftScore {
    pub const ZERO: Self = Self { hard: 0, soft: 0 };
    pub const ONE_HARD: Self = Self { hard: 1, soft: 0 };
    pub const ONE_SOFT: Self = Self { hard: 0, soft: 1 };

    pub fn of(hard: i64, soft: i64) -> Self {
        Self { hard, soft }
    }

    pub fn of_hard(hard: i64) -> Self {
        Self { hard, soft: 0 }
    }

    pub fn of_soft(soft: i64) -> Self {
        Self { hard: 0, soft }
    }

    /// No hard violations.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.hard >= 0
    }

    /// Multiplies both levels.
    pub fn scaled(self, factor: i64) -> Self {
        Self {
            hard: self.hard * factor,
            soft: self.soft * factor,
        }
    }
}

impl Add for HardSoftScore {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            hard: self.hard + rhs.hard,
            soft: self.soft + rhs.soft,
        }
    }
}

impl AddAssign for HardSoftScore {
    fn add_assign(&mut self, rhs: Self) {
        self.hard += rhs.hard;
        self.soft += rhs.soft;
    }
}

impl Sub for HardSoftScore {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            hard: self.hard - rhs.hard,
            soft: self.soft - rhs.soft,
        }
    }
}

impl Neg for HardSoftScore {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            hard: -self.hard,
            soft: -self.soft,
        }
    }
}

impl Sum for HardSoftScore {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for HardSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hard/{}soft", self.hard, self.soft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_outranks_soft() {
        let feasible_poor = HardSoftScore::of(0, -1000);
        let infeasible_great = HardSoftScore::of(-1, 1000);
        assert!(feasible_poor > infeasible_great);
        assert!(HardSoftScore::of(0, 2) > HardSoftScore::of(0, 1));
    }

    #[test]
    fn test_arithmetic() {
        let mut s = HardSoftScore::of(-2, 5);
        s += -HardSoftScore::ONE_HARD.scaled(3);
        assert_eq!(s, HardSoftScore::of(-5, 5));
        assert_eq!(s - HardSoftScore::ONE_SOFT, HardSoftScore::of(-5, 4));

        let total: HardSoftScore = vec![HardSoftScore::ONE_SOFT; 4].into_iter().sum();
        assert_eq!(total, HardSoftScore::of_soft(4));
    }

    #[test]
    fn test_display_and_feasibility() {
        assert_eq!(HardSoftScore::of(-1, 3).to_string(), "-1hard/3soft");
        assert!(HardSoftScore::of_soft(-10).is_feasible());
        assert!(!HardSoftScore::of_hard(-1).is_feasible());
    }
}
