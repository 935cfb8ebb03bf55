//! Problem preparation.
//!
//! Turns school period timings and weekly lesson demands into an unsolved
//! [`Schedule`].
//!
//! # Expansion
//!
//! 1. For each timing group, for each working day, for each period:
//!    one timeslot, ids `TS1, TS2, ...` in that order, tagged with the
//!    group name.
//! 2. For each demand, `lessons_per_week` unassigned lessons, ids
//!    `L1, L2, ...` in demand order.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::{Lesson, Schedule, Section, Subject, Teacher, Timeslot};

/// Default working days: Monday to Friday.
pub const DEFAULT_WORKING_DAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// One teaching period within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTiming {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl PeriodTiming {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

/// A named set of daily periods (e.g. a morning or an evening shift).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingGroup {
    pub name: String,
    pub periods: Vec<PeriodTiming>,
}

/// How many lessons of a subject a section gets per week, and from whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDemand {
    pub section: Section,
    pub subject: Subject,
    pub teacher: Teacher,
    pub lessons_per_week: u32,
}

impl LessonDemand {
    pub fn new(section: Section, subject: Subject, teacher: Teacher, lessons_per_week: u32) -> Self {
        Self {
            section,
            subject,
            teacher,
            lessons_per_week,
        }
    }
}

/// Builder for unsolved schedules.
///
/// # Example
///
/// ```
/// use chrono::NaiveTime;
/// use u_timetable::models::{Section, Subject, Teacher};
/// use u_timetable::problem::{LessonDemand, PeriodTiming, ProblemBuilder};
///
/// let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
/// let schedule = ProblemBuilder::new()
///     .with_timing_group("day", vec![PeriodTiming::new(t(9), t(10)), PeriodTiming::new(t(10), t(11))])
///     .with_demand(LessonDemand::new(Section::new("S1"), Subject::new("MATH"), Teacher::new("T1"), 4))
///     .build();
///
/// assert_eq!(schedule.timeslots.len(), 10); // 2 periods × 5 days
/// assert_eq!(schedule.lessons.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemBuilder {
    pub timing_groups: Vec<TimingGroup>,
    pub working_days: Vec<Weekday>,
    pub demands: Vec<LessonDemand>,
}

impl Default for ProblemBuilder {
    fn default() -> Self {
        Self {
            timing_groups: Vec::new(),
            working_days: DEFAULT_WORKING_DAYS.to_vec(),
            demands: Vec::new(),
        }
    }
}

impl ProblemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a timing group.
    pub fn with_timing_group(mut self, name: impl Into<String>, periods: Vec<PeriodTiming>) -> Self {
        self.timing_groups.push(TimingGroup {
            name: name.into(),
            periods,
        });
        self
    }

    /// Replaces the working days.
    pub fn with_working_days(mut self, days: Vec<Weekday>) -> Self {
        self.working_days = days;
        self
    }

    pub fn with_demand(mut self, demand: LessonDemand) -> Self {
        self.demands.push(demand);
        self
    }

    /// Expands timings and demands into an unsolved schedule.
    pub fn build(&self) -> Schedule {
        let mut timeslots = Vec::new();
        for group in &self.timing_groups {
            for &day in &self.working_days {
                for period in &group.periods {
                    let id = format!("TS{}", timeslots.len() + 1);
                    timeslots.push(
                        Timeslot::new(id, day, period.start, period.end)
                            .with_timing_group(group.name.clone()),
                    );
                }
            }
        }

        let mut lessons = Vec::new();
        for demand in &self.demands {
            for _ in 0..demand.lessons_per_week {
                let id = format!("L{}", lessons.len() + 1);
                lessons.push(Lesson::new(
                    id,
                    demand.subject.clone(),
                    demand.teacher.clone(),
                    demand.section.clone(),
                ));
            }
        }

        Schedule::with_parts(timeslots, lessons)
    }
}
