//! Schedule (solution) model.
//!
//! A schedule bundles the timeslot value range, the lessons to place, and
//! the score of the current assignment. One schedule is built per solve
//! request; it is both the unit of optimization and the unit returned to
//! the caller.

use serde::{Deserialize, Serialize};

use super::{HardSoftScore, Lesson, Timeslot};

/// A timetable: value range + planning entities + score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// All timeslots a lesson may be assigned to.
    pub timeslots: Vec<Timeslot>,
    /// Lessons to assign.
    pub lessons: Vec<Lesson>,
    /// Score of the current assignment. `None` until evaluated.
    #[serde(default)]
    pub score: Option<HardSoftScore>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schedule from a value range and lessons.
    pub fn with_parts(timeslots: Vec<Timeslot>, lessons: Vec<Lesson>) -> Self {
        Self {
            timeslots,
            lessons,
            score: None,
        }
    }

    /// Builder: adds a timeslot.
    pub fn with_timeslot(mut self, timeslot: Timeslot) -> Self {
        self.timeslots.push(timeslot);
        self
    }

    /// Builder: adds a lesson.
    pub fn with_lesson(mut self, lesson: Lesson) -> Self {
        self.lessons.push(lesson);
        self
    }

    /// Finds a lesson by ID.
    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }

    /// Finds a timeslot by ID.
    pub fn timeslot(&self, timeslot_id: &str) -> Option<&Timeslot> {
        self.timeslots.iter().find(|t| t.id == timeslot_id)
    }

    /// Assigns (or clears) the timeslot of the lesson at `index`.
    ///
    /// Invalidates the stored score.
    pub fn assign(&mut self, index: usize, timeslot: Option<Timeslot>) {
        if let Some(lesson) = self.lessons.get_mut(index) {
            lesson.timeslot = timeslot;
            self.score = None;
        }
    }

    /// Lessons with a timeslot.
    pub fn assigned_lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons.iter().filter(|l| l.is_assigned())
    }

    /// Number of lessons without a timeslot.
    pub fn unassigned_count(&self) -> usize {
        self.lessons.iter().filter(|l| !l.is_assigned()).count()
    }

    /// All lessons taught by a teacher.
    pub fn lessons_for_teacher(&self, teacher_id: &str) -> Vec<&Lesson> {
        self.lessons
            .iter()
            .filter(|l| l.teacher.id == teacher_id)
            .collect()
    }

    /// All lessons attended by a section.
    pub fn lessons_for_section(&self, section_id: &str) -> Vec<&Lesson> {
        self.lessons
            .iter()
            .filter(|l| l.section.id == section_id)
            .collect()
    }

    /// Number of lessons.
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    /// Whether a score has been computed and it has no hard violations.
    pub fn is_feasible(&self) -> bool {
        self.score.is_some_and(|s| s.is_feasible())
    }
}
