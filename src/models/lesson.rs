//! Lesson (planning entity) and the read-only facts it references.
//!
//! A lesson is one weekly occurrence of a subject taught to a section by a
//! teacher. Its timeslot is the only field the optimizer may change; the
//! subject, teacher and section are facts for the duration of a solve.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Timeslot;

/// Subject difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyLevel {
    Low,
    Medium,
    High,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = String;

    /// Parses `Low`, `Medium` or `High`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!(
                "Subject difficulty should be Low, Medium or High, got '{s}'"
            )),
        }
    }
}

/// A subject taught in the school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Lab or workshop subject (wants double periods on weekdays).
    pub practical: bool,
    /// Classroom theory subject.
    pub theory: bool,
    /// Difficulty level.
    pub difficulty: DifficultyLevel,
}

impl Subject {
    /// Creates a medium-difficulty theory subject.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            practical: false,
            theory: true,
            difficulty: DifficultyLevel::Medium,
        }
    }

    /// Sets the subject name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks the subject as practical (and not theory).
    pub fn practical(mut self) -> Self {
        self.practical = true;
        self.theory = false;
        self
    }

    /// Sets the difficulty level.
    pub fn with_difficulty(mut self, difficulty: DifficultyLevel) -> Self {
        self.difficulty = difficulty;
        self
    }
}

/// A teacher. Only identity matters to scoring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Teacher {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// A section (student group). Only identity matters to scoring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Section {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// A schedulable lesson.
///
/// Created unassigned; the optimizer moves it between timeslots during
/// search. `timeslot == None` is a valid transient state but is always
/// penalized as a hard violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    /// Unique lesson identifier.
    pub id: String,
    /// Subject taught.
    pub subject: Subject,
    /// Teacher giving the lesson.
    pub teacher: Teacher,
    /// Section attending the lesson.
    pub section: Section,
    /// Assigned timeslot (planning variable).
    #[serde(default)]
    pub timeslot: Option<Timeslot>,
}

impl Lesson {
    /// Creates an unassigned lesson.
    pub fn new(id: impl Into<String>, subject: Subject, teacher: Teacher, section: Section) -> Self {
        Self {
            id: id.into(),
            subject,
            teacher,
            section,
            timeslot: None,
        }
    }

    /// Builder: assigns a timeslot.
    pub fn with_timeslot(mut self, timeslot: Timeslot) -> Self {
        self.timeslot = Some(timeslot);
        self
    }

    /// Whether a timeslot is assigned.
    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.timeslot.is_some()
    }

    /// Whether both lessons occupy the same timeslot.
    pub fn shares_timeslot_with(&self, other: &Lesson) -> bool {
        matches!((&self.timeslot, &other.timeslot), (Some(a), Some(b)) if a == b)
    }

    /// Whether `other` starts back-to-back after this lesson.
    ///
    /// Lessons in the identical slot are never back-to-back; that case
    /// belongs to the conflict rules.
    pub fn is_followed_by(&self, other: &Lesson) -> bool {
        match (&self.timeslot, &other.timeslot) {
            (Some(a), Some(b)) => a != b && a.is_followed_by(b),
            _ => false,
        }
    }
}
