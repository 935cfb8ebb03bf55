//! Built-in timetabling rules.
//!
//! # Categories
//!
//! - **Hard**: teacher conflict, section conflict, unassigned lesson,
//!   teacher daily workload, back-to-back same subject
//! - **Flexible** (soft): three consecutive periods, practical double periods
//! - **Soft**: teacher time efficiency, practical placement and spread,
//!   low-difficulty limits, high-priority theory
//!
//! # Evaluation Convention
//! Every rule is a pure function of a [`Schedule`] returning unweighted
//! [`RuleMatch`]es. Whether a match is a penalty or a reward is a property
//! of the rule ([`CatalogRule::is_reward`]); the weight and score band are
//! applied by the owning [`ActiveConstraint`](super::ActiveConstraint).
//!
//! Rules other than [`CatalogRule::NoFreeTimeslots`] only look at assigned
//! lessons. Groups are kept in ordered maps so the match order is stable.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::{ConstraintKind, DifficultyLevel, Lesson, Schedule};

/// Lessons per teacher per day before the workload rule kicks in.
pub const MAX_DAILY_LESSONS_PER_TEACHER: usize = 5;

/// Lessons per section per low-difficulty subject per week.
pub const MAX_WEEKLY_LOW_DIFFICULTY_LESSONS: usize = 2;

/// Distinct days a practical subject may use per section per week.
pub const MAX_PRACTICAL_DAYS_PER_WEEK: usize = 2;

/// One unweighted contribution of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMatch {
    /// Lessons that justify the match.
    pub lesson_ids: Vec<String>,
    /// Number of points before weighting (always positive).
    pub units: i64,
    /// Human-readable justification.
    pub justification: String,
}

impl RuleMatch {
    fn new(lessons: &[&Lesson], units: i64, justification: String) -> Self {
        Self {
            lesson_ids: lessons.iter().map(|l| l.id.clone()).collect(),
            units,
            justification,
        }
    }
}

/// The fourteen named catalog rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CatalogRule {
    TeacherConflict,
    StudentGroupConflict,
    NoFreeTimeslots,
    TeacherDailyWorkloadLimit,
    NoBackToBackSameSubject,
    TeacherNoThreeConsecutive,
    PracticalSubjectConsecutivePeriods,
    TeacherTimeEfficiency,
    PracticalSubjectsWeekdaysOnly,
    OnePracticalPerDayPerSection,
    PracticalSubjectTwoDaysPerWeek,
    LowDifficultySubjectWeeklyLimit,
    LowDifficultyOncePerDay,
    PreferHighPriorityTheory,
}

impl CatalogRule {
    /// All rules in catalog order.
    pub const ALL: [CatalogRule; 14] = [
        Self::TeacherConflict,
        Self::StudentGroupConflict,
        Self::NoFreeTimeslots,
        Self::TeacherDailyWorkloadLimit,
        Self::NoBackToBackSameSubject,
        Self::TeacherNoThreeConsecutive,
        Self::PracticalSubjectConsecutivePeriods,
        Self::TeacherTimeEfficiency,
        Self::PracticalSubjectsWeekdaysOnly,
        Self::OnePracticalPerDayPerSection,
        Self::PracticalSubjectTwoDaysPerWeek,
        Self::LowDifficultySubjectWeeklyLimit,
        Self::LowDifficultyOncePerDay,
        Self::PreferHighPriorityTheory,
    ];

    /// Rule name as stored in settings rows.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TeacherConflict => "teacherConflict",
            Self::StudentGroupConflict => "studentGroupConflict",
            Self::NoFreeTimeslots => "noFreeTimeslots",
            Self::TeacherDailyWorkloadLimit => "teacherDailyWorkloadLimit",
            Self::NoBackToBackSameSubject => "noBackToBackSameSubject",
            Self::TeacherNoThreeConsecutive => "teacherNoThreeConsecutive",
            Self::PracticalSubjectConsecutivePeriods => "practicalSubjectConsecutivePeriods",
            Self::TeacherTimeEfficiency => "teacherTimeEfficiency",
            Self::PracticalSubjectsWeekdaysOnly => "practicalSubjectsWeekdaysOnly",
            Self::OnePracticalPerDayPerSection => "onePracticalPerDayPerSection",
            Self::PracticalSubjectTwoDaysPerWeek => "practicalSubjectTwoDaysPerWeek",
            Self::LowDifficultySubjectWeeklyLimit => "lowDifficultySubjectWeeklyLimit",
            Self::LowDifficultyOncePerDay => "lowDifficultyOncePerDay",
            Self::PreferHighPriorityTheory => "preferHighPriorityTheory",
        }
    }

    /// Looks a rule up by exact name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    /// Whether `name` belongs to a catalog rule (reserved names).
    pub fn is_reserved(name: &str) -> bool {
        Self::from_name(name).is_some()
    }

    /// Score band used when seeding defaults.
    pub fn default_kind(&self) -> ConstraintKind {
        match self {
            Self::TeacherConflict
            | Self::StudentGroupConflict
            | Self::NoFreeTimeslots
            | Self::TeacherDailyWorkloadLimit
            | Self::NoBackToBackSameSubject => ConstraintKind::Hard,
            _ => ConstraintKind::Soft,
        }
    }

    /// Weight used when seeding defaults or when a row carries weight 0.
    pub fn default_weight(&self) -> u32 {
        1
    }

    /// Rewards add to the score; everything else subtracts.
    pub fn is_reward(&self) -> bool {
        matches!(
            self,
            Self::TeacherTimeEfficiency | Self::PreferHighPriorityTheory
        )
    }

    /// Seed description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::TeacherConflict => {
                "Prevents a teacher from being assigned to more than one lesson in the same timeslot."
            }
            Self::StudentGroupConflict => {
                "Prevents a section from attending more than one lesson in the same timeslot."
            }
            Self::NoFreeTimeslots => "Every lesson must be assigned to a timeslot.",
            Self::TeacherDailyWorkloadLimit => "Limits each teacher to a maximum of 5 lessons per day.",
            Self::NoBackToBackSameSubject => {
                "Prevents the same subject from being taught back-to-back to the same section."
            }
            Self::TeacherNoThreeConsecutive => {
                "Discourages teachers from teaching three consecutive periods."
            }
            Self::PracticalSubjectConsecutivePeriods => {
                "Practical subjects should be scheduled as a double period on the same day."
            }
            Self::TeacherTimeEfficiency => {
                "Rewards back-to-back lessons for a teacher to minimize idle gaps."
            }
            Self::PracticalSubjectsWeekdaysOnly => "Practical subjects should not be scheduled on Saturday.",
            Self::OnePracticalPerDayPerSection => "A section should have at most one practical lesson per day.",
            Self::PracticalSubjectTwoDaysPerWeek => {
                "A practical subject should be spread over at most two days per week."
            }
            Self::LowDifficultySubjectWeeklyLimit => {
                "Limits low-difficulty subjects to two lessons per week per section."
            }
            Self::LowDifficultyOncePerDay => {
                "A low-difficulty subject should appear at most once per day for a section."
            }
            Self::PreferHighPriorityTheory => "Rewards scheduling high-difficulty theory lessons.",
        }
    }

    /// Evaluates the rule against a schedule.
    pub fn evaluate(&self, schedule: &Schedule) -> Vec<RuleMatch> {
        let lessons = &schedule.lessons;
        match self {
            Self::TeacherConflict => slot_conflicts(lessons, |l| &l.teacher.id, "teacher"),
            Self::StudentGroupConflict => slot_conflicts(lessons, |l| &l.section.id, "section"),
            Self::NoFreeTimeslots => unassigned(lessons),
            Self::TeacherDailyWorkloadLimit => teacher_daily_workload(lessons),
            Self::NoBackToBackSameSubject => back_to_back_same_subject(lessons),
            Self::TeacherNoThreeConsecutive => teacher_three_consecutive(lessons),
            Self::PracticalSubjectConsecutivePeriods => practical_double_periods(lessons),
            Self::TeacherTimeEfficiency => teacher_adjacent_pairs(lessons),
            Self::PracticalSubjectsWeekdaysOnly => practical_on_saturday(lessons),
            Self::OnePracticalPerDayPerSection => practicals_per_section_day(lessons),
            Self::PracticalSubjectTwoDaysPerWeek => practical_day_spread(lessons),
            Self::LowDifficultySubjectWeeklyLimit => low_difficulty_weekly(lessons),
            Self::LowDifficultyOncePerDay => low_difficulty_daily(lessons),
            Self::PreferHighPriorityTheory => high_priority_theory(lessons),
        }
    }
}

// ======================== Helpers ========================

/// Day index of an assigned lesson.
fn day_of(lesson: &Lesson) -> Option<u32> {
    lesson.timeslot.as_ref().map(|t| t.day_index())
}

fn day_name(day: u32) -> Weekday {
    (0..day).fold(Weekday::Mon, |d, _| d.succ())
}

/// Groups assigned lessons by a key; `None` keys are skipped.
fn group_assigned<'a, K, F>(lessons: &'a [Lesson], key: F) -> BTreeMap<K, Vec<&'a Lesson>>
where
    K: Ord,
    F: Fn(&'a Lesson) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<&'a Lesson>> = BTreeMap::new();
    for lesson in lessons.iter().filter(|l| l.is_assigned()) {
        if let Some(k) = key(lesson) {
            groups.entry(k).or_default().push(lesson);
        }
    }
    groups
}

fn chronological(group: &mut [&Lesson]) {
    fn slot_key(l: &Lesson) -> Option<(NaiveTime, NaiveTime)> {
        l.timeslot.as_ref().map(|t| (t.start, t.end))
    }
    group.sort_by(|a, b| slot_key(a).cmp(&slot_key(b)).then_with(|| a.id.cmp(&b.id)));
}

/// Ordered pairs `(a, b)` in a group where `b` follows `a` back-to-back.
fn adjacent_pairs<'a>(group: &[&'a Lesson]) -> Vec<(&'a Lesson, &'a Lesson)> {
    let mut pairs = Vec::new();
    for (i, &a) in group.iter().enumerate() {
        for (j, &b) in group.iter().enumerate() {
            if i != j && a.is_followed_by(b) {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

// ======================== Hard rules ========================

/// One match per unordered pair sharing a timeslot and the keyed resource.
fn slot_conflicts<F>(lessons: &[Lesson], resource: F, label: &str) -> Vec<RuleMatch>
where
    F: Fn(&Lesson) -> &String,
{
    let by_slot = group_assigned(lessons, |l| {
        l.timeslot
            .as_ref()
            .map(|t| (t.id.as_str(), t.day_index(), t.start, t.end))
    });

    let mut matches = Vec::new();
    for group in by_slot.values() {
        for (i, &a) in group.iter().enumerate() {
            for &b in &group[i + 1..] {
                if resource(a) == resource(b) {
                    matches.push(RuleMatch::new(
                        &[a, b],
                        1,
                        format!(
                            "{label} {} double-booked: {} and {}",
                            resource(a),
                            a.id,
                            b.id
                        ),
                    ));
                }
            }
        }
    }
    matches
}

fn unassigned(lessons: &[Lesson]) -> Vec<RuleMatch> {
    lessons
        .iter()
        .filter(|l| !l.is_assigned())
        .map(|l| RuleMatch::new(&[l], 1, format!("lesson {} has no timeslot", l.id)))
        .collect()
}

fn teacher_daily_workload(lessons: &[Lesson]) -> Vec<RuleMatch> {
    group_assigned(lessons, |l| day_of(l).map(|d| (l.teacher.id.as_str(), d)))
        .into_iter()
        .filter(|(_, group)| group.len() > MAX_DAILY_LESSONS_PER_TEACHER)
        .map(|((teacher, day), group)| {
            let excess = group.len() - MAX_DAILY_LESSONS_PER_TEACHER;
            RuleMatch::new(
                &group,
                excess as i64,
                format!(
                    "teacher {teacher} has {} lessons on {}",
                    group.len(),
                    day_name(day)
                ),
            )
        })
        .collect()
}

fn back_to_back_same_subject(lessons: &[Lesson]) -> Vec<RuleMatch> {
    let groups = group_assigned(lessons, |l| {
        day_of(l).map(|d| (l.subject.id.as_str(), l.section.id.as_str(), d))
    });

    let mut matches = Vec::new();
    for ((subject, section, _), group) in &groups {
        for (a, b) in adjacent_pairs(group) {
            matches.push(RuleMatch::new(
                &[a, b],
                1,
                format!(
                    "{subject} back-to-back for section {section}: {} then {}",
                    a.id, b.id
                ),
            ));
        }
    }
    matches
}

// ======================== Flexible rules ========================

/// One match per (teacher, day) with any run of three back-to-back lessons.
fn teacher_three_consecutive(lessons: &[Lesson]) -> Vec<RuleMatch> {
    let groups = group_assigned(lessons, |l| day_of(l).map(|d| (l.teacher.id.as_str(), d)));

    let mut matches = Vec::new();
    for ((teacher, day), mut group) in groups {
        if group.len() < 3 {
            continue;
        }
        chronological(&mut group);
        let has_triple = group.windows(3).any(|w| {
            match (&w[0].timeslot, &w[1].timeslot, &w[2].timeslot) {
                (Some(a), Some(b), Some(c)) => a.is_followed_by(b) && b.is_followed_by(c),
                _ => false,
            }
        });
        if has_triple {
            matches.push(RuleMatch::new(
                &group,
                1,
                format!(
                    "teacher {teacher} teaches three consecutive periods on {}",
                    day_name(day)
                ),
            ));
        }
    }
    matches
}

/// Practical groups must be exactly one back-to-back pair per day.
fn practical_double_periods(lessons: &[Lesson]) -> Vec<RuleMatch> {
    let groups = group_assigned(lessons, |l| {
        if !l.subject.practical {
            return None;
        }
        day_of(l).map(|d| (l.subject.id.as_str(), l.section.id.as_str(), d))
    });

    let mut matches = Vec::new();
    for ((subject, section, day), group) in groups {
        let paired = group.len() == 2
            && (group[0].is_followed_by(group[1]) || group[1].is_followed_by(group[0]));
        if !paired {
            matches.push(RuleMatch::new(
                &group,
                1,
                format!(
                    "practical {subject} for section {section} on {} is not a double period ({} lessons)",
                    day_name(day),
                    group.len()
                ),
            ));
        }
    }
    matches
}

// ======================== Soft rules ========================

fn teacher_adjacent_pairs(lessons: &[Lesson]) -> Vec<RuleMatch> {
    let groups = group_assigned(lessons, |l| day_of(l).map(|d| (l.teacher.id.as_str(), d)));

    let mut matches = Vec::new();
    for ((teacher, _), group) in &groups {
        for (a, b) in adjacent_pairs(group) {
            matches.push(RuleMatch::new(
                &[a, b],
                1,
                format!("teacher {teacher} moves straight from {} to {}", a.id, b.id),
            ));
        }
    }
    matches
}

fn practical_on_saturday(lessons: &[Lesson]) -> Vec<RuleMatch> {
    lessons
        .iter()
        .filter(|l| l.subject.practical)
        .filter(|l| l.timeslot.as_ref().is_some_and(|t| t.day == Weekday::Sat))
        .map(|l| RuleMatch::new(&[l], 1, format!("practical lesson {} on Saturday", l.id)))
        .collect()
}

fn practicals_per_section_day(lessons: &[Lesson]) -> Vec<RuleMatch> {
    group_assigned(lessons, |l| {
        if !l.subject.practical {
            return None;
        }
        day_of(l).map(|d| (l.section.id.as_str(), d))
    })
    .into_iter()
    .filter(|(_, group)| group.len() > 1)
    .map(|((section, day), group)| {
        RuleMatch::new(
            &group,
            group.len() as i64 - 1,
            format!(
                "section {section} has {} practical lessons on {}",
                group.len(),
                day_name(day)
            ),
        )
    })
    .collect()
}

fn practical_day_spread(lessons: &[Lesson]) -> Vec<RuleMatch> {
    group_assigned(lessons, |l| {
        l.subject
            .practical
            .then(|| (l.section.id.as_str(), l.subject.id.as_str()))
    })
    .into_iter()
    .filter_map(|((section, subject), group)| {
        let days: BTreeSet<u32> = group.iter().filter_map(|&l| day_of(l)).collect();
        (days.len() > MAX_PRACTICAL_DAYS_PER_WEEK).then(|| {
            RuleMatch::new(
                &group,
                1,
                format!(
                    "practical {subject} for section {section} spread over {} days",
                    days.len()
                ),
            )
        })
    })
    .collect()
}

fn is_low_difficulty(lesson: &Lesson) -> bool {
    lesson.subject.difficulty == DifficultyLevel::Low
}

fn low_difficulty_weekly(lessons: &[Lesson]) -> Vec<RuleMatch> {
    group_assigned(lessons, |l| {
        is_low_difficulty(l).then(|| (l.section.id.as_str(), l.subject.id.as_str()))
    })
    .into_iter()
    .filter(|(_, group)| group.len() > MAX_WEEKLY_LOW_DIFFICULTY_LESSONS)
    .map(|((section, subject), group)| {
        RuleMatch::new(
            &group,
            (group.len() - MAX_WEEKLY_LOW_DIFFICULTY_LESSONS) as i64,
            format!(
                "low-difficulty {subject} has {} lessons per week for section {section}",
                group.len()
            ),
        )
    })
    .collect()
}

fn low_difficulty_daily(lessons: &[Lesson]) -> Vec<RuleMatch> {
    group_assigned(lessons, |l| {
        if !is_low_difficulty(l) {
            return None;
        }
        day_of(l).map(|d| (l.section.id.as_str(), l.subject.id.as_str(), d))
    })
    .into_iter()
    .filter(|(_, group)| group.len() > 1)
    .map(|((section, subject, day), group)| {
        RuleMatch::new(
            &group,
            group.len() as i64 - 1,
            format!(
                "low-difficulty {subject} appears {} times on {} for section {section}",
                group.len(),
                day_name(day)
            ),
        )
    })
    .collect()
}

fn high_priority_theory(lessons: &[Lesson]) -> Vec<RuleMatch> {
    lessons
        .iter()
        .filter(|l| l.is_assigned())
        .filter(|l| l.subject.theory && l.subject.difficulty == DifficultyLevel::High)
        .map(|l| RuleMatch::new(&[l], 1, format!("high-priority theory lesson {}", l.id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timeslot::hm;
    use crate::models::{Section, Subject, Teacher, Timeslot};

    fn slot(id: &str, day: Weekday, h: u32) -> Timeslot {
        Timeslot::new(id, day, hm(h, 0), hm(h + 1, 0))
    }

    fn lesson(id: &str, subject: Subject, teacher: &str, section: &str) -> Lesson {
        Lesson::new(id, subject, Teacher::new(teacher), Section::new(section))
    }

    fn math() -> Subject {
        Subject::new("MATH")
    }

    fn units(rule: CatalogRule, lessons: Vec<Lesson>) -> i64 {
        let schedule = Schedule::with_parts(Vec::new(), lessons);
        rule.evaluate(&schedule).iter().map(|m| m.units).sum()
    }

    #[test]
    fn test_names_round_trip() {
        for rule in CatalogRule::ALL {
            assert_eq!(CatalogRule::from_name(rule.name()), Some(rule));
            assert_eq!(rule.default_weight(), 1);
        }
        assert!(CatalogRule::from_name("TeacherConflict").is_none());
        assert!(!CatalogRule::is_reserved("customMorningPreference"));
    }

    #[test]
    fn test_default_bands() {
        let hard = CatalogRule::ALL
            .iter()
            .filter(|r| r.default_kind() == ConstraintKind::Hard)
            .count();
        assert_eq!(hard, 5);
        assert!(CatalogRule::TeacherTimeEfficiency.is_reward());
        assert!(!CatalogRule::TeacherConflict.is_reward());
    }

    #[test]
    fn test_teacher_conflict_counts_pairs() {
        let mon9 = slot("TS1", Weekday::Mon, 9);
        let lessons = vec![
            lesson("L1", math(), "T1", "S1").with_timeslot(mon9.clone()),
            lesson("L2", math(), "T1", "S2").with_timeslot(mon9.clone()),
            lesson("L3", math(), "T1", "S3").with_timeslot(mon9.clone()),
            lesson("L4", math(), "T2", "S4").with_timeslot(mon9),
        ];
        // Three lessons of T1 in one slot → three unordered pairs
        assert_eq!(units(CatalogRule::TeacherConflict, lessons), 3);
    }

    #[test]
    fn test_moving_lesson_removes_conflict() {
        let mon9 = slot("TS1", Weekday::Mon, 9);
        let mon10 = slot("TS2", Weekday::Mon, 10);
        let clashing = vec![
            lesson("L1", math(), "T1", "S1").with_timeslot(mon9.clone()),
            lesson("L2", Subject::new("ENG"), "T1", "S2").with_timeslot(mon9.clone()),
        ];
        assert_eq!(units(CatalogRule::TeacherConflict, clashing), 1);

        let moved = vec![
            lesson("L1", math(), "T1", "S1").with_timeslot(mon9),
            lesson("L2", Subject::new("ENG"), "T1", "S2").with_timeslot(mon10),
        ];
        assert_eq!(units(CatalogRule::TeacherConflict, moved.clone()), 0);
        // Back-to-back is rewarded, but two lessons are not three in a row
        assert_eq!(units(CatalogRule::TeacherTimeEfficiency, moved.clone()), 1);
        assert_eq!(units(CatalogRule::TeacherNoThreeConsecutive, moved), 0);
    }

    #[test]
    fn test_section_conflict() {
        let mon9 = slot("TS1", Weekday::Mon, 9);
        let lessons = vec![
            lesson("L1", math(), "T1", "S1").with_timeslot(mon9.clone()),
            lesson("L2", math(), "T2", "S1").with_timeslot(mon9),
            lesson("L3", math(), "T3", "S1"),
        ];
        assert_eq!(units(CatalogRule::StudentGroupConflict, lessons), 1);
    }

    #[test]
    fn test_unassigned() {
        let lessons = vec![
            lesson("L1", math(), "T1", "S1"),
            lesson("L2", math(), "T1", "S1").with_timeslot(slot("TS1", Weekday::Mon, 9)),
        ];
        let schedule = Schedule::with_parts(Vec::new(), lessons);
        let matches = CatalogRule::NoFreeTimeslots.evaluate(&schedule);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].lesson_ids, vec!["L1".to_string()]);
    }

    #[test]
    fn test_daily_workload_excess() {
        let lessons: Vec<Lesson> = (0..7)
            .map(|i| {
                lesson(&format!("L{i}"), math(), "T1", &format!("S{i}"))
                    .with_timeslot(slot(&format!("TS{i}"), Weekday::Tue, 8 + i as u32))
            })
            .collect();
        assert_eq!(units(CatalogRule::TeacherDailyWorkloadLimit, lessons), 2);
    }

    #[test]
    fn test_back_to_back_same_subject() {
        let lessons = vec![
            lesson("L1", math(), "T1", "S1").with_timeslot(slot("TS1", Weekday::Mon, 9)),
            lesson("L2", math(), "T2", "S1").with_timeslot(slot("TS2", Weekday::Mon, 10)),
            lesson("L3", math(), "T2", "S1").with_timeslot(slot("TS3", Weekday::Mon, 13)),
            // Other section: ignored
            lesson("L4", math(), "T3", "S2").with_timeslot(slot("TS4", Weekday::Mon, 11)),
        ];
        assert_eq!(units(CatalogRule::NoBackToBackSameSubject, lessons), 1);
    }

    #[test]
    fn test_back_to_back_ignores_identical_slot() {
        let mon9 = slot("TS1", Weekday::Mon, 9);
        let lessons = vec![
            lesson("L1", math(), "T1", "S1").with_timeslot(mon9.clone()),
            lesson("L2", math(), "T2", "S1").with_timeslot(mon9),
        ];
        assert_eq!(units(CatalogRule::NoBackToBackSameSubject, lessons), 0);
    }

    #[test]
    fn test_three_consecutive_once_per_group() {
        let lessons: Vec<Lesson> = (0..4)
            .map(|i| {
                lesson(&format!("L{i}"), math(), "T1", &format!("S{i}"))
                    .with_timeslot(slot(&format!("TS{i}"), Weekday::Wed, 9 + i as u32))
            })
            .collect();
        // Four in a row contains two triples but is one (teacher, day) group
        assert_eq!(units(CatalogRule::TeacherNoThreeConsecutive, lessons), 1);
    }

    #[test]
    fn test_three_consecutive_respects_gaps() {
        let lessons = vec![
            lesson("L1", math(), "T1", "S1").with_timeslot(slot("TS1", Weekday::Wed, 8)),
            lesson("L2", math(), "T1", "S2").with_timeslot(slot("TS2", Weekday::Wed, 9)),
            lesson("L3", math(), "T1", "S3").with_timeslot(slot("TS3", Weekday::Wed, 11)),
        ];
        assert_eq!(units(CatalogRule::TeacherNoThreeConsecutive, lessons), 0);
    }

    #[test]
    fn test_practical_double_period() {
        let lab = Subject::new("LAB").practical();
        let paired = vec![
            lesson("L1", lab.clone(), "T1", "S1").with_timeslot(slot("TS1", Weekday::Mon, 9)),
            lesson("L2", lab.clone(), "T1", "S1").with_timeslot(slot("TS2", Weekday::Mon, 10)),
        ];
        assert_eq!(units(CatalogRule::PracticalSubjectConsecutivePeriods, paired), 0);

        let split = vec![
            lesson("L1", lab.clone(), "T1", "S1").with_timeslot(slot("TS1", Weekday::Mon, 9)),
            lesson("L2", lab.clone(), "T1", "S1").with_timeslot(slot("TS2", Weekday::Mon, 13)),
        ];
        assert_eq!(units(CatalogRule::PracticalSubjectConsecutivePeriods, split), 1);

        let single = vec![lesson("L1", lab, "T1", "S1").with_timeslot(slot("TS1", Weekday::Mon, 9))];
        assert_eq!(units(CatalogRule::PracticalSubjectConsecutivePeriods, single), 1);
    }

    #[test]
    fn test_practical_placement_rules() {
        let lab = Subject::new("LAB").practical();
        let art = Subject::new("ART").practical();
        let lessons = vec![
            lesson("L1", lab.clone(), "T1", "S1").with_timeslot(slot("TS1", Weekday::Mon, 9)),
            lesson("L2", lab.clone(), "T1", "S1").with_timeslot(slot("TS2", Weekday::Tue, 9)),
            lesson("L3", lab, "T1", "S1").with_timeslot(slot("TS3", Weekday::Sat, 9)),
            lesson("L4", art, "T2", "S1").with_timeslot(slot("TS4", Weekday::Mon, 11)),
        ];
        assert_eq!(units(CatalogRule::PracticalSubjectsWeekdaysOnly, lessons.clone()), 1);
        // Monday has LAB + ART
        assert_eq!(units(CatalogRule::OnePracticalPerDayPerSection, lessons.clone()), 1);
        // LAB uses three days
        assert_eq!(units(CatalogRule::PracticalSubjectTwoDaysPerWeek, lessons), 1);
    }

    #[test]
    fn test_low_difficulty_limits() {
        let pe = Subject::new("PE").with_difficulty(DifficultyLevel::Low);
        let lessons = vec![
            lesson("L1", pe.clone(), "T1", "S1").with_timeslot(slot("TS1", Weekday::Mon, 9)),
            lesson("L2", pe.clone(), "T1", "S1").with_timeslot(slot("TS2", Weekday::Mon, 12)),
            lesson("L3", pe.clone(), "T1", "S1").with_timeslot(slot("TS3", Weekday::Tue, 9)),
            lesson("L4", pe.clone(), "T1", "S1").with_timeslot(slot("TS4", Weekday::Wed, 9)),
            lesson("L5", pe, "T1", "S1"),
        ];
        assert_eq!(units(CatalogRule::LowDifficultySubjectWeeklyLimit, lessons.clone()), 2);
        assert_eq!(units(CatalogRule::LowDifficultyOncePerDay, lessons), 1);
    }

    #[test]
    fn test_high_priority_theory_reward() {
        let physics = Subject::new("PHY").with_difficulty(DifficultyLevel::High);
        let robotics = Subject::new("ROB")
            .practical()
            .with_difficulty(DifficultyLevel::High);
        let lessons = vec![
            lesson("L1", physics.clone(), "T1", "S1").with_timeslot(slot("TS1", Weekday::Mon, 9)),
            lesson("L2", physics, "T1", "S1"),
            lesson("L3", robotics, "T2", "S1").with_timeslot(slot("TS2", Weekday::Mon, 10)),
        ];
        assert_eq!(units(CatalogRule::PreferHighPriorityTheory, lessons), 1);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let mon9 = slot("TS1", Weekday::Mon, 9);
        let schedule = Schedule::with_parts(
            Vec::new(),
            vec![
                lesson("L2", math(), "T1", "S1").with_timeslot(mon9.clone()),
                lesson("L1", math(), "T1", "S2").with_timeslot(mon9.clone()),
                lesson("L3", math(), "T1", "S3").with_timeslot(mon9),
            ],
        );
        let first = CatalogRule::TeacherConflict.evaluate(&schedule);
        let second = CatalogRule::TeacherConflict.evaluate(&schedule);
        assert_eq!(first, second);
    }
}
