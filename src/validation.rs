//! Input validation for constraint settings and timetabling problems.
//!
//! Both entry points collect every detected issue instead of stopping at
//! the first one.
//!
//! Settings drafts are checked for:
//! - Name format (letter first, then letters/digits/underscores, ≤ 50 chars)
//! - Reserved catalog names (no new rows, no renames)
//! - Name uniqueness
//! - Kind (`Hard`/`Soft`, any case)
//! - Weight range `[1, 1000]`
//! - Description length (≤ 500 chars)
//!
//! Problems are checked for duplicate ids, malformed timeslots, Sunday
//! timeslots and lessons assigned outside the value range.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constraints::CatalogRule;
use crate::models::{ConstraintDraft, ConstraintKind, ConstraintSetting, Schedule};

/// Longest accepted constraint name.
pub const MAX_NAME_LENGTH: usize = 50;

/// Longest accepted description.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Accepted weight range (inclusive).
pub const MIN_WEIGHT: i64 = 1;
pub const MAX_WEIGHT: i64 = 1000;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Name missing, badly formed or too long.
    InvalidName,
    /// Name belongs to a catalog rule.
    ReservedName,
    /// Another row already uses the name.
    DuplicateName,
    /// Kind is not `Hard` or `Soft`.
    InvalidKind,
    /// Weight outside `[1, 1000]`.
    WeightOutOfRange,
    /// Description longer than 500 characters.
    DescriptionTooLong,
    /// Two timeslots or two lessons share an id.
    DuplicateId,
    /// Timeslot with `start >= end`.
    MalformedTimeslot,
    /// Timeslot on a day without school.
    UnsupportedDay,
    /// Lesson assigned to a timeslot missing from the value range.
    UnknownTimeslot,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Joins error messages with `"; "`.
pub fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Letter first, then letters, digits or underscores
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").expect("constraint name pattern is valid")
    })
}

/// Validates a settings draft against the rows currently stored.
///
/// `existing` must contain every stored row; it is used for the
/// uniqueness and rename checks.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_draft(draft: &ConstraintDraft, existing: &[ConstraintSetting]) -> ValidationResult {
    let mut errors = Vec::new();
    let name = draft.name.trim();

    // Name format
    if name.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidName,
            "Constraint name is required",
        ));
    } else {
        if !name_pattern().is_match(name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidName,
                "Constraint name must start with a letter and contain only letters, numbers, and underscores",
            ));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidName,
                format!("Constraint name must not exceed {MAX_NAME_LENGTH} characters"),
            ));
        }
    }

    // Reserved names and renames
    let current = draft
        .id
        .and_then(|id| existing.iter().find(|s| s.id == id));
    match current {
        None if CatalogRule::is_reserved(name) => errors.push(ValidationError::new(
            ValidationErrorKind::ReservedName,
            format!("'{name}' is a reserved constraint name"),
        )),
        Some(row) if row.name != name => {
            if CatalogRule::is_reserved(&row.name) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ReservedName,
                    format!("Core constraint '{}' cannot be renamed", row.name),
                ));
            } else if CatalogRule::is_reserved(name) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ReservedName,
                    format!("'{name}' is a reserved constraint name"),
                ));
            }
        }
        _ => {}
    }

    // Uniqueness
    if !name.is_empty()
        && existing
            .iter()
            .any(|s| s.name == name && Some(s.id) != draft.id)
        && !CatalogRule::is_reserved(name)
    {
        errors.push(ValidationError::new(
            ValidationErrorKind::DuplicateName,
            format!("Constraint with name '{name}' already exists"),
        ));
    }

    // Kind
    if draft.kind.trim().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidKind,
            "Constraint type is required",
        ));
    } else if let Err(message) = draft.kind.parse::<ConstraintKind>() {
        errors.push(ValidationError::new(ValidationErrorKind::InvalidKind, message));
    }

    // Weight
    if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&draft.weight) {
        errors.push(ValidationError::new(
            ValidationErrorKind::WeightOutOfRange,
            format!("Weight must be between {MIN_WEIGHT} and {MAX_WEIGHT}, got {}", draft.weight),
        ));
    }

    // Description
    if let Some(description) = &draft.description {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            errors.push(ValidationError::new(
                ValidationErrorKind::DescriptionTooLong,
                format!("Description must not exceed {MAX_DESCRIPTION_LENGTH} characters"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a draft and turns it into a storable row.
///
/// The returned row keeps the draft's id (0 for new rows) and a trimmed
/// name; a missing description becomes empty.
pub fn prepare_setting(
    draft: &ConstraintDraft,
    existing: &[ConstraintSetting],
) -> Result<ConstraintSetting, Vec<ValidationError>> {
    validate_draft(draft, existing)?;
    let kind = draft
        .kind
        .parse::<ConstraintKind>()
        .map_err(|m| vec![ValidationError::new(ValidationErrorKind::InvalidKind, m)])?;
    let weight = validate_weight(draft.weight)?;
    Ok(ConstraintSetting {
        id: draft.id.unwrap_or(0),
        name: draft.name.trim().to_string(),
        kind,
        weight,
        enabled: draft.enabled,
        description: draft.description.clone().unwrap_or_default(),
    })
}

/// Checks a weight on its own (weight-only updates).
pub fn validate_weight(weight: i64) -> Result<u32, Vec<ValidationError>> {
    if (MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
        u32::try_from(weight).map_err(|_| Vec::new())
    } else {
        Err(vec![ValidationError::new(
            ValidationErrorKind::WeightOutOfRange,
            format!("Weight must be between {MIN_WEIGHT} and {MAX_WEIGHT}, got {weight}"),
        )])
    }
}

/// Validates a problem before it is handed to an engine.
///
/// Checks:
/// 1. No duplicate timeslot IDs
/// 2. No duplicate lesson IDs
/// 3. Every timeslot has `start < end`
/// 4. Every timeslot falls on Monday–Saturday
/// 5. Every pre-assigned lesson uses a timeslot from the value range
pub fn validate_problem(schedule: &Schedule) -> ValidationResult {
    let mut errors = Vec::new();

    let mut slot_ids = HashSet::new();
    for slot in &schedule.timeslots {
        if !slot_ids.insert(slot.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate timeslot ID: {}", slot.id),
            ));
        }
        if !slot.is_well_formed() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MalformedTimeslot,
                format!(
                    "Timeslot '{}' must start before it ends ({} - {})",
                    slot.id, slot.start, slot.end
                ),
            ));
        }
        if !slot.is_school_day() {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnsupportedDay,
                format!("Timeslot '{}' falls on {}", slot.id, slot.day),
            ));
        }
    }

    let mut lesson_ids = HashSet::new();
    for lesson in &schedule.lessons {
        if !lesson_ids.insert(lesson.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate lesson ID: {}", lesson.id),
            ));
        }
        if let Some(slot) = &lesson.timeslot {
            if !schedule.timeslots.contains(slot) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTimeslot,
                    format!(
                        "Lesson '{}' is assigned to unknown timeslot '{}'",
                        lesson.id, slot.id
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
