//! Constraint settings.
//!
//! A setting row controls whether and how strongly a rule is applied.
//! Rows are owned by the settings store and read by the registry on every
//! rebuild; the solver never mutates them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Score band a constraint contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Must reach zero for a feasible schedule.
    Hard,
    /// Shapes quality among feasible schedules.
    Soft,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hard => "Hard",
            Self::Soft => "Soft",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstraintKind {
    type Err = String;

    /// Parses `Hard` or `Soft`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(Self::Hard),
            "soft" => Ok(Self::Soft),
            _ => Err(format!("Constraint type must be either 'Hard' or 'Soft', got '{s}'")),
        }
    }
}

/// A stored constraint configuration row.
///
/// `id` is assigned by the store on first save and is 0 before that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSetting {
    /// Store-assigned identifier.
    #[serde(default)]
    pub id: u64,
    /// Unique rule name. Catalog names select a built-in rule.
    pub name: String,
    /// Score band.
    pub kind: ConstraintKind,
    /// Multiplier applied to every match. 0 means "catalog default".
    pub weight: u32,
    /// Disabled rows are skipped by the registry.
    pub enabled: bool,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

impl ConstraintSetting {
    /// Creates an enabled weight-1 row.
    pub fn new(name: impl Into<String>, kind: ConstraintKind) -> Self {
        Self {
            id: 0,
            name: name.into(),
            kind,
            weight: 1,
            enabled: true,
            description: String::new(),
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An unvalidated create/update request for a setting.
///
/// Fields are kept loose (`kind` as text, `weight` signed) so that every
/// problem can be reported by validation instead of failing at parse time.
/// `id == None` creates a row; `Some(id)` updates that row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDraft {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub weight: i64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl ConstraintDraft {
    /// Draft for a new enabled row with weight 1.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind: kind.into(),
            weight: 1,
            enabled: true,
            description: None,
        }
    }

    /// Draft updating the row `id`.
    pub fn for_update(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<&ConstraintSetting> for ConstraintDraft {
    fn from(setting: &ConstraintSetting) -> Self {
        Self {
            id: Some(setting.id),
            name: setting.name.clone(),
            kind: setting.kind.as_str().to_string(),
            weight: i64::from(setting.weight),
            enabled: setting.enabled,
            description: Some(setting.description.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("hard".parse::<ConstraintKind>(), Ok(ConstraintKind::Hard));
        assert_eq!("SOFT".parse::<ConstraintKind>(), Ok(ConstraintKind::Soft));
        assert!("medium".parse::<ConstraintKind>().is_err());
        assert!("".parse::<ConstraintKind>().is_err());
    }

    #[test]
    fn test_setting_builder() {
        let s = ConstraintSetting::new("customMorning", ConstraintKind::Soft)
            .with_weight(7)
            .with_enabled(false)
            .with_description("prefer mornings");
        assert_eq!(s.id, 0);
        assert_eq!(s.weight, 7);
        assert!(!s.enabled);
        assert_eq!(s.description, "prefer mornings");
    }

    #[test]
    fn test_draft_from_setting() {
        let mut s = ConstraintSetting::new("teacherConflict", ConstraintKind::Hard).with_weight(3);
        s.id = 42;
        let d = ConstraintDraft::from(&s);
        assert_eq!(d.id, Some(42));
        assert_eq!(d.kind, "Hard");
        assert_eq!(d.weight, 3);
    }

    #[test]
    fn test_draft_json_defaults() {
        let d: ConstraintDraft =
            serde_json::from_str(r#"{"name":"x","kind":"soft","weight":5}"#).unwrap();
        assert!(d.enabled);
        assert!(d.id.is_none());
        assert!(d.description.is_none());
    }
}
