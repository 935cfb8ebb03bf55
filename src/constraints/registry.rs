//! Settings rows → active constraint set.
//!
//! For each enabled row, in id order:
//! - a catalog name instantiates that catalog rule with the row's band and
//!   weight (weight 0 falls back to the catalog default);
//! - any other name becomes a generic placeholder: hard rows penalize every
//!   unassigned lesson, soft rows reward every assigned lesson.
//!
//! The registry never rejects rows; validating edits is done before they
//! reach the store.

use std::sync::Arc;

use tracing::debug;

use super::{ActiveConstraint, CatalogRule, ConstraintImpl, ConstraintSet};
use crate::models::{ConstraintKind, ConstraintSetting};
use crate::store::SettingsStore;

/// Builds constraint sets from the settings store.
#[derive(Clone)]
pub struct ConstraintRegistry {
    store: Arc<dyn SettingsStore>,
}

impl ConstraintRegistry {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Reads the store and builds the current constraint set.
    pub fn build(&self) -> ConstraintSet {
        let set = Self::from_settings(&self.store.list_all());
        debug!(constraints = ?set.names(), "Built constraint set");
        set
    }

    /// Builds a constraint set from rows, skipping disabled ones.
    pub fn from_settings(settings: &[ConstraintSetting]) -> ConstraintSet {
        let mut rows: Vec<&ConstraintSetting> = settings.iter().filter(|s| s.enabled).collect();
        rows.sort_by_key(|s| s.id);
        ConstraintSet {
            constraints: rows.into_iter().map(Self::activate).collect(),
        }
    }

    /// Resolves one row.
    pub fn activate(setting: &ConstraintSetting) -> ActiveConstraint {
        match CatalogRule::from_name(&setting.name) {
            Some(rule) => ActiveConstraint {
                name: setting.name.clone(),
                kind: setting.kind,
                weight: if setting.weight == 0 {
                    rule.default_weight()
                } else {
                    setting.weight
                },
                rule: ConstraintImpl::Catalog(rule),
            },
            None => ActiveConstraint {
                name: setting.name.clone(),
                kind: setting.kind,
                weight: setting.weight,
                rule: match setting.kind {
                    ConstraintKind::Hard => ConstraintImpl::CustomHard,
                    ConstraintKind::Soft => ConstraintImpl::CustomSoft,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{seed_default_settings, InMemorySettingsStore};

    fn row(id: u64, name: &str, kind: ConstraintKind) -> ConstraintSetting {
        let mut s = ConstraintSetting::new(name, kind);
        s.id = id;
        s
    }

    #[test]
    fn test_catalog_names_resolve() {
        let a = ConstraintRegistry::activate(&row(1, "teacherConflict", ConstraintKind::Hard).with_weight(7));
        assert_eq!(a.rule, ConstraintImpl::Catalog(CatalogRule::TeacherConflict));
        assert_eq!(a.weight, 7);
    }

    #[test]
    fn test_zero_weight_uses_default() {
        let a = ConstraintRegistry::activate(&row(1, "teacherConflict", ConstraintKind::Hard).with_weight(0));
        assert_eq!(a.weight, 1);
    }

    #[test]
    fn test_unknown_names_become_placeholders() {
        let hard = ConstraintRegistry::activate(&row(1, "customRoomRule", ConstraintKind::Hard));
        let soft = ConstraintRegistry::activate(&row(2, "customMorningPreference", ConstraintKind::Soft));
        assert_eq!(hard.rule, ConstraintImpl::CustomHard);
        assert_eq!(soft.rule, ConstraintImpl::CustomSoft);
    }

    #[test]
    fn test_disabled_rows_skipped_and_order_stable() {
        let rows = vec![
            row(3, "teacherTimeEfficiency", ConstraintKind::Soft),
            row(1, "teacherConflict", ConstraintKind::Hard),
            row(2, "noFreeTimeslots", ConstraintKind::Hard).with_enabled(false),
        ];
        let set = ConstraintRegistry::from_settings(&rows);
        assert_eq!(set.names(), vec!["teacherConflict", "teacherTimeEfficiency"]);
    }

    #[test]
    fn test_build_reads_store_each_time() {
        let store = Arc::new(InMemorySettingsStore::new());
        seed_default_settings(store.as_ref());
        let registry = ConstraintRegistry::new(store.clone());
        assert_eq!(registry.build().len(), 14);

        let mut row = store.find_by_name("teacherConflict").unwrap();
        row.enabled = false;
        store.save(row);
        let set = registry.build();
        assert_eq!(set.len(), 13);
        assert!(!set.contains("teacherConflict"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let store = Arc::new(InMemorySettingsStore::with_defaults());
        let registry = ConstraintRegistry::new(store);
        assert_eq!(registry.build(), registry.build());
    }
}
