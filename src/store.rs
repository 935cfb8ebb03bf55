//! Constraint settings store.
//!
//! The store is the single source of truth for settings rows; the
//! registry re-reads it on every rebuild and caches nothing.
//! [`InMemorySettingsStore`] is the bundled implementation; persistent
//! backends implement [`SettingsStore`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constraints::CatalogRule;
use crate::models::ConstraintSetting;

/// Persistence seam for settings rows.
pub trait SettingsStore: Send + Sync {
    /// All rows, ordered by id.
    fn list_all(&self) -> Vec<ConstraintSetting>;

    fn find_by_id(&self, id: u64) -> Option<ConstraintSetting>;

    fn find_by_name(&self, name: &str) -> Option<ConstraintSetting>;

    /// Inserts (`id == 0`) or overwrites a row; returns it with its id.
    ///
    /// Names are unique: a row whose name belongs to another row replaces
    /// that row. A new row adopts the replaced row's id.
    fn save(&self, setting: ConstraintSetting) -> ConstraintSetting;

    /// Removes a row. Returns whether it existed.
    fn delete_by_id(&self, id: u64) -> bool;
}

/// Thread-safe in-memory settings store.
#[derive(Debug)]
pub struct InMemorySettingsStore {
    rows: RwLock<BTreeMap<u64, ConstraintSetting>>,
    next_id: AtomicU64,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// A store pre-filled with the default catalog rows.
    pub fn with_defaults() -> Self {
        let store = Self::new();
        seed_default_settings(&store);
        store
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl Default for InMemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn list_all(&self) -> Vec<ConstraintSetting> {
        self.rows.read().values().cloned().collect()
    }

    fn find_by_id(&self, id: u64) -> Option<ConstraintSetting> {
        self.rows.read().get(&id).cloned()
    }

    fn find_by_name(&self, name: &str) -> Option<ConstraintSetting> {
        self.rows.read().values().find(|s| s.name == name).cloned()
    }

    fn save(&self, mut setting: ConstraintSetting) -> ConstraintSetting {
        let mut rows = self.rows.write();
        let holder = rows
            .values()
            .find(|s| s.name == setting.name && s.id != setting.id)
            .map(|s| s.id);

        match (setting.id, holder) {
            // A new row under a taken name takes over that row
            (0, Some(existing)) => setting.id = existing,
            (0, None) => setting.id = self.next_id.fetch_add(1, Ordering::Relaxed),
            (id, holder) => {
                if let Some(stale) = holder {
                    rows.remove(&stale);
                    debug!(id = stale, name = %setting.name, "Replaced row with duplicate name");
                }
                self.next_id.fetch_max(id + 1, Ordering::Relaxed);
            }
        }
        rows.insert(setting.id, setting.clone());
        debug!(id = setting.id, name = %setting.name, "Saved constraint setting");
        setting
    }

    fn delete_by_id(&self, id: u64) -> bool {
        self.rows.write().remove(&id).is_some()
    }
}

/// Outcome of seeding the default rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    /// Names that were inserted.
    pub created: Vec<String>,
    /// Names that already had a row and were left untouched.
    pub existing: Vec<String>,
}

/// Inserts a row for every catalog rule that has none yet.
///
/// Existing rows (including operator customizations of default rules)
/// are never overwritten.
pub fn seed_default_settings(store: &dyn SettingsStore) -> SeedReport {
    let mut report = SeedReport::default();
    for rule in CatalogRule::ALL {
        if store.find_by_name(rule.name()).is_some() {
            report.existing.push(rule.name().to_string());
            continue;
        }
        store.save(
            ConstraintSetting::new(rule.name(), rule.default_kind())
                .with_weight(rule.default_weight())
                .with_description(rule.description()),
        );
        report.created.push(rule.name().to_string());
    }
    info!(
        created = report.created.len(),
        existing = report.existing.len(),
        "Seeded default constraint settings"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConstraintKind;

    #[test]
    fn test_save_assigns_ids() {
        let store = InMemorySettingsStore::new();
        let a = store.save(ConstraintSetting::new("a", ConstraintKind::Hard));
        let b = store.save(ConstraintSetting::new("b", ConstraintKind::Soft));
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.find_by_name("b").map(|s| s.id), Some(2));
        assert_eq!(store.list_all().len(), 2);
    }

    #[test]
    fn test_save_overwrites_by_id() {
        let store = InMemorySettingsStore::new();
        let mut a = store.save(ConstraintSetting::new("a", ConstraintKind::Hard));
        a.weight = 9;
        store.save(a.clone());
        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_id(a.id).map(|s| s.weight), Some(9));
    }

    #[test]
    fn test_save_keeps_names_unique() {
        let store = InMemorySettingsStore::new();
        let first = store.save(ConstraintSetting::new("customA", ConstraintKind::Soft));
        let again = store.save(ConstraintSetting::new("customA", ConstraintKind::Hard).with_weight(4));
        assert_eq!(again.id, first.id);
        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_name("customA").map(|s| s.weight), Some(4));

        // Renaming onto a taken name drops the other row
        let mut b = store.save(ConstraintSetting::new("customB", ConstraintKind::Soft));
        b.name = "customA".into();
        store.save(b.clone());
        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_name("customA").map(|s| s.id), Some(b.id));
    }

    #[test]
    fn test_concurrent_saves_of_one_name() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        let store = Arc::new(InMemorySettingsStore::new());
        let barrier = Arc::new(Barrier::new(8));
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store.save(ConstraintSetting::new("customShared", ConstraintKind::Soft))
                })
            })
            .collect();
        let ids: Vec<u64> = workers.into_iter().map(|w| w.join().unwrap().id).collect();

        assert_eq!(store.len(), 1);
        assert!(ids.iter().all(|&id| id == ids[0]));
    }

    #[test]
    fn test_delete() {
        let store = InMemorySettingsStore::new();
        let a = store.save(ConstraintSetting::new("a", ConstraintKind::Hard));
        assert!(store.delete_by_id(a.id));
        assert!(!store.delete_by_id(a.id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_seed_creates_fourteen_rows() {
        let store = InMemorySettingsStore::new();
        let report = seed_default_settings(&store);
        assert_eq!(report.created.len(), 14);
        assert!(report.existing.is_empty());

        let conflict = store.find_by_name("teacherConflict").unwrap();
        assert_eq!(conflict.kind, ConstraintKind::Hard);
        assert_eq!(conflict.weight, 1);
        assert!(conflict.enabled);
        assert!(!conflict.description.is_empty());
    }

    #[test]
    fn test_seed_never_overwrites() {
        let store = InMemorySettingsStore::new();
        store.save(
            ConstraintSetting::new("teacherConflict", ConstraintKind::Hard)
                .with_weight(50)
                .with_enabled(false),
        );
        let report = seed_default_settings(&store);
        assert_eq!(report.existing, vec!["teacherConflict".to_string()]);
        assert_eq!(report.created.len(), 13);

        let kept = store.find_by_name("teacherConflict").unwrap();
        assert_eq!(kept.weight, 50);
        assert!(!kept.enabled);

        // Second run is a no-op
        let again = seed_default_settings(&store);
        assert!(again.created.is_empty());
        assert_eq!(store.len(), 14);
    }
}
