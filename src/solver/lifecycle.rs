//! Solver lifecycle manager.
//!
//! Owns the single active engine handle and swaps it when the constraint
//! settings change.
//!
//! # Locking
//! - The handle slot is a `RwLock`: any number of readers, one writer.
//! - Rebuilds are serialized by a separate mutex. The new handle is built
//!   before the write lock is taken, so readers keep getting the old
//!   handle while a build is in progress and never see a half-built one.
//! - The old handle is closed after the swap, on a helper thread, with a
//!   bounded wait. Jobs running on it are not terminated.

use std::fmt;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::constraints::ConstraintRegistry;
use crate::engine::{EngineFactory, SolverHandle};
use crate::error::{Result, TimetableError};

/// Snapshot of the lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverInfo {
    /// Whether a handle is installed.
    pub initialized: bool,
    /// Constraint names of the installed handle, in evaluation order.
    pub constraints: Vec<String>,
}

impl fmt::Display for SolverInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.initialized {
            write!(
                f,
                "Solver active with {} constraints: {}",
                self.constraints.len(),
                self.constraints.join(", ")
            )
        } else {
            f.write_str("Solver not initialized")
        }
    }
}

/// Builds, installs and retires engine handles.
pub struct SolverLifecycle {
    factory: Arc<dyn EngineFactory>,
    registry: ConstraintRegistry,
    current: RwLock<Option<Arc<dyn SolverHandle>>>,
    rebuild: Mutex<()>,
    teardown_timeout: Duration,
}

impl SolverLifecycle {
    /// Creates a manager with no handle installed yet.
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        registry: ConstraintRegistry,
        teardown_timeout: Duration,
    ) -> Self {
        Self {
            factory,
            registry,
            current: RwLock::new(None),
            rebuild: Mutex::new(()),
            teardown_timeout,
        }
    }

    /// The active handle, building one first if none is installed.
    pub fn current(&self) -> Result<Arc<dyn SolverHandle>> {
        if let Some(handle) = self.current.read().as_ref() {
            return Ok(Arc::clone(handle));
        }

        let _rebuild = self.rebuild.lock();
        // Another caller may have built it while we waited
        if let Some(handle) = self.current.read().as_ref() {
            return Ok(Arc::clone(handle));
        }
        warn!("No solver installed, building one");
        let handle = self.build()?;
        *self.current.write() = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Rebuilds the handle from a fresh read of the settings.
    ///
    /// On failure the previous handle stays installed and the error is
    /// returned.
    pub fn reload(&self) -> Result<()> {
        let _rebuild = self.rebuild.lock();
        info!("Reloading solver configuration");

        let handle = match self.build() {
            Ok(handle) => handle,
            Err(e) => {
                warn!(
                    error = %e,
                    has_previous = self.is_initialized(),
                    "Keeping existing solver due to reload failure"
                );
                return Err(e);
            }
        };
        let constraints = handle.constraints().names();
        let previous = self.current.write().replace(handle);

        if let Some(old) = previous {
            self.retire(old);
        }
        info!(constraints = ?constraints, "Solver configuration reloaded");
        Ok(())
    }

    /// Whether a handle is installed.
    pub fn is_initialized(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn info(&self) -> SolverInfo {
        match self.current.read().as_ref() {
            Some(handle) => SolverInfo {
                initialized: true,
                constraints: handle.constraints().names(),
            },
            None => SolverInfo {
                initialized: false,
                constraints: Vec::new(),
            },
        }
    }

    /// Uninstalls and closes the active handle.
    pub fn shutdown(&self) {
        let _rebuild = self.rebuild.lock();
        if let Some(old) = self.current.write().take() {
            info!("Closing solver during shutdown");
            self.retire(old);
        }
    }

    fn build(&self) -> Result<Arc<dyn SolverHandle>> {
        let constraints = self.registry.build();
        self.factory.build(constraints).map_err(|e| {
            error!(error = %e, "Failed to build solver");
            TimetableError::ReloadFailed(e.to_string())
        })
    }

    /// Closes `old` without blocking longer than the teardown timeout.
    fn retire(&self, old: Arc<dyn SolverHandle>) {
        let (done_tx, done_rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("solver-teardown".into())
            .spawn(move || {
                old.close();
                let _ = done_tx.send(());
            });

        match spawned {
            Ok(_) => {
                if done_rx.recv_timeout(self.teardown_timeout).is_err() {
                    warn!(
                        timeout_ms = self.teardown_timeout.as_millis() as u64,
                        "Old solver is slow to close, continuing"
                    );
                }
            }
            Err(e) => warn!(error = %e, "Could not start solver teardown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::testing::ScriptedFactory;
    use crate::store::{InMemorySettingsStore, SettingsStore};
    use std::sync::atomic::Ordering;

    fn lifecycle(factory: Arc<ScriptedFactory>) -> (SolverLifecycle, Arc<InMemorySettingsStore>) {
        let store = Arc::new(InMemorySettingsStore::with_defaults());
        let registry = ConstraintRegistry::new(store.clone());
        (
            SolverLifecycle::new(factory, registry, Duration::from_secs(1)),
            store,
        )
    }

    #[test]
    fn test_current_builds_lazily_once() {
        let factory = ScriptedFactory::new();
        let (manager, _) = lifecycle(factory.clone());
        assert!(!manager.is_initialized());

        let a = manager.current().unwrap();
        let b = manager.current().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.build_count(), 1);
    }

    #[test]
    fn test_reload_swaps_and_closes_old() {
        let factory = ScriptedFactory::new();
        let (manager, _) = lifecycle(factory.clone());
        manager.reload().unwrap();
        let old = manager.current().unwrap();

        manager.reload().unwrap();
        let new = manager.current().unwrap();
        assert!(!Arc::ptr_eq(&old, &new));
        assert!(old.is_closed());
        assert!(!new.is_closed());
    }

    #[test]
    fn test_failed_reload_keeps_previous() {
        let factory = ScriptedFactory::new();
        let (manager, _) = lifecycle(factory.clone());
        manager.reload().unwrap();
        let before = manager.current().unwrap();

        factory.fail_builds.store(true, Ordering::SeqCst);
        let err = manager.reload().unwrap_err();
        assert!(matches!(err, TimetableError::ReloadFailed(_)));

        let after = manager.current().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert!(!after.is_closed());
    }

    #[test]
    fn test_first_build_failure_surfaces() {
        let factory = ScriptedFactory::new();
        factory.fail_builds.store(true, Ordering::SeqCst);
        let (manager, _) = lifecycle(factory.clone());
        assert!(manager.current().is_err());
        assert!(!manager.is_initialized());
        assert_eq!(manager.info().to_string(), "Solver not initialized");
    }

    #[test]
    fn test_reload_reads_fresh_settings() {
        let factory = ScriptedFactory::new();
        let (manager, store) = lifecycle(factory);
        manager.reload().unwrap();
        assert!(manager.info().constraints.contains(&"teacherConflict".to_string()));

        let mut row = store.find_by_name("teacherConflict").unwrap();
        row.enabled = false;
        store.save(row);
        manager.reload().unwrap();

        let info = manager.info();
        assert!(info.initialized);
        assert_eq!(info.constraints.len(), 13);
        assert!(!info.constraints.contains(&"teacherConflict".to_string()));
    }

    #[test]
    fn test_shutdown_closes_handle() {
        let factory = ScriptedFactory::new();
        let (manager, _) = lifecycle(factory);
        let handle = manager.current().unwrap();
        manager.shutdown();
        assert!(handle.is_closed());
        assert!(!manager.is_initialized());
    }

    #[test]
    fn test_concurrent_readers_during_reloads() {
        let factory = ScriptedFactory::new();
        let (manager, _) = lifecycle(factory.clone());
        let manager = Arc::new(manager);
        manager.reload().unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let m = Arc::clone(&manager);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let handle = m.current().unwrap();
                        assert_eq!(handle.constraints().len(), 14);
                    }
                })
            })
            .collect();
        for _ in 0..5 {
            manager.reload().unwrap();
        }
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(factory.build_count(), 6);
    }
}
