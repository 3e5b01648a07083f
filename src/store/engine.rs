//! Snapshot handle with atomic wholesale replacement
//!
//! [`ActivityStore`] owns the current [`LogSnapshot`] behind
//! `RwLock<Arc<..>>`. Readers take a cheap `Arc` clone and keep a consistent
//! view for as long as they hold it; [`replace`](ActivityStore::replace)
//! swaps in a fully built snapshot under the write lock, so readers observe
//! either the old or the new snapshot, never a partial one.

use crate::store::snapshot::{LogSnapshot, SnapshotStats};
use std::sync::{Arc, RwLock};

/// Shared handle to the current log snapshot
///
/// The only write operation is a wholesale swap; snapshots themselves are
/// never mutated.
#[derive(Debug)]
pub struct ActivityStore {
    current: RwLock<Arc<LogSnapshot>>,
}

impl ActivityStore {
    /// Wrap an initial snapshot
    pub fn new(snapshot: LogSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The current snapshot
    ///
    /// The returned handle stays valid (and unchanged) across later
    /// [`replace`](Self::replace) calls.
    pub fn snapshot(&self) -> Arc<LogSnapshot> {
        // The lock only ever holds a fully built Arc, so a poisoned lock
        // still holds a consistent snapshot.
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the current snapshot wholesale
    ///
    /// Readers already holding a handle keep the old view; new readers see
    /// the replacement.
    pub fn replace(&self, snapshot: LogSnapshot) {
        let snapshot = Arc::new(snapshot);
        match self.current.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }

        tracing::info!("snapshot replaced");
    }

    /// Statistics of the current snapshot
    pub fn stats(&self) -> SnapshotStats {
        self.snapshot().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::LogRecord;
    use uuid::Uuid;

    fn snapshot_of(timestamps: &[i64]) -> LogSnapshot {
        LogSnapshot::from_records(
            timestamps
                .iter()
                .map(|&t| LogRecord::new(t, "u1", Uuid::from_u128(1)))
                .collect(),
        )
    }

    #[test]
    fn test_replace_swaps_snapshot() {
        let store = ActivityStore::new(snapshot_of(&[10]));
        assert_eq!(store.snapshot().len(), 1);

        store.replace(snapshot_of(&[10, 20, 30]));
        assert_eq!(store.snapshot().len(), 3);
    }

    #[test]
    fn test_old_handle_survives_replace() {
        let store = ActivityStore::new(snapshot_of(&[10]));
        let old = store.snapshot();

        store.replace(snapshot_of(&[10, 20, 30]));

        // The old handle still sees the old view; a fresh one sees the new
        assert_eq!(old.len(), 1);
        assert_eq!(store.snapshot().len(), 3);
    }

    #[test]
    fn test_concurrent_readers() {
        let store = Arc::new(ActivityStore::new(snapshot_of(&[10, 20])));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.snapshot().len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
    }
}
