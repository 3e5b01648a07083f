//! Immutable log snapshot and its global indexes
//!
//! A `LogSnapshot` owns the full record sequence plus three aggregates
//! derived from it in a single pass at build time:
//!
//! - **users**: every distinct user id
//! - **action counts**: action id → occurrence count
//! - **user-action counts**: (user id, action id) → occurrence count
//!
//! The aggregates answer unbounded-range queries without touching the record
//! sequence; time-bounded queries scan the sequence directly. A snapshot is
//! immutable after [`SnapshotBuilder::finish`], so it can be shared across
//! threads behind `Arc` without locking.

use crate::store::types::LogRecord;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Immutable, fully indexed view of a loaded activity log
///
/// Constructed only through [`SnapshotBuilder`], which keeps the record
/// sequence and all three indexes in lockstep, so the indexes always agree
/// with the sequence.
#[derive(Debug, Default)]
pub struct LogSnapshot {
    /// Records in file read order; not necessarily timestamp-sorted
    records: Vec<LogRecord>,
    /// Every user id seen across the full sequence
    users: HashSet<String>,
    /// action id → occurrence count across the full sequence
    action_counts: HashMap<Uuid, u64>,
    /// (user id, action id) → occurrence count across the full sequence
    user_action_counts: HashMap<(String, Uuid), u64>,
    /// Min/max timestamp over all records, None when empty
    time_bounds: Option<(i64, i64)>,
}

impl LogSnapshot {
    /// Build a snapshot from an in-memory record sequence
    pub fn from_records(records: Vec<LogRecord>) -> Self {
        let mut builder = SnapshotBuilder::with_capacity(records.len());
        for record in records {
            builder.push(record);
        }
        builder.finish()
    }

    /// The full record sequence, in insertion order
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the snapshot holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct users across the full sequence
    pub fn distinct_user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of distinct actions across the full sequence
    pub fn distinct_action_count(&self) -> usize {
        self.action_counts.len()
    }

    /// All distinct user ids, in no particular order
    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(String::as_str)
    }

    /// Occurrence count of one action across the full sequence
    pub fn action_count(&self, action_id: &Uuid) -> u64 {
        self.action_counts.get(action_id).copied().unwrap_or(0)
    }

    /// All (action id, count) pairs, in no particular order
    pub fn action_counts(&self) -> impl Iterator<Item = (Uuid, u64)> + '_ {
        self.action_counts.iter().map(|(id, count)| (*id, *count))
    }

    /// Occurrence count of one (user, action) pair across the full sequence
    ///
    /// An unknown pair counts as zero.
    pub fn user_action_count(&self, user_id: &str, action_id: &Uuid) -> u64 {
        self.user_action_counts
            .get(&(user_id.to_string(), *action_id))
            .copied()
            .unwrap_or(0)
    }

    /// Min and max timestamp over all records, None when empty
    pub fn time_bounds(&self) -> Option<(i64, i64)> {
        self.time_bounds
    }

    /// Estimated in-memory footprint in bytes
    pub fn estimated_size(&self) -> usize {
        let records: usize = self.records.iter().map(LogRecord::estimated_size).sum();
        // Per-entry overhead approximations for the hash structures
        let users: usize = self.users.iter().map(|u| u.len() + 48).sum();
        let actions = self.action_counts.len() * 32;
        let pairs: usize = self
            .user_action_counts
            .keys()
            .map(|(user, _)| user.len() + 64)
            .sum();
        records + users + actions + pairs
    }

    /// Summary statistics for this snapshot
    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            records: self.len(),
            distinct_users: self.distinct_user_count(),
            distinct_actions: self.distinct_action_count(),
            time_bounds: self.time_bounds,
            estimated_bytes: self.estimated_size(),
        }
    }
}

/// Single-pass builder for [`LogSnapshot`]
///
/// Every [`push`](Self::push) appends to the record sequence and updates all
/// three indexes, so a finished snapshot is consistent by construction.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    records: Vec<LogRecord>,
    users: HashSet<String>,
    action_counts: HashMap<Uuid, u64>,
    user_action_counts: HashMap<(String, Uuid), u64>,
    time_bounds: Option<(i64, i64)>,
}

impl SnapshotBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with preallocated record capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Append one record, updating every index
    pub fn push(&mut self, record: LogRecord) {
        if !self.users.contains(&record.user_id) {
            self.users.insert(record.user_id.clone());
        }

        *self.action_counts.entry(record.action_id).or_insert(0) += 1;
        *self
            .user_action_counts
            .entry((record.user_id.clone(), record.action_id))
            .or_insert(0) += 1;

        self.time_bounds = Some(match self.time_bounds {
            Some((min, max)) => (min.min(record.timestamp), max.max(record.timestamp)),
            None => (record.timestamp, record.timestamp),
        });

        self.records.push(record);
    }

    /// Number of records pushed so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if nothing has been pushed yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finish building, yielding the immutable snapshot
    pub fn finish(self) -> LogSnapshot {
        LogSnapshot {
            records: self.records,
            users: self.users,
            action_counts: self.action_counts,
            user_action_counts: self.user_action_counts,
            time_bounds: self.time_bounds,
        }
    }
}

/// Summary of a loaded snapshot
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotStats {
    /// Number of records
    pub records: usize,
    /// Number of distinct users
    pub distinct_users: usize,
    /// Number of distinct actions
    pub distinct_actions: usize,
    /// Min/max timestamp over all records, None when empty
    pub time_bounds: Option<(i64, i64)>,
    /// Estimated in-memory footprint in bytes
    pub estimated_bytes: usize,
}

impl std::fmt::Display for SnapshotStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records, {} users, {} actions, ~{:.1} MB",
            self.records,
            self.distinct_users,
            self.distinct_actions,
            self.estimated_bytes as f64 / (1024.0 * 1024.0)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn sample_snapshot() -> LogSnapshot {
        LogSnapshot::from_records(vec![
            LogRecord::new(10, "u1", action(1)),
            LogRecord::new(20, "u1", action(2)),
            LogRecord::new(30, "u2", action(1)),
        ])
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = SnapshotBuilder::new().finish();

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.distinct_user_count(), 0);
        assert_eq!(snapshot.distinct_action_count(), 0);
        assert_eq!(snapshot.time_bounds(), None);
        assert_eq!(snapshot.action_count(&action(1)), 0);
        assert_eq!(snapshot.user_action_count("u1", &action(1)), 0);
    }

    #[test]
    fn test_indexes_track_records() {
        let snapshot = sample_snapshot();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.distinct_user_count(), 2);
        assert_eq!(snapshot.distinct_action_count(), 2);
        assert_eq!(snapshot.action_count(&action(1)), 2);
        assert_eq!(snapshot.action_count(&action(2)), 1);
        assert_eq!(snapshot.user_action_count("u1", &action(1)), 1);
        assert_eq!(snapshot.user_action_count("u1", &action(2)), 1);
        assert_eq!(snapshot.user_action_count("u2", &action(1)), 1);
        assert_eq!(snapshot.user_action_count("u2", &action(2)), 0);
    }

    #[test]
    fn test_count_sums_equal_record_count() {
        let snapshot = sample_snapshot();

        let action_sum: u64 = snapshot.action_counts().map(|(_, count)| count).sum();
        assert_eq!(action_sum, snapshot.len() as u64);

        // Per-action pair counts sum back to the action's own count
        for (action_id, count) in snapshot.action_counts() {
            let pair_sum: u64 = snapshot
                .users()
                .map(|user| snapshot.user_action_count(user, &action_id))
                .sum();
            assert_eq!(pair_sum, count);
        }
    }

    #[test]
    fn test_users_match_record_projection() {
        let snapshot = sample_snapshot();

        let projected: HashSet<&str> = snapshot
            .records()
            .iter()
            .map(|r| r.user_id.as_str())
            .collect();
        let indexed: HashSet<&str> = snapshot.users().collect();

        assert_eq!(indexed, projected);
    }

    #[test]
    fn test_time_bounds() {
        let snapshot = sample_snapshot();
        assert_eq!(snapshot.time_bounds(), Some((10, 30)));

        // Insertion order does not matter
        let reversed = LogSnapshot::from_records(vec![
            LogRecord::new(30, "u2", action(1)),
            LogRecord::new(10, "u1", action(1)),
        ]);
        assert_eq!(reversed.time_bounds(), Some((10, 30)));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let snapshot = sample_snapshot();

        let timestamps: Vec<i64> = snapshot.records().iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![10, 20, 30]);
    }

    #[test]
    fn test_stats() {
        let snapshot = sample_snapshot();
        let stats = snapshot.stats();

        assert_eq!(stats.records, 3);
        assert_eq!(stats.distinct_users, 2);
        assert_eq!(stats.distinct_actions, 2);
        assert_eq!(stats.time_bounds, Some((10, 30)));
        assert!(stats.estimated_bytes > 0);
    }
}
