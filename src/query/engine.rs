//! Query engine: the three aggregate operations
//!
//! Stateless pure reads over an `Arc<LogSnapshot>`. Each operation picks
//! between the snapshot's precomputed global indexes (unbounded range) and a
//! single linear scan with on-the-fly aggregation (bounded range), and emits
//! a `tracing::debug!` event with elapsed time, records scanned and the
//! strategy chosen.

use crate::store::{LogSnapshot, TimeRange};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// An action id with its occurrence count, as ranked by the top-K query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionCount {
    /// The action identifier
    pub action_id: Uuid,
    /// Occurrences within the queried range
    pub count: u64,
}

/// Executes aggregate queries against one snapshot
///
/// Holding a `QueryEngine` pins its snapshot: queries keep returning
/// consistent results even if the owning store swaps in a new snapshot
/// concurrently.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    snapshot: Arc<LogSnapshot>,
}

impl QueryEngine {
    /// Create an engine reading from `snapshot`
    pub fn new(snapshot: Arc<LogSnapshot>) -> Self {
        Self { snapshot }
    }

    /// The snapshot this engine reads from
    pub fn snapshot(&self) -> &LogSnapshot {
        &self.snapshot
    }

    /// Number of distinct users with at least one record in `range`
    ///
    /// The unbounded range is answered from the distinct-user index in O(1);
    /// bounded ranges scan the record sequence once, collecting user ids
    /// into a temporary set.
    pub fn count_distinct_users(&self, range: TimeRange) -> usize {
        let start = Instant::now();

        let (result, scanned, strategy) = if range.is_unbounded() {
            (self.snapshot.distinct_user_count(), 0, "index")
        } else {
            let mut users: HashSet<&str> = HashSet::new();
            for record in self.snapshot.records() {
                if range.contains(record.timestamp) {
                    users.insert(record.user_id.as_str());
                }
            }
            (users.len(), self.snapshot.len(), "scan")
        };

        tracing::debug!(
            elapsed_us = start.elapsed().as_micros() as u64,
            scanned,
            strategy,
            "count_distinct_users"
        );

        result
    }

    /// The `k` most frequent actions in `range`, most frequent first
    ///
    /// Ties are broken by ascending action id, so the ordering is
    /// deterministic. Returns fewer than `k` entries when fewer distinct
    /// actions occur in the range; `k == 0` returns an empty vec.
    pub fn top_k_actions(&self, k: usize, range: TimeRange) -> Vec<Uuid> {
        self.top_k_action_counts(k, range)
            .into_iter()
            .map(|entry| entry.action_id)
            .collect()
    }

    /// Like [`top_k_actions`](Self::top_k_actions), but keeps the counts
    pub fn top_k_action_counts(&self, k: usize, range: TimeRange) -> Vec<ActionCount> {
        if k == 0 {
            return Vec::new();
        }

        let start = Instant::now();

        let (mut ranked, scanned, strategy) = if range.is_unbounded() {
            let ranked: Vec<ActionCount> = self
                .snapshot
                .action_counts()
                .map(|(action_id, count)| ActionCount { action_id, count })
                .collect();
            (ranked, 0, "index")
        } else {
            let mut counts: HashMap<Uuid, u64> = HashMap::new();
            for record in self.snapshot.records() {
                if range.contains(record.timestamp) {
                    *counts.entry(record.action_id).or_insert(0) += 1;
                }
            }
            let ranked: Vec<ActionCount> = counts
                .into_iter()
                .map(|(action_id, count)| ActionCount { action_id, count })
                .collect();
            (ranked, self.snapshot.len(), "scan")
        };

        ranked.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.action_id.cmp(&b.action_id))
        });
        ranked.truncate(k);

        tracing::debug!(
            elapsed_us = start.elapsed().as_micros() as u64,
            scanned,
            strategy,
            k,
            "top_k_actions"
        );

        ranked
    }

    /// Number of times `user_id` performed `action_id` in `range`
    ///
    /// The unbounded range is a direct lookup in the pair-count index; an
    /// unknown pair yields 0, never an error. Bounded ranges scan the
    /// record sequence once.
    pub fn count_user_action(&self, user_id: &str, action_id: &Uuid, range: TimeRange) -> u64 {
        let start = Instant::now();

        let (result, scanned, strategy) = if range.is_unbounded() {
            (
                self.snapshot.user_action_count(user_id, action_id),
                0,
                "index",
            )
        } else {
            let matched = self
                .snapshot
                .records()
                .iter()
                .filter(|r| {
                    range.contains(r.timestamp)
                        && r.user_id == user_id
                        && r.action_id == *action_id
                })
                .count() as u64;
            (matched, self.snapshot.len(), "scan")
        };

        tracing::debug!(
            elapsed_us = start.elapsed().as_micros() as u64,
            scanned,
            strategy,
            "count_user_action"
        );

        result
    }
}
