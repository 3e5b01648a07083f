//! Core data types for the activity log store
//!
//! This module defines the fundamental types used throughout the crate:
//! - `LogRecord`: a single activity log entry
//! - `TimeRange`: an inclusive timestamp interval for queries

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single activity log entry
///
/// One user performed one action at one point in time. Records are immutable
/// once created and live for the lifetime of the snapshot that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Identifier of the user who performed the action
    pub user_id: String,
    /// Identifier of the action performed
    pub action_id: Uuid,
}

impl LogRecord {
    /// Create a new record
    pub fn new(timestamp: i64, user_id: impl Into<String>, action_id: Uuid) -> Self {
        Self {
            timestamp,
            user_id: user_id.into(),
            action_id,
        }
    }

    /// Get estimated size in bytes (for memory reporting)
    pub fn estimated_size(&self) -> usize {
        // timestamp(8) + action_id(16) + String header(24) + string bytes
        8 + 16 + 24 + self.user_id.len()
    }
}

/// Time range for queries (inclusive on both ends: [start, end])
///
/// [`TimeRange::UNBOUNDED`] covers every representable timestamp and selects
/// the precomputed-index path in the query engine. A range with
/// `start > end` is valid and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start timestamp (inclusive), in milliseconds
    pub start: i64,
    /// End timestamp (inclusive), in milliseconds
    pub end: i64,
}

impl TimeRange {
    /// The range covering every representable timestamp
    pub const UNBOUNDED: TimeRange = TimeRange {
        start: i64::MIN,
        end: i64::MAX,
    };

    /// Create a new time range
    ///
    /// `start > end` is allowed and produces a range that matches nothing.
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Range from `start` onward
    pub fn since(start: i64) -> Self {
        Self {
            start,
            end: i64::MAX,
        }
    }

    /// Range up to and including `end`
    pub fn until(end: i64) -> Self {
        Self {
            start: i64::MIN,
            end,
        }
    }

    /// Create a range for the last N hours from now
    pub fn last_hours(hours: i64) -> Self {
        let end = Utc::now().timestamp_millis();
        let start = end - (hours * 3600 * 1000);
        Self { start, end }
    }

    /// Create a range for the last N days from now
    pub fn last_days(days: i64) -> Self {
        Self::last_hours(days * 24)
    }

    /// Whether this range covers every representable timestamp
    pub fn is_unbounded(&self) -> bool {
        self.start == i64::MIN && self.end == i64::MAX
    }

    /// Whether this range can match no timestamp at all
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Check if a timestamp falls within this range
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_record_creation() {
        let record = LogRecord::new(1000, "u1", action(1));

        assert_eq!(record.timestamp, 1000);
        assert_eq!(record.user_id, "u1");
        assert_eq!(record.action_id, action(1));
        assert!(record.estimated_size() > 0);
    }

    #[test]
    fn test_record_serialization() {
        let record = LogRecord::new(1000, "u1", action(1));
        let json = serde_json::to_string(&record).unwrap();
        let restored: LogRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, restored);
    }

    #[test]
    fn test_time_range_contains_both_ends() {
        let range = TimeRange::new(1000, 2000);

        assert!(!range.contains(999));
        assert!(range.contains(1000));
        assert!(range.contains(1500));
        assert!(range.contains(2000));
        assert!(!range.contains(2001));
    }

    #[test]
    fn test_unbounded_range() {
        let range = TimeRange::UNBOUNDED;

        assert!(range.is_unbounded());
        assert!(!range.is_empty());
        assert!(range.contains(i64::MIN));
        assert!(range.contains(0));
        assert!(range.contains(i64::MAX));

        // Pinning either end leaves the range bounded
        assert!(!TimeRange::since(0).is_unbounded());
        assert!(!TimeRange::until(0).is_unbounded());
    }

    #[test]
    fn test_empty_range() {
        let range = TimeRange::new(100, 50);

        assert!(range.is_empty());
        assert!(!range.contains(75));
        assert!(!range.contains(100));
        assert!(!range.contains(50));
    }
}
