//! Activity Log Store
//!
//! In-memory storage for append-only activity logs:
//!
//! - **types**: core data structures (LogRecord, TimeRange)
//! - **snapshot**: immutable snapshot holding the record sequence and the
//!   three global indexes
//! - **engine**: shared snapshot handle with atomic reload
//!
//! # Architecture
//!
//! ```text
//! Load Path:
//!   CSV files → Loader → SnapshotBuilder (records + indexes, one pass) → LogSnapshot
//!
//! Read Path:
//!   Query → unbounded range? → index lookup
//!                       else → linear scan over the record sequence
//! ```

pub mod engine;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
pub use engine::ActivityStore;
pub use snapshot::{LogSnapshot, SnapshotBuilder, SnapshotStats};
pub use types::{LogRecord, TimeRange};
