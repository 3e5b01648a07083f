//! # Actlog
//!
//! In-memory analytics engine for append-only user activity logs.
//!
//! Actlog ingests flat CSV files of `timestamp,user_id,action_id` records
//! into a single immutable snapshot and answers three aggregate queries,
//! each optionally restricted to an inclusive timestamp range:
//!
//! - **Distinct users**: how many different users appear
//! - **Top-K actions**: the most frequent actions, ranked
//! - **Pair count**: how often one user performed one action
//!
//! Unbounded queries are answered from global indexes precomputed at load
//! time; time-bounded queries fall back to a single linear scan over the
//! record sequence. It is a load-once, query-many batch tool: no
//! persistence, no streaming ingestion, no network surface.
//!
//! ## Modules
//!
//! - [`store`]: records, snapshots and the three global indexes
//! - [`loader`]: CSV ingestion from a data directory
//! - [`query`]: the three aggregate queries
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use actlog::{LogLoader, QueryEngine, TimeRange};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load every .csv file under ./data into one indexed snapshot
//!     let (snapshot, report) = LogLoader::new().load_dir(Path::new("./data"))?;
//!     println!("loaded {} records from {} files", report.records, report.files);
//!
//!     let engine = QueryEngine::new(Arc::new(snapshot));
//!
//!     // Unbounded queries hit the precomputed indexes
//!     let users = engine.count_distinct_users(TimeRange::UNBOUNDED);
//!     let top = engine.top_k_actions(5, TimeRange::UNBOUNDED);
//!
//!     // Bounded queries scan the record sequence
//!     let recent = engine.count_distinct_users(TimeRange::last_days(7));
//!
//!     println!("{users} users total, {recent} active this week, top: {top:?}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod loader;
pub mod query;
pub mod store;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError, DataConfig, LoggingConfig};
pub use loader::{LoadError, LoadReport, LogLoader, ParseErrorKind};
pub use query::{ActionCount, QueryEngine};
pub use store::{
    ActivityStore, LogRecord, LogSnapshot, SnapshotBuilder, SnapshotStats, TimeRange,
};
