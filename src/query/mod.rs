//! Aggregate queries over a log snapshot
//!
//! Three stateless, read-only operations, each taking an inclusive
//! [`TimeRange`](crate::store::TimeRange):
//!
//! - distinct user count
//! - top-K most frequent actions
//! - occurrence count for a (user, action) pair
//!
//! # Strategy selection
//!
//! ```text
//! range == UNBOUNDED → precomputed global index, no records touched
//! anything else      → one linear scan with on-the-fly aggregation
//! ```
//!
//! Both strategies return identical results for ranges that happen to cover
//! every record; the index path just skips the scan.

mod engine;

pub use engine::{ActionCount, QueryEngine};
