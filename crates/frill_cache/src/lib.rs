//! Incremental build cache.
//!
//! After a target compiles, its inputs (source, resolved includes, produced
//! artifact) are recorded with their modification timestamps in a
//! [`DependencyRecord`]. On the next build [`BuildCache::check`] compares that
//! record against the filesystem and the target's current configuration to
//! decide whether the target must be recompiled.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod record;

pub use cache::{BuildCache, StaleReason, Staleness};
pub use error::CacheError;
pub use record::{Dependency, DependencyRecord, DependencyTimestamps};
