//! Error types for cache operations.

use std::path::PathBuf;

use frill_common::FsError;

/// Errors that can occur while reading or writing dependency records.
///
/// Reads are fail-safe at the [`BuildCache`](crate::BuildCache) level: any
/// error there turns into a "stale" verdict. These errors only surface from
/// writes and from direct record access.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Reading, writing or stat-ing a cache-related file failed.
    #[error("cache I/O error: {0}")]
    Io(#[from] FsError),

    /// A dependency record could not be encoded or decoded.
    #[error("malformed dependency record {}: {reason}", path.display())]
    Serialization {
        /// The record file path.
        path: PathBuf,
        /// Description of the serialization failure.
        reason: String,
    },
}
