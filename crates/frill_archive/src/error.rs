//! Error types for index reading and writing.

use std::path::PathBuf;

use frill_common::FsError;

/// Errors raised while writing or opening an index.
///
/// Artifact lookups never produce these; they report `None` instead.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The index file could not be read or written.
    #[error("index I/O error: {0}")]
    Io(#[from] FsError),

    /// The index file content is not a valid index.
    #[error("malformed index {}: {reason}", path.display())]
    Parse {
        /// The index file path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },
}
