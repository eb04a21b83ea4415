//! Error types for configuration loading and tree resolution.
//!
//! Every variant is fatal to the build and names the configuration file it
//! came from.

use std::path::PathBuf;

use frill_common::{FsError, TargetId};

/// Errors that can occur while loading or resolving the configuration tree.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file is missing or unreadable.
    #[error("failed to load config {}: {source}", path.display())]
    Io {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying filesystem error.
        source: FsError,
    },

    /// The configuration file is not valid JSON or a field has the wrong type.
    #[error("failed to load config {}: {reason}", path.display())]
    Parse {
        /// The configuration file path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A required field is missing from an entry.
    #[error("{}: missing required field `{field}`", path.display())]
    MissingField {
        /// The configuration file path.
        path: PathBuf,
        /// Location of the missing field, e.g. `sources[2].file`.
        field: String,
    },

    /// A declared source, include or subdirectory path cannot be resolved.
    #[error("{}: {source}", config.display())]
    InvalidPath {
        /// The configuration file that declared the path.
        config: PathBuf,
        /// The resolution failure, naming the path.
        source: FsError,
    },

    /// Two entries in the tree resolve to the same target id.
    #[error(
        "target {target} is emitted multiple times (first in {}, second in {})",
        first.display(),
        second.display()
    )]
    DuplicateTarget {
        /// The duplicated identity.
        target: TargetId,
        /// Configuration file of the first declaration.
        first: PathBuf,
        /// Configuration file of the second declaration.
        second: PathBuf,
    },

    /// A subdirectory entry leads back to a directory already being resolved.
    #[error("{}: subdirectory {} forms a cycle", config.display(), dir.display())]
    SubdirectoryCycle {
        /// The configuration file declaring the subdirectory.
        config: PathBuf,
        /// The canonical directory that was already on the path.
        dir: PathBuf,
    },
}
