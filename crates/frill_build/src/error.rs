//! Error types for compilation and for the build as a whole.

use std::path::PathBuf;

use frill_archive::ArchiveError;
use frill_cache::CacheError;
use frill_common::FsError;
use frill_config::ConfigError;

/// Failure of a single `#include` lookup.
#[derive(Debug, thiserror::Error)]
pub enum IncludeError {
    /// Nesting went deeper than the allowed limit, usually an include cycle.
    #[error("include depth exceeds {limit}")]
    DepthExceeded {
        /// The maximum nesting depth.
        limit: usize,
    },

    /// No candidate directory contains the requested file.
    #[error("failed to resolve include `{requested}` from {}", from.display())]
    NotFound {
        /// The name as written in the directive.
        requested: String,
        /// The file containing the directive.
        from: PathBuf,
    },

    /// The file was found but could not be read or stat-ed.
    #[error("failed to read include: {0}")]
    Read(#[from] FsError),
}

/// Failure to build one target. Never aborts sibling targets.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The source file could not be read.
    #[error("failed to read source: {0}")]
    Read(#[source] FsError),

    /// No shader stage could be derived from the extension or flags.
    #[error("{reason}: {}", path.display())]
    UnknownStage {
        /// The source file.
        path: PathBuf,
        /// Why the stage could not be inferred.
        reason: &'static str,
    },

    /// The compiler rejected the source. Include failures end up here too.
    #[error("{diagnostic}")]
    Compiler {
        /// Diagnostic text as reported by the compiler.
        diagnostic: String,
    },

    /// The artifact could not be written.
    #[error("failed to write artifact: {0}")]
    Write(#[source] FsError),

    /// The dependency record could not be refreshed.
    #[error("failed to update cache: {0}")]
    Cache(#[from] CacheError),

    /// The compile task panicked.
    #[error(transparent)]
    Panicked(#[from] TaskPanic),
}

/// A task submitted to the [`ThreadPool`](crate::ThreadPool) panicked or was
/// lost before producing a result.
#[derive(Debug, Clone, thiserror::Error)]
#[error("task panicked: {message}")]
pub struct TaskPanic {
    /// The panic payload, if it was a string.
    pub message: String,
}

/// Errors that abort a whole build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The configuration tree could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The index could not be written.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// An output or cache directory could not be prepared.
    #[error(transparent)]
    Io(#[from] FsError),
}
