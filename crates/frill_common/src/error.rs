//! Error type for the filesystem gateway.

use std::path::PathBuf;

/// An I/O failure on a specific path.
///
/// The gateway attaches the offending path to every error so callers can
/// report it without threading the path through separately.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// Reading, writing or stat-ing a path failed.
    #[error("{action} {path}: {source}")]
    Io {
        /// What was being attempted ("failed to open", "failed to write", ...).
        action: &'static str,
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl FsError {
    pub(crate) fn io(action: &'static str, path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns the path this error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } => path,
        }
    }
}
