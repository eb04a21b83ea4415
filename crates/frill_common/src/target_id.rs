//! Identity of a compilation unit: a canonical source path plus a flag set.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Identifies one compilation unit by source path and active flags.
///
/// Flags are held in a sorted set, so equality is set equality and the derived
/// `Hash` visits flags in sorted order: two ids built from the same flags in a
/// different insertion order (or round-tripped through JSON) compare and hash
/// identically. Serialized as `{"path": ..., "flags": [...]}`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId {
    path: PathBuf,
    flags: BTreeSet<String>,
}

impl TargetId {
    /// Creates a target id. Duplicate flags collapse into one.
    pub fn new<P, I, S>(path: P, flags: I) -> Self
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            flags: flags.into_iter().map(Into::into).collect(),
        }
    }

    /// The source path this id refers to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The active flags, in sorted order.
    pub fn flags(&self) -> &BTreeSet<String> {
        &self.flags
    }

    /// Returns a copy of this id with the same flags but a different path.
    pub fn with_path(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            flags: self.flags.clone(),
        }
    }

    /// Flags joined with `", "`, for messages.
    pub fn flag_list(&self) -> String {
        self.flags
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.path.display(), self.flag_list())
    }
}
