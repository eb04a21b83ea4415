//! A resolved compilation unit.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use crate::target_id::TargetId;

/// File extension of compiled artifacts.
pub const ARTIFACT_EXT: &str = "spv";

/// One resolved compilation unit, produced by config tree resolution.
///
/// Equality and hashing delegate to [`id`](Self::id) only: two targets with
/// the same id are the same target whatever their other fields say. `uid` is
/// empty until UIDs are assigned and must not change afterwards.
#[derive(Clone, Debug)]
pub struct Target {
    /// Canonical source path plus flags.
    pub id: TargetId,
    /// Source path relative to the build's source root.
    pub relative_path: PathBuf,
    /// Canonical include directories searched for `#include` directives.
    pub include_dirs: BTreeSet<PathBuf>,
    /// Canonical path of the configuration file that declared this target.
    pub declaring_config_file: PathBuf,
    /// Short unique name for this target's artifacts.
    pub uid: String,
}

impl Target {
    /// The identity persisted in the index: relative path (with `/`
    /// separators) plus flags.
    pub fn relative_id(&self) -> TargetId {
        let portable = self.relative_path.to_string_lossy().replace('\\', "/");
        self.id.with_path(portable)
    }

    /// File name of this target's compiled artifact (`<uid>.spv`).
    pub fn artifact_file_name(&self) -> String {
        format!("{}.{ARTIFACT_EXT}", self.uid)
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Target {}

impl Hash for Target {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
