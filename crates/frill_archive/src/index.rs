//! The persisted index: every target's relative id paired with its UID.

use std::path::Path;

use frill_common::{fs, Target, TargetId};
use serde::{Deserialize, Serialize};

use crate::error::ArchiveError;

/// File name of the index inside the output folder.
pub const INDEX_FILE_NAME: &str = "index.json";

/// One index entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexTerm {
    /// Relative source path (with `/` separators) plus flags.
    pub target: TargetId,
    /// Artifact name stem inside the output folder.
    pub uid: String,
}

/// The whole index, serialized as a top-level JSON array of [`IndexTerm`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexFile {
    /// Entries in target order.
    pub terms: Vec<IndexTerm>,
}

impl IndexFile {
    /// Builds the index for a complete target set.
    pub fn from_targets(targets: &[Target]) -> Self {
        let mut terms: Vec<IndexTerm> = targets
            .iter()
            .map(|t| IndexTerm {
                target: t.relative_id(),
                uid: t.uid.clone(),
            })
            .collect();
        terms.sort_by(|a, b| a.target.cmp(&b.target));
        Self { terms }
    }

    /// Reads an index file.
    pub fn load(path: &Path) -> Result<Self, ArchiveError> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| ArchiveError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Writes the index as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ArchiveError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| ArchiveError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write_bytes(path, json.as_bytes())?;
        Ok(())
    }
}

/// Writes `<output_root>/index.json` listing every target in `targets`.
///
/// Always rewrites the file, whether or not anything was recompiled.
pub fn write_index(output_root: &Path, targets: &[Target]) -> Result<(), ArchiveError> {
    let index = IndexFile::from_targets(targets);
    let path = output_root.join(INDEX_FILE_NAME);
    index.save(&path)?;
    log::debug!("wrote {} index entries to {}", index.terms.len(), path.display());
    Ok(())
}
