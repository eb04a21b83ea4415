//! The persisted per-target dependency record.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use frill_common::{fs, FsError, TargetId};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// One recorded input of a compile and its timestamp at that time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Canonical path of the input.
    pub path: PathBuf,
    /// Timestamp string from [`fs::timestamp_string`].
    pub time_stamp: String,
}

/// Snapshot of a target's identity, inputs and include directories, written
/// after a successful compile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// The target's id at compile time.
    pub target: TargetId,
    /// Source file, every resolved include, and the produced artifact.
    pub deps: Vec<Dependency>,
    /// The target's include directories at compile time.
    pub includes: Vec<PathBuf>,
}

impl DependencyRecord {
    /// Reads a record from disk.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| CacheError::Serialization {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Writes the record to disk as pretty-printed JSON, creating directories
    /// as needed.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write_bytes(path, json.as_bytes())?;
        Ok(())
    }
}

/// Timestamps of the files a single compile task touched.
///
/// Owned by one task and discarded with it. Each path is stat-ed at most once.
#[derive(Debug, Default, Clone)]
pub struct DependencyTimestamps {
    stamps: BTreeMap<PathBuf, String>,
}

impl DependencyTimestamps {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `path`'s current timestamp unless it is already recorded.
    ///
    /// Returns `true` if the path was newly recorded.
    pub fn record(&mut self, path: &Path) -> Result<bool, FsError> {
        if self.stamps.contains_key(path) {
            return Ok(false);
        }
        let stamp = fs::timestamp_string(path)?;
        self.stamps.insert(path.to_path_buf(), stamp);
        Ok(true)
    }

    /// Returns `true` if `path` has been recorded.
    pub fn contains(&self, path: &Path) -> bool {
        self.stamps.contains_key(path)
    }

    /// Number of recorded paths.
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Converts the map into record entries, sorted by path.
    pub fn into_dependencies(self) -> Vec<Dependency> {
        self.stamps
            .into_iter()
            .map(|(path, time_stamp)| Dependency { path, time_stamp })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("ABCD.tm.json");
        let record = DependencyRecord {
            target: TargetId::new("/src/a.frag", ["FOG"]),
            deps: vec![Dependency {
                path: PathBuf::from("/src/a.frag"),
                time_stamp: "1700000000.000000000".to_string(),
            }],
            includes: vec![PathBuf::from("/src/inc")],
        };
        record.save(&path).unwrap();

        let loaded = DependencyRecord::load(&path).unwrap();
        assert_eq!(loaded.target, record.target);
        assert_eq!(loaded.deps, record.deps);
        assert_eq!(loaded.includes, record.includes);
    }

    #[test]
    fn record_uses_documented_field_names() {
        let record = DependencyRecord {
            target: TargetId::new("/src/a.frag", Vec::<String>::new()),
            deps: vec![],
            includes: vec![],
        };
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        assert!(value["target"]["path"].is_string());
        assert!(value["target"]["flags"].is_array());
        assert!(value["deps"].is_array());
        assert!(value["includes"].is_array());
    }

    #[test]
    fn load_corrupt_record_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.tm.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            DependencyRecord::load(&path),
            Err(CacheError::Serialization { .. })
        ));
    }

    #[test]
    fn timestamps_record_each_path_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("common.glsl");
        std::fs::write(&path, "").unwrap();

        let mut stamps = DependencyTimestamps::new();
        assert!(stamps.record(&path).unwrap());
        assert!(!stamps.record(&path).unwrap());
        assert_eq!(stamps.len(), 1);
        assert!(stamps.contains(&path));
    }

    #[test]
    fn timestamps_of_missing_file_error() {
        let mut stamps = DependencyTimestamps::new();
        assert!(stamps.record(Path::new("/nonexistent/x.glsl")).is_err());
        assert!(stamps.is_empty());
    }
}
