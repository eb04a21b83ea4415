//! Staleness decisions and record refresh for individual targets.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use frill_common::{fs, Target};

use crate::error::CacheError;
use crate::record::{DependencyRecord, DependencyTimestamps};

/// File extension of dependency records.
const RECORD_EXT: &str = "tm.json";

/// Why a target needs recompiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// No record exists for the target's UID.
    NoRecord,
    /// The record exists but cannot be read or parsed.
    Unreadable(String),
    /// The record belongs to a different target id.
    TargetChanged,
    /// A recorded input no longer exists.
    MissingDependency(PathBuf),
    /// A recorded input's timestamp differs from the recorded one.
    ChangedDependency(PathBuf),
    /// The include directory set differs from the recorded one.
    IncludesChanged,
    /// The build was asked to ignore the cache.
    Forced,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::NoRecord => write!(f, "no dependency record"),
            StaleReason::Unreadable(reason) => write!(f, "unreadable record: {reason}"),
            StaleReason::TargetChanged => write!(f, "target identity changed"),
            StaleReason::MissingDependency(path) => {
                write!(f, "dependency {} is missing", path.display())
            }
            StaleReason::ChangedDependency(path) => {
                write!(f, "dependency {} changed", path.display())
            }
            StaleReason::IncludesChanged => write!(f, "include directories changed"),
            StaleReason::Forced => write!(f, "forced rebuild"),
        }
    }
}

/// Result of comparing a target against its dependency record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// Nothing changed since the last successful compile.
    UpToDate,
    /// The target must be recompiled.
    Stale(StaleReason),
}

impl Staleness {
    /// Returns `true` for [`Staleness::Stale`].
    pub fn is_stale(&self) -> bool {
        matches!(self, Staleness::Stale(_))
    }
}

/// Dependency records stored as `<cache_dir>/<uid>.tm.json`.
#[derive(Debug, Clone)]
pub struct BuildCache {
    cache_dir: PathBuf,
}

impl BuildCache {
    /// Creates a cache rooted at `cache_dir`. Nothing is touched on disk
    /// until a record is stored.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// The root directory of the records.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Where the record for `target` lives. The target must have a UID.
    pub fn record_path(&self, target: &Target) -> PathBuf {
        self.cache_dir.join(format!("{}.{RECORD_EXT}", target.uid))
    }

    /// Returns `true` if `target` must be recompiled.
    pub fn is_stale(&self, target: &Target) -> bool {
        self.check(target).is_stale()
    }

    /// Compares `target` against its record.
    ///
    /// Never fails: a missing or malformed record is reported as stale.
    /// Timestamps are compared as strings, so any difference counts as a
    /// change regardless of direction.
    pub fn check(&self, target: &Target) -> Staleness {
        let path = self.record_path(target);
        if !fs::exists(&path) {
            return Staleness::Stale(StaleReason::NoRecord);
        }

        let record = match DependencyRecord::load(&path) {
            Ok(record) => record,
            Err(e) => {
                log::debug!("failed to load cache {}: {e}", path.display());
                return Staleness::Stale(StaleReason::Unreadable(e.to_string()));
            }
        };

        if record.target != target.id {
            return Staleness::Stale(StaleReason::TargetChanged);
        }

        for dep in &record.deps {
            if !fs::exists(&dep.path) {
                return Staleness::Stale(StaleReason::MissingDependency(dep.path.clone()));
            }
            match fs::timestamp_string(&dep.path) {
                Ok(stamp) if stamp == dep.time_stamp => {}
                _ => return Staleness::Stale(StaleReason::ChangedDependency(dep.path.clone())),
            }
        }

        let recorded_includes: BTreeSet<PathBuf> = record.includes.into_iter().collect();
        if recorded_includes != target.include_dirs {
            return Staleness::Stale(StaleReason::IncludesChanged);
        }

        Staleness::UpToDate
    }

    /// Writes a fresh record for `target` after a successful compile.
    ///
    /// `deps` holds the source and every include resolved during the compile;
    /// `output` (the produced artifact) is added to it here.
    pub fn store(
        &self,
        target: &Target,
        mut deps: DependencyTimestamps,
        output: &Path,
    ) -> Result<(), CacheError> {
        deps.record(output)?;
        let record = DependencyRecord {
            target: target.id.clone(),
            deps: deps.into_dependencies(),
            includes: target.include_dirs.iter().cloned().collect(),
        };
        record.save(&self.record_path(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frill_common::TargetId;
    use std::time::{Duration, SystemTime};

    struct Fixture {
        _dir: tempfile::TempDir,
        cache: BuildCache,
        target: Target,
        source: PathBuf,
        include: PathBuf,
        output: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let source = root.join("a.frag");
        let include = root.join("inc").join("common.glsl");
        let output = root.join("out").join("0000000000000001.spv");
        std::fs::create_dir_all(include.parent().unwrap()).unwrap();
        std::fs::create_dir_all(output.parent().unwrap()).unwrap();
        std::fs::write(&source, "#include <common.glsl>").unwrap();
        std::fs::write(&include, "").unwrap();
        std::fs::write(&output, b"spv").unwrap();

        let target = Target {
            id: TargetId::new(&source, ["FOG"]),
            relative_path: PathBuf::from("a.frag"),
            include_dirs: BTreeSet::from([root.join("inc")]),
            declaring_config_file: root.join("frill.json"),
            uid: "0000000000000001".to_string(),
        };
        Fixture {
            cache: BuildCache::new(root.join("cache")),
            _dir: dir,
            target,
            source,
            include,
            output,
        }
    }

    fn store(f: &Fixture) {
        let mut deps = DependencyTimestamps::new();
        deps.record(&f.source).unwrap();
        deps.record(&f.include).unwrap();
        f.cache.store(&f.target, deps, &f.output).unwrap();
    }

    fn touch(path: &Path) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(3600))
            .unwrap();
    }

    #[test]
    fn no_record_is_stale() {
        let f = fixture();
        assert_eq!(f.cache.check(&f.target), Staleness::Stale(StaleReason::NoRecord));
    }

    #[test]
    fn fresh_record_is_up_to_date() {
        let f = fixture();
        store(&f);
        assert_eq!(f.cache.check(&f.target), Staleness::UpToDate);
        assert!(!f.cache.is_stale(&f.target));
    }

    #[test]
    fn record_contains_source_include_and_output() {
        let f = fixture();
        store(&f);
        let record = DependencyRecord::load(&f.cache.record_path(&f.target)).unwrap();
        let paths: Vec<_> = record.deps.iter().map(|d| d.path.clone()).collect();
        assert_eq!(paths.len(), 3);
        assert!(paths.contains(&f.source));
        assert!(paths.contains(&f.include));
        assert!(paths.contains(&f.output));
    }

    #[test]
    fn touching_source_is_stale() {
        let f = fixture();
        store(&f);
        touch(&f.source);
        assert_eq!(
            f.cache.check(&f.target),
            Staleness::Stale(StaleReason::ChangedDependency(f.source.clone()))
        );
    }

    #[test]
    fn touching_include_is_stale() {
        let f = fixture();
        store(&f);
        touch(&f.include);
        assert!(f.cache.is_stale(&f.target));
    }

    #[test]
    fn deleting_output_is_stale() {
        let f = fixture();
        store(&f);
        std::fs::remove_file(&f.output).unwrap();
        assert_eq!(
            f.cache.check(&f.target),
            Staleness::Stale(StaleReason::MissingDependency(f.output.clone()))
        );
    }

    #[test]
    fn changed_flags_are_stale() {
        let f = fixture();
        store(&f);
        let mut changed = f.target.clone();
        changed.id = TargetId::new(&f.source, ["FOG", "SHADOWS"]);
        assert_eq!(
            f.cache.check(&changed),
            Staleness::Stale(StaleReason::TargetChanged)
        );
    }

    #[test]
    fn added_include_dir_is_stale() {
        let f = fixture();
        store(&f);
        let mut changed = f.target.clone();
        changed.include_dirs.insert(PathBuf::from("/elsewhere"));
        assert_eq!(
            f.cache.check(&changed),
            Staleness::Stale(StaleReason::IncludesChanged)
        );
    }

    #[test]
    fn replaced_include_dir_is_stale() {
        let f = fixture();
        store(&f);
        let mut changed = f.target.clone();
        changed.include_dirs = BTreeSet::from([PathBuf::from("/elsewhere")]);
        assert!(f.cache.is_stale(&changed));
    }

    #[test]
    fn repeated_recorded_include_does_not_mask_a_new_one() {
        let f = fixture();
        store(&f);
        let path = f.cache.record_path(&f.target);
        let mut record = DependencyRecord::load(&path).unwrap();
        let inc = record.includes[0].clone();
        record.includes = vec![inc.clone(), inc];
        record.save(&path).unwrap();

        let mut changed = f.target.clone();
        changed.include_dirs.insert(PathBuf::from("/elsewhere"));
        assert_eq!(
            f.cache.check(&changed),
            Staleness::Stale(StaleReason::IncludesChanged)
        );
    }

    #[test]
    fn corrupt_record_is_stale_not_fatal() {
        let f = fixture();
        let path = f.cache.record_path(&f.target);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "garbage").unwrap();
        assert!(matches!(
            f.cache.check(&f.target),
            Staleness::Stale(StaleReason::Unreadable(_))
        ));
    }

    #[test]
    fn record_path_uses_uid() {
        let f = fixture();
        assert!(f
            .cache
            .record_path(&f.target)
            .ends_with("0000000000000001.tm.json"));
    }

    #[test]
    fn reason_display() {
        assert_eq!(StaleReason::NoRecord.to_string(), "no dependency record");
        assert_eq!(
            StaleReason::ChangedDependency(PathBuf::from("/a.frag")).to_string(),
            "dependency /a.frag changed"
        );
    }
}
