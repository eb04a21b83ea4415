//! Per-task `#include` resolution.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use frill_cache::DependencyTimestamps;
use frill_common::fs;

use crate::error::IncludeError;

/// Deepest include nesting accepted before a compile fails.
pub const MAX_INCLUDE_DEPTH: usize = 50;

/// How an include was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeKind {
    /// `#include "name"`: the including file's directory is tried first.
    Relative,
    /// `#include <name>`: only the include directories are searched.
    Standard,
}

/// A successfully resolved include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInclude {
    /// Canonical path of the included file.
    pub path: PathBuf,
    /// The file's content.
    pub content: String,
}

/// Resolves includes for one compile task.
///
/// Created when the task starts and consumed when it ends; nothing is shared
/// between tasks. Every resolved file is recorded once in the task's
/// [`DependencyTimestamps`] and its content is kept for repeated requests.
#[derive(Debug)]
pub struct IncludeResolver {
    include_dirs: Vec<PathBuf>,
    contents: HashMap<PathBuf, String>,
    deps: DependencyTimestamps,
}

impl IncludeResolver {
    /// Creates a resolver searching `include_dirs` in lexicographic order and
    /// recording into `deps`.
    pub fn new(include_dirs: &BTreeSet<PathBuf>, deps: DependencyTimestamps) -> Self {
        Self {
            include_dirs: include_dirs.iter().cloned().collect(),
            contents: HashMap::new(),
            deps,
        }
    }

    /// Resolves `requested` as included from `requesting_file` at nesting
    /// `depth` (1 for an include in the top-level source).
    pub fn resolve(
        &mut self,
        requested: &str,
        kind: IncludeKind,
        requesting_file: &Path,
        depth: usize,
    ) -> Result<ResolvedInclude, IncludeError> {
        if depth > MAX_INCLUDE_DEPTH {
            return Err(IncludeError::DepthExceeded {
                limit: MAX_INCLUDE_DEPTH,
            });
        }

        let path = self
            .locate(requested, kind, requesting_file)
            .ok_or_else(|| IncludeError::NotFound {
                requested: requested.to_string(),
                from: requesting_file.to_path_buf(),
            })?;

        if let Some(content) = self.contents.get(&path) {
            return Ok(ResolvedInclude {
                path,
                content: content.clone(),
            });
        }

        let content = fs::read_to_string(&path)?;
        self.deps.record(&path)?;
        self.contents.insert(path.clone(), content.clone());
        log::trace!("resolved include {requested} -> {}", path.display());
        Ok(ResolvedInclude { path, content })
    }

    /// Number of distinct files resolved so far.
    pub fn resolved_count(&self) -> usize {
        self.contents.len()
    }

    /// Hands back the dependency timestamps, including everything resolved.
    pub fn into_dependencies(self) -> DependencyTimestamps {
        self.deps
    }

    fn locate(&self, requested: &str, kind: IncludeKind, requesting_file: &Path) -> Option<PathBuf> {
        let local = match kind {
            IncludeKind::Relative => requesting_file.parent(),
            IncludeKind::Standard => None,
        };
        local
            .into_iter()
            .chain(self.include_dirs.iter().map(PathBuf::as_path))
            .map(|dir| dir.join(requested))
            .find(|candidate| fs::is_file(candidate))
            .and_then(|found| fs::canonicalize(&found).ok())
    }
}
