//! Config tree resolution: from a source root to the full set of targets.
//!
//! Each directory contributes its own sources, expanded over their
//! multi-compile axes, and then recurses into its subdirectories. Include
//! directories flow downwards only: a directory's `includes` apply to its own
//! targets and every descendant, never to siblings or ancestors.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use frill_common::{fs, Target, TargetId};

use crate::error::ConfigError;
use crate::loader::load_config;
use crate::types::{MultiCompileAxis, SourceSpec, CONFIG_FILE_NAME};

/// Resolves the whole configuration tree rooted at `source_root`.
///
/// Returns every target sorted by id, with empty UIDs.
pub fn resolve_tree(source_root: &Path) -> Result<Vec<Target>, ConfigError> {
    let root = fs::canonicalize(source_root).map_err(|source| ConfigError::InvalidPath {
        config: source_root.join(CONFIG_FILE_NAME),
        source,
    })?;
    resolve_directory(&root, &root, &BTreeSet::new())
}

/// Resolves the targets declared in `dir` and all of its descendants.
///
/// `dir` and `source_root` must be canonical. `inherited` holds the include
/// directories declared by ancestors; it is never modified, each child gets
/// its own augmented copy.
///
/// A subdirectory that leads back to `dir` or to one of the directories on
/// the way down to it is reported as [`ConfigError::SubdirectoryCycle`].
pub fn resolve_directory(
    dir: &Path,
    source_root: &Path,
    inherited: &BTreeSet<PathBuf>,
) -> Result<Vec<Target>, ConfigError> {
    let mut ancestors = Vec::new();
    walk_directory(dir, source_root, inherited, &mut ancestors)
}

/// `ancestors` holds the canonical directories currently being resolved,
/// outermost first.
fn walk_directory(
    dir: &Path,
    source_root: &Path,
    inherited: &BTreeSet<PathBuf>,
    ancestors: &mut Vec<PathBuf>,
) -> Result<Vec<Target>, ConfigError> {
    let config_file = dir.join(CONFIG_FILE_NAME);
    let config = load_config(dir)?;
    let resolver = PathResolver {
        dir,
        config_file: &config_file,
    };

    let mut includes = inherited.clone();
    for include in &config.includes {
        includes.insert(resolver.resolve(include)?);
    }

    let mut targets = TargetSet::default();
    for source in config.sources {
        for target in expand_source(source.into_spec(), &resolver, source_root, &includes)? {
            targets.insert(target)?;
        }
    }

    ancestors.push(dir.to_path_buf());
    for subdir in &config.subdirectories {
        let subdir = resolver.resolve(subdir)?;
        if ancestors.contains(&subdir) {
            return Err(ConfigError::SubdirectoryCycle {
                config: config_file.clone(),
                dir: subdir,
            });
        }
        for target in walk_directory(&subdir, source_root, &includes, ancestors)? {
            targets.insert(target)?;
        }
    }
    ancestors.pop();

    log::debug!(
        "resolved {} target(s) under {}",
        targets.len(),
        dir.display()
    );
    Ok(targets.into_sorted_vec())
}

/// Expands a list of multi-compile axes into every flag combination.
///
/// An axis contributes nothing for its "absent" option. With no axes the
/// result is a single empty set.
pub fn expand_flag_sets(axes: &[MultiCompileAxis]) -> Vec<BTreeSet<String>> {
    let mut combinations = vec![BTreeSet::new()];
    for axis in axes {
        let options = axis.options();
        if options.is_empty() {
            log::warn!("multi_compile axis {axis:?} has no options and yields no targets");
        }
        let mut next = Vec::with_capacity(combinations.len() * options.len());
        for combination in &combinations {
            for option in &options {
                let mut flags = combination.clone();
                if let Some(flag) = option {
                    flags.insert((*flag).to_string());
                }
                next.push(flags);
            }
        }
        combinations = next;
    }
    combinations
}

/// Produces one target per flag combination of a source entry.
fn expand_source(
    spec: SourceSpec,
    resolver: &PathResolver<'_>,
    source_root: &Path,
    includes: &BTreeSet<PathBuf>,
) -> Result<Vec<Target>, ConfigError> {
    let file = spec.file.ok_or_else(|| ConfigError::MissingField {
        path: resolver.config_file.to_path_buf(),
        field: "file".to_string(),
    })?;
    let absolute = resolver.resolve(&file)?;
    let relative_path = fs::relative_to(&absolute, source_root);

    let mut include_dirs = includes.clone();
    for include in &spec.includes {
        include_dirs.insert(resolver.resolve(include)?);
    }

    Ok(expand_flag_sets(&spec.multi_compile)
        .into_iter()
        .map(|flags| Target {
            id: TargetId::new(absolute.clone(), flags),
            relative_path: relative_path.clone(),
            include_dirs: include_dirs.clone(),
            declaring_config_file: resolver.config_file.to_path_buf(),
            uid: String::new(),
        })
        .collect())
}

/// Resolves paths declared in one configuration file.
struct PathResolver<'a> {
    dir: &'a Path,
    config_file: &'a Path,
}

impl PathResolver<'_> {
    fn resolve(&self, path: &Path) -> Result<PathBuf, ConfigError> {
        fs::canonicalize(&self.dir.join(path)).map_err(|source| ConfigError::InvalidPath {
            config: self.config_file.to_path_buf(),
            source,
        })
    }
}

/// Targets keyed by id; inserting an id twice is a configuration error.
#[derive(Default)]
struct TargetSet {
    by_id: HashMap<TargetId, Target>,
}

impl TargetSet {
    fn insert(&mut self, target: Target) -> Result<(), ConfigError> {
        if let Some(existing) = self.by_id.get(&target.id) {
            return Err(ConfigError::DuplicateTarget {
                target: target.id,
                first: existing.declaring_config_file.clone(),
                second: target.declaring_config_file,
            });
        }
        self.by_id.insert(target.id.clone(), target);
        Ok(())
    }

    fn len(&self) -> usize {
        self.by_id.len()
    }

    fn into_sorted_vec(self) -> Vec<Target> {
        let mut targets: Vec<Target> = self.by_id.into_values().collect();
        targets.sort_by(|a, b| a.id.cmp(&b.id));
        targets
    }
}
