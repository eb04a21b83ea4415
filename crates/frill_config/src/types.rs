//! Configuration types deserialized from `frill.json`.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;

/// Name of the configuration file looked up in every directory of the tree.
pub const CONFIG_FILE_NAME: &str = "frill.json";

/// The contents of one directory's `frill.json`.
///
/// All paths are relative to the directory holding the file (absolute paths
/// are used as-is).
#[derive(Debug, Default, Deserialize)]
pub struct DirectoryConfig {
    /// Shader sources declared in this directory.
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    /// Include directories applied to this directory's targets and to every
    /// descendant directory.
    #[serde(default)]
    pub includes: Vec<PathBuf>,
    /// Child directories, each with its own `frill.json`.
    #[serde(default)]
    pub subdirectories: Vec<PathBuf>,
}

/// A declared source: either a bare path or a detailed object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SourceEntry {
    /// A bare path with no extra includes and no variants.
    Path(PathBuf),
    /// A source with its own includes and multi-compile axes.
    Detailed(SourceSpec),
}

/// The object form of a source entry.
#[derive(Debug, Default, Deserialize)]
pub struct SourceSpec {
    /// Source file path. Required; an entry without one is rejected.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Include directories used only by this source's targets.
    #[serde(default)]
    pub includes: Vec<PathBuf>,
    /// Axes of variation expanded into one target per flag combination.
    #[serde(default)]
    pub multi_compile: Vec<MultiCompileAxis>,
}

impl SourceEntry {
    /// Views this entry in its object form.
    pub fn into_spec(self) -> SourceSpec {
        match self {
            SourceEntry::Path(file) => SourceSpec {
                file: Some(file),
                ..SourceSpec::default()
            },
            SourceEntry::Detailed(spec) => spec,
        }
    }
}

/// One axis of variation in a `multi_compile` list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MultiCompileAxis {
    /// `"FLAG"`: the flag is either absent or present.
    Flag(String),
    /// `["A", "B"]`: absent, or exactly one of the listed flags.
    Flags(Vec<String>),
    /// `{"options": [...], "can_off": bool}`: one of the options, plus absent
    /// unless `can_off` is `false`.
    Detailed {
        /// Mutually exclusive flags.
        options: Vec<String>,
        /// Whether the axis may be switched off entirely.
        #[serde(default = "default_can_off")]
        can_off: bool,
    },
}

fn default_can_off() -> bool {
    true
}

impl MultiCompileAxis {
    /// Returns the distinct options of this axis, `None` standing for "absent".
    ///
    /// An empty flag name is treated as absent.
    pub fn options(&self) -> BTreeSet<Option<&str>> {
        let (flags, can_off): (Vec<&str>, bool) = match self {
            MultiCompileAxis::Flag(flag) => (vec![flag.as_str()], true),
            MultiCompileAxis::Flags(flags) => (flags.iter().map(String::as_str).collect(), true),
            MultiCompileAxis::Detailed { options, can_off } => {
                (options.iter().map(String::as_str).collect(), *can_off)
            }
        };

        let mut options: BTreeSet<Option<&str>> = flags
            .into_iter()
            .map(|flag| (!flag.is_empty()).then_some(flag))
            .collect();
        if can_off {
            options.insert(None);
        }
        options
    }
}
