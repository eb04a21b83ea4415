//! Read side: serving compiled artifacts by target id.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use frill_common::{fs, target::ARTIFACT_EXT, TargetId};

use crate::error::ArchiveError;
use crate::index::{IndexFile, INDEX_FILE_NAME};

/// Something that can hand out compiled shader bytes.
pub trait Archive {
    /// Returns the artifact for `id`, or `None` if it is unknown or unreadable.
    fn load(&self, id: &TargetId) -> Option<Vec<u8>>;
}

/// An [`Archive`] over a build output folder.
///
/// The index is read once at [`open`](Self::open); artifact files are read on
/// each lookup.
#[derive(Debug, Clone)]
pub struct FolderArchive {
    folder: PathBuf,
    uids: HashMap<TargetId, String>,
}

impl FolderArchive {
    /// Opens the output folder `folder` by loading its `index.json`.
    pub fn open(folder: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let folder = folder.into();
        let index = IndexFile::load(&folder.join(INDEX_FILE_NAME))?;
        let uids = index
            .terms
            .into_iter()
            .map(|term| (term.target, term.uid))
            .collect();
        Ok(Self { folder, uids })
    }

    /// The folder this archive reads from.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Number of indexed targets.
    pub fn len(&self) -> usize {
        self.uids.len()
    }

    /// Returns `true` if the index lists no targets.
    pub fn is_empty(&self) -> bool {
        self.uids.is_empty()
    }

    /// The UID recorded for `id`.
    pub fn uid_of(&self, id: &TargetId) -> Option<&str> {
        self.uids.get(id).map(String::as_str)
    }

    /// Looks up an artifact by relative source path and flags.
    pub fn load_by_path(&self, relative_path: &str, flags: &[&str]) -> Option<Vec<u8>> {
        self.load(&TargetId::new(relative_path, flags.iter().copied()))
    }
}

impl Archive for FolderArchive {
    fn load(&self, id: &TargetId) -> Option<Vec<u8>> {
        let uid = self.uid_of(id)?;
        let path = self.folder.join(format!("{uid}.{ARTIFACT_EXT}"));
        match fs::read_bytes(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::debug!("artifact for {id} unavailable: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::write_index;
    use frill_common::Target;
    use std::collections::BTreeSet;

    fn target(relative: &str, flags: &[&str], uid: &str) -> Target {
        Target {
            id: TargetId::new(format!("/src/{relative}"), flags.iter().copied()),
            relative_path: PathBuf::from(relative),
            include_dirs: BTreeSet::new(),
            declaring_config_file: PathBuf::from("/src/frill.json"),
            uid: uid.to_string(),
        }
    }

    fn built_folder() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let targets = [
            target("lit/a.frag", &["FOG"], "00000000000000AA"),
            target("lit/a.frag", &[], "00000000000000BB"),
            target("b.vert", &[], "00000000000000CC"),
        ];
        write_index(dir.path(), &targets).unwrap();
        std::fs::write(dir.path().join("00000000000000AA.spv"), b"fog").unwrap();
        std::fs::write(dir.path().join("00000000000000BB.spv"), b"plain").unwrap();
        dir
    }

    #[test]
    fn lookup_by_id() {
        let dir = built_folder();
        let archive = FolderArchive::open(dir.path()).unwrap();
        assert_eq!(archive.len(), 3);
        assert_eq!(
            archive.load(&TargetId::new("lit/a.frag", ["FOG"])),
            Some(b"fog".to_vec())
        );
        assert_eq!(
            archive.uid_of(&TargetId::new("lit/a.frag", Vec::<String>::new())),
            Some("00000000000000BB")
        );
    }

    #[test]
    fn lookup_by_path_and_flags() {
        let dir = built_folder();
        let archive = FolderArchive::open(dir.path()).unwrap();
        assert_eq!(archive.load_by_path("lit/a.frag", &[]), Some(b"plain".to_vec()));
        assert_eq!(archive.load_by_path("lit/a.frag", &["FOG"]), Some(b"fog".to_vec()));
    }

    #[test]
    fn unknown_id_is_none() {
        let dir = built_folder();
        let archive = FolderArchive::open(dir.path()).unwrap();
        assert_eq!(archive.load(&TargetId::new("lit/a.frag", ["SHADOWS"])), None);
        assert_eq!(archive.load_by_path("missing.frag", &[]), None);
    }

    #[test]
    fn missing_artifact_is_none() {
        let dir = built_folder();
        let archive = FolderArchive::open(dir.path()).unwrap();
        assert!(archive.uid_of(&TargetId::new("b.vert", Vec::<String>::new())).is_some());
        assert_eq!(archive.load_by_path("b.vert", &[]), None);
    }

    #[test]
    fn artifacts_are_read_lazily() {
        let dir = built_folder();
        let archive = FolderArchive::open(dir.path()).unwrap();
        std::fs::write(dir.path().join("00000000000000CC.spv"), b"late").unwrap();
        assert_eq!(archive.load_by_path("b.vert", &[]), Some(b"late".to_vec()));
    }

    #[test]
    fn open_without_index_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            FolderArchive::open(dir.path()),
            Err(ArchiveError::Io(_))
        ));
    }
}
