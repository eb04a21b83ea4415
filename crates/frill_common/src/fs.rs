//! Filesystem and timestamp gateway.
//!
//! All reads, writes, existence checks and modification-time queries made by
//! the pipeline go through these functions. Timestamp queries are serialized
//! behind one process-wide lock; plain reads and writes are not.

use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use parking_lot::Mutex;

use crate::error::FsError;

/// Guards every modification-time query in the process.
static TIMESTAMP_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Reads a whole file into memory.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, FsError> {
    std::fs::read(path).map_err(|e| FsError::io("failed to open", path, e))
}

/// Reads a whole file as UTF-8 text.
pub fn read_to_string(path: &Path) -> Result<String, FsError> {
    std::fs::read_to_string(path).map_err(|e| FsError::io("failed to open", path, e))
}

/// Writes `data` to `path`, creating parent directories as needed.
pub fn write_bytes(path: &Path, data: &[u8]) -> Result<(), FsError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| FsError::io("failed to create", dir, e))?;
    }
    std::fs::write(path, data).map_err(|e| FsError::io("failed to write", path, e))
}

/// Creates `path` and all missing ancestors.
pub fn create_dir_all(path: &Path) -> Result<(), FsError> {
    std::fs::create_dir_all(path).map_err(|e| FsError::io("failed to create", path, e))
}

/// Returns `true` if something exists at `path`.
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Returns `true` if `path` is an existing regular file (following symlinks).
pub fn is_file(path: &Path) -> bool {
    path.is_file()
}

/// Resolves `path` to a canonical absolute path. The path must exist.
pub fn canonicalize(path: &Path) -> Result<PathBuf, FsError> {
    std::fs::canonicalize(path).map_err(|e| FsError::io("failed to resolve", path, e))
}

/// Returns the last modification time of `path` as a comparable string.
///
/// The format is `<seconds>.<nanoseconds>` since the Unix epoch (negative for
/// pre-epoch times). Callers must only compare these strings for equality.
pub fn timestamp_string(path: &Path) -> Result<String, FsError> {
    let _guard = TIMESTAMP_LOCK.lock();
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| FsError::io("failed to stat", path, e))?;
    Ok(match modified.duration_since(UNIX_EPOCH) {
        Ok(d) => format!("{}.{:09}", d.as_secs(), d.subsec_nanos()),
        Err(e) => {
            let d = e.duration();
            format!("-{}.{:09}", d.as_secs(), d.subsec_nanos())
        }
    })
}

/// Expresses `path` relative to `base`, inserting `..` where `path` is not
/// below `base`. Both paths are expected to be absolute and canonical.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix(base) {
        return stripped.to_path_buf();
    }
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part.as_os_str());
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("out.spv");
        write_bytes(&path, b"\x03\x02\x23\x07").unwrap();
        assert!(exists(&path));
        assert_eq!(read_bytes(&path).unwrap(), b"\x03\x02\x23\x07");
    }

    #[test]
    fn read_missing_file_errors() {
        let err = read_to_string(Path::new("/nonexistent/shader.frag")).unwrap_err();
        assert!(err.to_string().contains("failed to open"));
    }

    #[test]
    fn timestamp_is_stable_without_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.vert");
        std::fs::write(&path, "void main() {}").unwrap();
        assert_eq!(
            timestamp_string(&path).unwrap(),
            timestamp_string(&path).unwrap()
        );
    }

    #[test]
    fn timestamp_changes_when_mtime_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.vert");
        std::fs::write(&path, "void main() {}").unwrap();
        let before = timestamp_string(&path).unwrap();

        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();
        drop(file);

        assert_ne!(before, timestamp_string(&path).unwrap());
    }

    #[test]
    fn timestamp_of_missing_file_errors() {
        assert!(timestamp_string(Path::new("/nonexistent/a.vert")).is_err());
    }

    #[test]
    fn is_file_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.glsl");
        std::fs::write(&path, "").unwrap();
        assert!(is_file(&path));
        assert!(exists(dir.path()));
        assert!(!is_file(dir.path()));
        assert!(!is_file(&dir.path().join("missing.glsl")));
    }

    #[test]
    fn relative_below_base() {
        let rel = relative_to(Path::new("/src/shaders/a.frag"), Path::new("/src"));
        assert_eq!(rel, PathBuf::from("shaders/a.frag"));
    }

    #[test]
    fn relative_outside_base() {
        let rel = relative_to(Path::new("/lib/common/a.frag"), Path::new("/src/shaders"));
        assert_eq!(rel, PathBuf::from("../../lib/common/a.frag"));
    }
}
