//! The shader index and the archive that serves compiled artifacts from it.
//!
//! The build writes `index.json` next to the `<uid>.spv` artifacts, mapping
//! each target's relative id to its UID. Consumers open the output folder as
//! a [`FolderArchive`] and look artifacts up by [`TargetId`](frill_common::TargetId).

#![warn(missing_docs)]

pub mod archive;
pub mod error;
pub mod index;

pub use archive::{Archive, FolderArchive};
pub use error::ArchiveError;
pub use index::{write_index, IndexFile, IndexTerm, INDEX_FILE_NAME};
