//! Shared foundational types used across the Frill shader build pipeline.
//!
//! This crate provides the target identity model ([`TargetId`], [`Target`]),
//! deterministic UID assignment, and the filesystem/timestamp gateway that
//! every other stage goes through.

#![warn(missing_docs)]

pub mod error;
pub mod fs;
pub mod target;
pub mod target_id;
pub mod uid;

pub use error::FsError;
pub use target::Target;
pub use target_id::TargetId;
pub use uid::{assign_uids, assign_uids_with, uid_digest};
