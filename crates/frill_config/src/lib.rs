//! Parsing of per-directory `frill.json` files and resolution of the
//! configuration tree into concrete compilation targets.
//!
//! A build starts at the source root's `frill.json`, which may declare
//! sources, include directories and subdirectories with their own
//! configuration. [`resolve_tree`] walks that tree and produces every
//! [`Target`](frill_common::Target) variant, with inherited include
//! directories merged and duplicates rejected.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, parse_config};
pub use resolve::{expand_flag_sets, resolve_directory, resolve_tree};
pub use types::*;
