//! Deterministic UID assignment.
//!
//! Each target gets a 16-hex-digit name derived from its identity. Targets are
//! visited in `TargetId` order so the outcome of collision back-off does not
//! depend on how the target list happened to be built.

use std::collections::HashSet;

use crate::target::Target;
use crate::target_id::TargetId;

/// Appended to the digest input on collision before rehashing.
const COLLISION_MARKER: char = '#';

/// The default UID digest: XXH3-64 of the input string.
pub fn uid_digest(input: &str) -> u64 {
    xxhash_rust::xxh3::xxh3_64(input.as_bytes())
}

/// Canonical digest input for an id: path, then each sorted flag, each flag
/// preceded by a NUL separator.
fn digest_input(id: &TargetId) -> String {
    let mut input = id.path().to_string_lossy().into_owned();
    for flag in id.flags() {
        input.push('\0');
        input.push_str(flag);
    }
    input
}

/// Assigns a unique UID to every target using [`uid_digest`].
///
/// Sorts `targets` by id as a side effect. Must run before any concurrent
/// phase starts.
pub fn assign_uids(targets: &mut [Target]) {
    assign_uids_with(targets, uid_digest);
}

/// Assigns a unique UID to every target using the given digest function.
///
/// When a digest is already taken by an earlier target, the marker character
/// is appended to the input and the digest recomputed until it is free.
pub fn assign_uids_with<F>(targets: &mut [Target], digest: F)
where
    F: Fn(&str) -> u64,
{
    targets.sort_by(|a, b| a.id.cmp(&b.id));

    let mut taken = HashSet::with_capacity(targets.len());
    for target in targets.iter_mut() {
        let mut input = digest_input(&target.id);
        let mut value = digest(&input);
        while !taken.insert(value) {
            input.push(COLLISION_MARKER);
            value = digest(&input);
        }
        target.uid = format!("{value:016X}");
    }
}
