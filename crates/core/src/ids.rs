//! Persistent-id helpers.
//!
//! Ids are the decimal string form of a 64-bit platform id. Zero is
//! reserved for "invalid", matching the native persistent-id convention.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Parses the decimal string form of a persistent id.
pub fn parse(id: &str) -> Option<u64> {
    match id.parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(value) => Some(value),
    }
}

pub fn format(id: u64) -> String {
    id.to_string()
}

/// Derives a 64-bit id from a group key (a name, a path). Deterministic
/// within a process, which is what cursor stability requires; not durable
/// across runs or backends.
pub fn derive<K: Hash>(key: K) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    match hasher.finish() {
        0 => 1,
        id => id,
    }
}
