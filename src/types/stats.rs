//------------ Types for Statistics -----------------------------------------

use std::fmt::Display;

use serde_derive::Serialize;

//------------ Counters -----------------------------------------------------
//
// This is the struct that's part of the PathStore. It is updated on every
// insertion that adds a path, never on lookups. The store is single-threaded,
// so these are plain integers.

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Counters {
    // number of stored paths that had their peer hop stripped.
    core_paths: u32,
    // number of stored paths that were kept verbatim.
    full_paths: u32,
    // sum of the serialized sizes of all stored paths.
    bytes: usize,
}

impl Counters {
    pub fn paths_count(&self) -> u32 {
        self.core_paths + self.full_paths
    }

    pub fn core_paths_count(&self) -> u32 {
        self.core_paths
    }

    pub fn full_paths_count(&self) -> u32 {
        self.full_paths
    }

    pub fn bytes_count(&self) -> usize {
        self.bytes
    }

    pub fn inc_paths_count(&mut self, is_core: bool, size: usize) {
        if is_core {
            self.core_paths += 1;
        } else {
            self.full_paths += 1;
        }
        self.bytes += size;
    }
}

//------------ PathStoreStats ------------------------------------------------

/// A summary of the contents of a [PathStore](crate::PathStore), as returned
/// by [stats](crate::PathStore::stats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PathStoreStats {
    /// Total number of distinct stored paths.
    pub paths: u32,
    /// Stored paths with the peer hop stripped.
    pub core_paths: u32,
    /// Stored paths kept verbatim.
    pub full_paths: u32,
    /// Number of origin buckets.
    pub buckets: usize,
    /// Number of paths in the largest bucket.
    pub max_bucket_len: usize,
    /// Size of a snapshot of the store in bytes, including the count header.
    pub snapshot_bytes: usize,
}

impl Display for PathStoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "paths:\t\t{}", self.paths)?;
        writeln!(f, "core paths:\t{}", self.core_paths)?;
        writeln!(f, "full paths:\t{}", self.full_paths)?;
        writeln!(f, "buckets:\t{}", self.buckets)?;
        writeln!(f, "largest bucket:\t{}", self.max_bucket_len)?;
        write!(f, "snapshot size:\t{}k", self.snapshot_bytes / 1024)
    }
}
