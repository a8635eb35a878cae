//------------ Config --------------------------------------------------------

//! Configuration options for a [PathStore](crate::PathStore).
//!
//! ```
//! use aspath_store::PathStore;
//! use aspath_store::config::PathStoreConfig;
//!
//! let config = PathStoreConfig::default().with_chunk_size(64);
//! let store = PathStore::new_with_config(config);
//! assert_eq!(store.size(), 0);
//! ```

use serde_derive::{Deserialize, Serialize};

/// The number of paths in a chunk of an origin bucket, unless configured
/// otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 16;

/// Tuning knobs for the memory layout of a store. None of these influence
/// which `PathId` a path receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathStoreConfig {
    /// The number of paths that are allocated at once when an origin bucket
    /// grows. Most origins have only a handful of distinct paths, so this
    /// should stay small. A value of 0 is treated as 1.
    pub chunk_size: usize,
    /// The number of origin buckets to allocate room for up front.
    pub initial_buckets: usize,
}

impl PathStoreConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_initial_buckets(mut self, initial_buckets: usize) -> Self {
        self.initial_buckets = initial_buckets;
        self
    }

    pub(crate) fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}

impl Default for PathStoreConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            initial_buckets: 0,
        }
    }
}
