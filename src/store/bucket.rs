use log::trace;

use crate::types::as_path::AsPath;
use crate::types::errors::{PathStoreError, PathStoreResult};

use super::arena::ChunkedVec;
use super::store_path::StorePath;

/// The largest number of paths a bucket can hold: local ids are u16.
pub(crate) const MAX_BUCKET_LEN: usize = u16::MAX as usize + 1;

//------------ OriginBucket --------------------------------------------------

// All the paths in a store that share the same origin hash, in insertion
// order. The position of a path in the bucket is its local id. Paths are
// never removed or reordered, so local ids stay valid for the lifetime of
// the store.
#[derive(Debug)]
pub(crate) struct OriginBucket {
    origin_hash: u32,
    paths: ChunkedVec<StorePath>,
}

impl OriginBucket {
    pub fn new(origin_hash: u32, chunk_size: usize) -> Self {
        Self {
            origin_hash,
            paths: ChunkedVec::new(chunk_size),
        }
    }

    pub fn origin_hash(&self) -> u32 {
        self.origin_hash
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn get(&self, local_id: u16) -> Option<&StorePath> {
        self.paths.get(local_id as usize)
    }

    // Linear scan for a path with exactly these bytes and this core flag.
    pub fn find(&self, bytes: &[u8], is_core: bool) -> Option<u16> {
        self.paths
            .iter()
            .position(|sp| sp.matches(bytes, is_core))
            .and_then(|pos| u16::try_from(pos).ok())
    }

    // Checks that a path can be appended without failing, and returns the
    // local id it will receive. Allocates the next chunk if needed.
    pub fn reserve(&mut self) -> PathStoreResult<u16> {
        let local_id = u16::try_from(self.paths.len()).map_err(|_| {
            PathStoreError::BucketFull {
                origin_hash: self.origin_hash,
            }
        })?;
        self.paths.reserve_one()?;
        Ok(local_id)
    }

    // Appends a path. `reserve` must have been called before, so that this
    // cannot fail halfway through an insertion in the store.
    pub fn push(
        &mut self,
        path: AsPath,
        is_core: bool,
        idx: u32,
    ) -> PathStoreResult<u16> {
        let local_id = self.reserve()?;
        trace!(
            "bucket {:#010x}: new path {} at local id {} (idx {})",
            self.origin_hash,
            path,
            local_id,
            idx
        );
        self.paths.push(StorePath::new(path, is_core, idx))?;
        Ok(local_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StorePath> + '_ {
        self.paths.iter()
    }
}
