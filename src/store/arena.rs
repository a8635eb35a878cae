//------------ ChunkedVec ----------------------------------------------------
//
// Append-only storage made of fixed-capacity chunks. A chunk is allocated
// with its full capacity up front and is never grown beyond it, so pushing
// an element never moves any of the elements that are already stored. Used
// by the origin buckets of the PathStore.
//
// All allocation goes through `try_reserve_exact`, so a failing allocation
// is reported to the caller and leaves the storage untouched.

use crate::types::errors::PathStoreResult;

#[derive(Debug)]
pub(crate) struct ChunkedVec<T> {
    chunks: Vec<Vec<T>>,
    chunk_size: usize,
    len: usize,
}

impl<T> ChunkedVec<T> {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunks: Vec::new(),
            chunk_size: chunk_size.max(1),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.chunks
            .get(idx / self.chunk_size)
            .and_then(|c| c.get(idx % self.chunk_size))
    }

    // Makes sure that the next push will not allocate. Calling this more than
    // once without pushing is a no-op.
    pub fn reserve_one(&mut self) -> PathStoreResult<()> {
        if self.len < self.chunks.len() * self.chunk_size {
            return Ok(());
        }
        self.chunks.try_reserve(1)?;
        let mut chunk = Vec::new();
        chunk.try_reserve_exact(self.chunk_size)?;
        self.chunks.push(chunk);
        Ok(())
    }

    /// Appends `value` and returns its index. Fails only if a new chunk
    /// could not be allocated, in which case `value` is dropped and the
    /// storage is unchanged.
    pub fn push(&mut self, value: T) -> PathStoreResult<usize> {
        self.reserve_one()?;
        let idx = self.len;
        if let Some(chunk) = self.chunks.last_mut() {
            debug_assert!(chunk.len() < chunk.capacity());
            chunk.push(value);
        }
        self.len += 1;
        Ok(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.chunks.iter().flatten()
    }
}
