use std::borrow::Cow;
use std::collections::{hash_map, HashMap};

use inetnum::asn::Asn;
use log::{debug, trace};

use crate::config::PathStoreConfig;
use crate::types::as_path::{self, AsPath, HopPath};
use crate::types::errors::{PathStoreError, PathStoreResult};
use crate::types::path_id::PathId;
use crate::types::stats::{Counters, PathStoreStats};

use super::bucket::OriginBucket;
use super::codec::{self, SnapshotReader, SNAPSHOT_HEADER_SIZE};
use super::store_path::{starts_with_peer, StorePath};

//------------ Origin hash ---------------------------------------------------

const FNV_OFFSET: u32 = 0x811c9dc5;
const FNV_PRIME: u32 = 0x01000193;

fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET, |h, b| {
        (h ^ u32::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

/// Returns the hash that selects the origin bucket for the encoded path in
/// `path_bytes`: a 32-bit FNV-1a over the origin hop, encoded as a path of
/// its own. An empty path hashes to the FNV offset basis.
///
/// The hash is stable across processes and platforms, which is what makes
/// a replayed snapshot hand out the same path IDs.
pub fn origin_hash(path_bytes: &[u8]) -> PathStoreResult<u32> {
    hops_origin_hash(&as_path::hop_path(path_bytes))
}

fn hops_origin_hash(hops: &HopPath) -> PathStoreResult<u32> {
    match hops.origin() {
        Some(origin) => {
            let origin = HopPath::from(vec![origin.clone()]);
            Ok(fnv1a_32(&as_path::encode_hops(&origin)?))
        }
        None => Ok(FNV_OFFSET),
    }
}

// Splits off the peer hop if the path starts with a plain ASN hop for
// `peer_asn`. Returns the bytes to store, their origin hash and whether they
// are a core path.
fn strip_peer(
    path: &AsPath,
    peer_asn: Asn,
) -> PathStoreResult<(Cow<'_, [u8]>, u32, bool)> {
    let hops = path.to_hop_path();
    if !starts_with_peer(&hops, peer_asn) {
        let hash = hops_origin_hash(&hops)?;
        return Ok((Cow::Borrowed(path.as_bytes()), hash, false));
    }
    let core =
        HopPath::from(hops.iter().skip(1).cloned().collect::<Vec<_>>());
    let hash = hops_origin_hash(&core)?;
    Ok((Cow::Owned(as_path::encode_hops(&core)?), hash, true))
}

//------------ PathStore -----------------------------------------------------

/// A deduplicating store for AS paths.
///
/// Paths are handed to the store together with the ASN of the peer that
/// observed them. If the path starts with a hop for that peer, the hop is
/// stripped, and only the remainder, the core path, is stored. This allows
/// all peers that see the same path behind their own hop to share one
/// entry. Every distinct (bytes, core flag) pair is stored exactly once and
/// is identified by a [PathId].
///
/// Paths are partitioned in buckets by the hash of their origin segment;
/// the search for an existing copy of a path only looks at the bucket for
/// its origin. Paths are never removed from a store.
///
/// The store is not thread-safe. It is meant to be owned by a single
/// processing pipeline; concurrent producers need to synchronize access
/// themselves.
#[derive(Debug)]
pub struct PathStore {
    buckets: HashMap<u32, OriginBucket>,
    // idx -> path id, for every stored path
    by_idx: Vec<PathId>,
    counters: Counters,
    config: PathStoreConfig,
}

impl PathStore {
    /// Creates an empty store with the default configuration.
    pub fn new() -> Self {
        Self::new_with_config(PathStoreConfig::default())
    }

    pub fn new_with_config(config: PathStoreConfig) -> Self {
        Self {
            buckets: HashMap::with_capacity(config.initial_buckets),
            by_idx: Vec::new(),
            counters: Counters::default(),
            config,
        }
    }

    pub fn config(&self) -> &PathStoreConfig {
        &self.config
    }

    /// The number of distinct paths in the store.
    pub fn size(&self) -> u32 {
        self.counters.paths_count()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns the ID of `path` as observed by the peer with `peer_asn`,
    /// adding the path to the store if it is not in there yet.
    ///
    /// Asking for the ID of a path that is already stored does not change
    /// the store. The only errors are resource errors: allocation failure,
    /// a full origin bucket or a full store. In that case the store is left
    /// as it was.
    pub fn get_path_id(
        &mut self,
        path: &AsPath,
        peer_asn: Asn,
    ) -> PathStoreResult<PathId> {
        let (bytes, origin_hash, is_core) = strip_peer(path, peer_asn)?;

        if let Some(local_id) = self
            .buckets
            .get(&origin_hash)
            .and_then(|b| b.find(&bytes, is_core))
        {
            trace!("found path {} for peer {}", path, peer_asn);
            return Ok(PathId::new(origin_hash, local_id));
        }

        self.add_path(origin_hash, &bytes, is_core)
    }

    /// Adds the encoded path in `path_bytes` to the store without looking
    /// for an existing copy of it.
    ///
    /// This is meant for rebuilding a store from a snapshot; the caller is
    /// responsible for not inserting the same path twice. Inserting the
    /// entries of a snapshot in their original order results in the same
    /// path IDs as in the store the snapshot was taken from. Use
    /// [get_path_id](Self::get_path_id) everywhere else.
    pub fn insert_path(
        &mut self,
        path_bytes: &[u8],
        is_core: bool,
    ) -> PathStoreResult<PathId> {
        as_path::validate(path_bytes)?;
        self.add_path(origin_hash(path_bytes)?, path_bytes, is_core)
    }

    // Appends a path to the bucket for `origin_hash`. Everything that can
    // fail is done before the store is modified.
    fn add_path(
        &mut self,
        origin_hash: u32,
        bytes: &[u8],
        is_core: bool,
    ) -> PathStoreResult<PathId> {
        codec::encoded_len(bytes)?;
        let idx = u32::try_from(self.by_idx.len())
            .ok()
            .filter(|idx| *idx < u32::MAX)
            .ok_or(PathStoreError::StoreFull)?;

        self.by_idx.try_reserve(1)?;
        let mut owned = Vec::new();
        owned.try_reserve_exact(bytes.len())?;
        owned.extend_from_slice(bytes);
        self.buckets.try_reserve(1)?;

        let chunk_size = self.config.effective_chunk_size();
        let bucket = self.buckets.entry(origin_hash).or_insert_with(|| {
            debug!("new origin bucket {:#010x}", origin_hash);
            OriginBucket::new(origin_hash, chunk_size)
        });

        let reserved = bucket.reserve();
        if let Err(err) = reserved {
            // Do not leave a bucket behind that we created for nothing.
            if bucket.len() == 0 {
                self.buckets.remove(&origin_hash);
            }
            return Err(err);
        }

        let size = codec::ENTRY_HEADER_SIZE + owned.len();
        let local_id =
            bucket.push(AsPath::from_valid_bytes(owned), is_core, idx)?;
        let id = PathId::new(origin_hash, local_id);
        self.by_idx.push(id);
        self.counters.inc_paths_count(is_core, size);

        Ok(id)
    }

    /// Returns the stored path for `id`, or `None` if the ID does not refer
    /// to a path in this store.
    pub fn get_store_path(&self, id: PathId) -> Option<&StorePath> {
        self.buckets
            .get(&id.origin_hash())
            .and_then(|b| b.get(id.local_id()))
    }

    /// Returns the ID and the stored path with ordinal `idx`.
    pub fn get_by_idx(&self, idx: u32) -> Option<(PathId, &StorePath)> {
        let id = *self.by_idx.get(idx as usize)?;
        self.get_store_path(id).map(|sp| (id, sp))
    }

    /// Returns an iterator over all stored paths. Every path is visited
    /// exactly once, the order is unspecified but does not change as long
    /// as the store is not modified.
    pub fn iter(&self) -> PathStoreIter<'_> {
        PathStoreIter::new(self)
    }

    /// Returns an iterator over all stored paths in ordinal order.
    pub fn iter_by_idx(
        &self,
    ) -> impl Iterator<Item = (PathId, &StorePath)> + '_ {
        self.by_idx
            .iter()
            .filter_map(|id| self.get_store_path(*id).map(|sp| (*id, sp)))
    }

    pub fn stats(&self) -> PathStoreStats {
        PathStoreStats {
            paths: self.size(),
            core_paths: self.counters.core_paths_count(),
            full_paths: self.counters.full_paths_count(),
            buckets: self.buckets.len(),
            max_bucket_len: self
                .buckets
                .values()
                .map(|b| b.len())
                .max()
                .unwrap_or(0),
            snapshot_bytes: SNAPSHOT_HEADER_SIZE
                + self.counters.bytes_count(),
        }
    }

    //-------- Snapshots ----------------------------------------------------

    /// Serializes all paths in the store, in ordinal order, preceded by the
    /// number of paths.
    pub fn serialize(&self) -> PathStoreResult<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(self.stats().snapshot_bytes)?;
        codec::encode_snapshot_header(self.size(), &mut buf);
        for (_, sp) in self.iter_by_idx() {
            sp.encode_into(&mut buf)?;
        }
        Ok(buf)
    }

    /// Writes the snapshot produced by [serialize](Self::serialize) to
    /// `writer`.
    pub fn write_snapshot<W: std::io::Write>(
        &self,
        writer: &mut W,
    ) -> PathStoreResult<()> {
        writer.write_all(&self.serialize()?)?;
        Ok(())
    }

    /// Rebuilds a store from a snapshot, with the default configuration.
    pub fn from_snapshot(bytes: &[u8]) -> PathStoreResult<Self> {
        Self::from_snapshot_with_config(bytes, PathStoreConfig::default())
    }

    pub fn from_snapshot_with_config(
        bytes: &[u8],
        config: PathStoreConfig,
    ) -> PathStoreResult<Self> {
        let mut store = Self::new_with_config(config);
        let reader = SnapshotReader::new(bytes)?;
        store.by_idx.try_reserve_exact(reader.remaining() as usize)?;

        for entry in reader {
            let entry = entry?;
            store.insert_path(entry.path, entry.is_core)?;
        }

        debug!(
            "loaded {} paths in {} origin buckets from snapshot",
            store.size(),
            store.buckets.len()
        );
        Ok(store)
    }
}

impl Default for PathStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a PathStore {
    type Item = (PathId, &'a StorePath);
    type IntoIter = PathStoreIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//------------ PathStoreIter -------------------------------------------------

/// A cursor over all paths in a [PathStore].
///
/// The cursor keeps its own position, so any number of them can be used on
/// the same store at the same time. It can be driven explicitly with
/// [has_more](Self::has_more), [get_path](Self::get_path),
/// [get_path_id](Self::get_path_id) and [advance](Self::advance), or used as
/// an [Iterator] over `(PathId, &StorePath)` pairs.
#[derive(Clone, Debug)]
pub struct PathStoreIter<'a> {
    store: &'a PathStore,
    buckets: hash_map::Values<'a, u32, OriginBucket>,
    current: Option<&'a OriginBucket>,
    local_id: usize,
}

impl<'a> PathStoreIter<'a> {
    fn new(store: &'a PathStore) -> Self {
        let mut iter = Self {
            store,
            buckets: store.buckets.values(),
            current: None,
            local_id: 0,
        };
        iter.first();
        iter
    }

    /// Moves the cursor back to the first path in the store.
    pub fn first(&mut self) {
        self.buckets = self.store.buckets.values();
        self.local_id = 0;
        self.current = self.next_bucket();
    }

    fn next_bucket(&mut self) -> Option<&'a OriginBucket> {
        self.buckets.by_ref().find(|b| b.len() > 0)
    }

    /// Moves the cursor to the next path. Does nothing once the cursor has
    /// run past the last path.
    pub fn advance(&mut self) {
        if let Some(bucket) = self.current {
            self.local_id += 1;
            if self.local_id >= bucket.len() {
                self.local_id = 0;
                self.current = self.next_bucket();
            }
        }
    }

    /// Whether the cursor points at a path.
    pub fn has_more(&self) -> bool {
        self.current.is_some_and(|b| self.local_id < b.len())
    }

    /// The path the cursor points at.
    pub fn get_path(&self) -> Option<&'a StorePath> {
        let local_id = u16::try_from(self.local_id).ok()?;
        self.current.and_then(|b| b.get(local_id))
    }

    /// The ID of the path the cursor points at.
    pub fn get_path_id(&self) -> Option<PathId> {
        let local_id = u16::try_from(self.local_id).ok()?;
        self.current
            .filter(|b| self.local_id < b.len())
            .map(|b| PathId::new(b.origin_hash(), local_id))
    }
}

impl<'a> Iterator for PathStoreIter<'a> {
    type Item = (PathId, &'a StorePath);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.get_path_id().zip(self.get_path())?;
        self.advance();
        Some(item)
    }
}
