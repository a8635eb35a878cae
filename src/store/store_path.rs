use inetnum::asn::Asn;

use crate::types::as_path::{self, AsPath, AsPathSegment, Hop, HopPath};
use crate::types::errors::PathStoreResult;

use super::codec::ENTRY_HEADER_SIZE;

//------------ StorePath -----------------------------------------------------

/// A single path in a [PathStore](crate::PathStore).
///
/// A store path is owned by the origin bucket it lives in; the store only
/// ever hands out shared references to it. The stored bytes are either the
/// full path as it was observed, or, for a core path, the path without the
/// hop of the peer that observed it. The peer hop is put back in by
/// [get_path](Self::get_path) and [iter](Self::iter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePath {
    path: AsPath,
    is_core: bool,
    idx: u32,
}

impl StorePath {
    pub(crate) fn new(path: AsPath, is_core: bool, idx: u32) -> Self {
        Self { path, is_core, idx }
    }

    // The equality used for deduplication: the core flag takes part, so a
    // full path never matches a core path with the same bytes.
    pub(crate) fn matches(&self, bytes: &[u8], is_core: bool) -> bool {
        self.is_core == is_core && self.path.as_bytes() == bytes
    }

    /// Reconstructs the path as observed by `peer_asn`.
    ///
    /// This allocates a new path, use [iter](Self::iter) for read-only
    /// traversal.
    pub fn get_path(&self, peer_asn: Asn) -> PathStoreResult<AsPath> {
        if !self.is_core {
            return Ok(self.path.clone());
        }
        let mut hops = vec![Hop::Asn(peer_asn)];
        hops.extend(self.path.to_hop_path().iter().cloned());
        AsPath::from_hops(&HopPath::from(hops))
    }

    /// The origin hop of the stored path, or `None` if the stored path is
    /// empty (a core path that consisted of the peer hop only).
    pub fn get_origin_seg(&self) -> Option<AsPathSegment> {
        self.path.origin_segment()
    }

    /// Returns an iterator over the hops of the path as observed by
    /// `peer_asn`.
    pub fn iter(&self, peer_asn: Asn) -> StorePathIter {
        StorePathIter::new(self, peer_asn)
    }

    /// The ordinal of this path in its store. Ordinals are handed out
    /// densely in insertion order, starting at 0.
    pub fn get_idx(&self) -> u32 {
        self.idx
    }

    /// Whether the peer hop was stripped from the stored path.
    pub fn is_core(&self) -> bool {
        self.is_core
    }

    /// The stored path, without the peer hop if this is a core path.
    pub fn get_int_path(&self) -> &AsPath {
        &self.path
    }

    /// The number of bytes this path takes up when serialized.
    pub fn get_size(&self) -> usize {
        ENTRY_HEADER_SIZE + self.path.byte_len()
    }
}

//------------ StorePathIter -------------------------------------------------

/// Iterator over the hops of a [StorePath], with the peer hop put back in
/// front for core paths.
#[derive(Clone, Debug)]
pub struct StorePathIter {
    peer_hop: Option<Asn>,
    hops: std::vec::IntoIter<AsPathSegment>,
}

impl StorePathIter {
    fn new(store_path: &StorePath, peer_asn: Asn) -> Self {
        Self {
            peer_hop: store_path.is_core.then_some(peer_asn),
            hops: store_path.path.iter(),
        }
    }

    /// Restarts the iteration over `store_path` as observed by `peer_asn`.
    pub fn reset(&mut self, store_path: &StorePath, peer_asn: Asn) {
        *self = Self::new(store_path, peer_asn);
    }

    /// Returns the next hop, or `None` at the end of the path.
    pub fn next_seg(&mut self) -> Option<AsPathSegment> {
        if let Some(peer) = self.peer_hop.take() {
            return Some(Hop::Asn(peer));
        }
        self.hops.next()
    }
}

impl Iterator for StorePathIter {
    type Item = AsPathSegment;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_seg()
    }
}

// True if the first hop of `path` is the plain ASN hop of `peer_asn`.
pub(crate) fn starts_with_peer(path: &HopPath, peer_asn: Asn) -> bool {
    path.iter()
        .next()
        .is_some_and(|hop| as_path::is_asn_hop(hop, peer_asn))
}
