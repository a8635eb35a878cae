#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]

//! A library that stores the AS paths of BGP routes, as observed by many
//! peers, with every distinct path stored only once.
//!
//! Across thousands of peers and millions of prefixes, most observed paths
//! differ only in the first hop: the hop of the peer that reported the
//! route. The [PathStore] strips that hop off when it matches the reporting
//! peer and stores the remainder, the *core* path, once for all peers that
//! see it. In return the store hands out a [PathId], a small fixed-size
//! identifier that stands in for the path in per-prefix, per-peer records.
//! The full path can be reconstructed from the stored path and the peer ASN
//! at any time.
//!
//! ```
//! use std::str::FromStr;
//! use aspath_store::{AsPath, PathStore};
//! use inetnum::asn::Asn;
//!
//! let mut store = PathStore::new();
//! let seen_by_100 = AsPath::from_str("100 200 300").unwrap();
//! let seen_by_400 = AsPath::from_str("400 200 300").unwrap();
//!
//! let id1 = store.get_path_id(&seen_by_100, Asn::from_u32(100)).unwrap();
//! let id2 = store.get_path_id(&seen_by_400, Asn::from_u32(400)).unwrap();
//! assert_eq!(id1, id2);
//! assert_eq!(store.size(), 1);
//!
//! let stored = store.get_store_path(id1).unwrap();
//! assert_eq!(stored.get_path(Asn::from_u32(400)).unwrap(), seen_by_400);
//! ```
//!
//! The store can be written out as a snapshot, and rebuilt from one with
//! identical path IDs, see [PathStore::serialize] and
//! [PathStore::from_snapshot].
mod store;
mod types;

/// Configuration for a [PathStore]
pub mod config;

// re-exports
pub use inetnum::asn::Asn;

/// AS paths in their BGP wire encoding, on top of `routecore`
pub use types::as_path;

/// Error types returned by the store
pub use types::errors;

/// Statistics types returned by the store
pub use types::stats;

pub use types::{
    AsPath, AsPathSegment, Hop, HopPath, PathId, SegmentType, PATH_ID_SIZE,
};

pub use store::{
    origin_hash, PathStore, PathStoreIter, StorePath, StorePathIter,
};

/// The binary encoding of stored paths and snapshots
pub mod codec {
    pub use crate::store::{
        decode_entry, EncodedPath, SnapshotReader, ENTRY_HEADER_SIZE,
        SNAPSHOT_HEADER_SIZE,
    };
}
