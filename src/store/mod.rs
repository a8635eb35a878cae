mod arena;
mod bucket;
pub(crate) mod codec;
mod path_store;
mod store_path;

pub use codec::{
    decode_entry, EncodedPath, SnapshotReader, ENTRY_HEADER_SIZE,
    SNAPSHOT_HEADER_SIZE,
};
pub use path_store::{origin_hash, PathStore, PathStoreIter};
pub use store_path::{StorePath, StorePathIter};
