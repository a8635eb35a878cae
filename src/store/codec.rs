//------------ Serialization -------------------------------------------------
//
// The binary form of a store path is a three byte header, followed by the
// encoded path:
//
// +---------+--------------+------------------------+
// | is_core | path_len     | path bytes             |
// | u8      | u16 (BE)     | path_len bytes         |
// +---------+--------------+------------------------+
//
// A snapshot of a whole store is a u32 (BE) path count, followed by one entry
// per path in ascending idx order. Replaying the entries of a snapshot in
// that order through `PathStore::insert_path` reproduces every PathId.

use log::warn;
use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, NetworkEndian, Unaligned,
    U16, U32,
};

use crate::types::as_path::{self, AsPath};
use crate::types::errors::{PathStoreError, PathStoreResult};

use super::store_path::StorePath;

/// The size of the header in front of every serialized store path.
pub const ENTRY_HEADER_SIZE: usize = 3;

/// The size of the path count in front of a snapshot.
pub const SNAPSHOT_HEADER_SIZE: usize = 4;

#[derive(Debug, KnownLayout, Immutable, FromBytes, IntoBytes, Unaligned)]
#[repr(C)]
struct EntryHeader {
    is_core: u8,
    path_len: U16<NetworkEndian>,
}

//------------ EncodedPath ---------------------------------------------------

/// A store path as read from its serialized form. The path bytes are
/// borrowed from the input and have been checked to be well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedPath<'a> {
    pub is_core: bool,
    pub path: &'a [u8],
}

impl EncodedPath<'_> {
    pub fn to_as_path(&self) -> AsPath {
        AsPath::from_valid_bytes(self.path.to_vec())
    }
}

impl StorePath {
    /// Appends the serialized form of this path to `buf`. Exactly
    /// [get_size](Self::get_size) bytes are written.
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> PathStoreResult<()> {
        let bytes = self.get_int_path().as_bytes();
        let header = EntryHeader {
            is_core: self.is_core().into(),
            path_len: encoded_len(bytes)?.into(),
        };
        buf.try_reserve(self.get_size())?;
        buf.extend_from_slice(header.as_bytes());
        buf.extend_from_slice(bytes);
        Ok(())
    }
}

pub(crate) fn encoded_len(bytes: &[u8]) -> PathStoreResult<u16> {
    u16::try_from(bytes.len())
        .map_err(|_| PathStoreError::PathTooLong(bytes.len()))
}

/// Reads one serialized store path from the front of `bytes`. Returns the
/// path and the bytes that follow it.
pub fn decode_entry(
    bytes: &[u8],
) -> PathStoreResult<(EncodedPath<'_>, &[u8])> {
    let (header, rest) = EntryHeader::ref_from_prefix(bytes)
        .map_err(|_| PathStoreError::MalformedPath("truncated entry header"))?;

    let is_core = match header.is_core {
        0 => false,
        1 => true,
        _ => {
            return Err(PathStoreError::MalformedPath("invalid core flag"));
        }
    };

    let len = header.path_len.get() as usize;
    if rest.len() < len {
        return Err(PathStoreError::MalformedPath(
            "path length exceeds remaining bytes",
        ));
    }
    let (path, rest) = rest.split_at(len);
    as_path::validate(path)?;

    Ok((EncodedPath { is_core, path }, rest))
}

//------------ SnapshotReader ------------------------------------------------

/// Iterator over the entries of a snapshot, in the order they were written.
///
/// The count header is checked against the entries: an iterator that runs
/// out of entries early, or finds bytes after the last one, yields an error
/// and then stops.
#[derive(Debug, Clone)]
pub struct SnapshotReader<'a> {
    rest: &'a [u8],
    remaining: u32,
    failed: bool,
}

impl<'a> SnapshotReader<'a> {
    pub fn new(bytes: &'a [u8]) -> PathStoreResult<Self> {
        let (count, rest) = U32::<NetworkEndian>::read_from_prefix(bytes)
            .map_err(|_| {
                PathStoreError::MalformedPath("truncated snapshot header")
            })?;
        // Every entry takes at least a header.
        if count.get() as usize > rest.len() / ENTRY_HEADER_SIZE {
            warn!(
                "rejecting snapshot: {} paths announced in {} bytes",
                count.get(),
                rest.len()
            );
            return Err(PathStoreError::MalformedPath(
                "path count exceeds snapshot size",
            ));
        }
        Ok(Self {
            rest,
            remaining: count.get(),
            failed: false,
        })
    }

    /// The number of paths announced in the snapshot header that have not
    /// been read yet.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    fn fail(
        &mut self,
        err: PathStoreError,
    ) -> Option<PathStoreResult<EncodedPath<'a>>> {
        warn!("rejecting snapshot: {}", err);
        self.failed = true;
        Some(Err(err))
    }
}

impl<'a> Iterator for SnapshotReader<'a> {
    type Item = PathStoreResult<EncodedPath<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.remaining == 0 {
            if self.rest.is_empty() {
                return None;
            }
            return self.fail(PathStoreError::MalformedPath(
                "trailing bytes after last entry",
            ));
        }
        match decode_entry(self.rest) {
            Ok((entry, rest)) => {
                self.rest = rest;
                self.remaining -= 1;
                Some(Ok(entry))
            }
            Err(err) => self.fail(err),
        }
    }
}

/// Writes the snapshot header for `count` paths to `buf`.
pub(crate) fn encode_snapshot_header(count: u32, buf: &mut Vec<u8>) {
    buf.extend_from_slice(U32::<NetworkEndian>::new(count).as_bytes());
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn entry_layout() -> PathStoreResult<()> {
        let sp = StorePath::new(AsPath::from_str("258")?, true, 0);
        let mut buf = vec![];
        sp.encode_into(&mut buf)?;
        assert_eq!(buf, [1, 0, 6, 2, 1, 0, 0, 1, 2]);
        assert_eq!(buf.len(), sp.get_size());

        let (entry, rest) = decode_entry(&buf)?;
        assert!(rest.is_empty());
        assert!(entry.is_core);
        assert_eq!(entry.to_as_path(), *sp.get_int_path());
        Ok(())
    }

    #[test]
    fn corrupt_entries() {
        assert_eq!(
            decode_entry(&[0, 0]),
            Err(PathStoreError::MalformedPath("truncated entry header"))
        );
        assert_eq!(
            decode_entry(&[2, 0, 0]),
            Err(PathStoreError::MalformedPath("invalid core flag"))
        );
        assert_eq!(
            decode_entry(&[0, 0, 7, 2, 1, 0, 0, 0, 1]),
            Err(PathStoreError::MalformedPath(
                "path length exceeds remaining bytes"
            ))
        );
        assert_eq!(
            decode_entry(&[0, 0, 4, 2, 1, 0, 0]),
            Err(PathStoreError::MalformedPath("invalid AS_PATH encoding"))
        );
    }

    #[test]
    fn snapshot_count_mismatch() -> PathStoreResult<()> {
        // announces two entries, holds one and a header that runs past
        // the end
        let bytes = [0, 0, 0, 2, 0, 0, 0, 0, 0, 9];
        let mut reader = SnapshotReader::new(&bytes)?;
        assert_eq!(reader.remaining(), 2);
        assert!(reader.next().is_some_and(|r| r.is_ok()));
        assert!(reader.next().is_some_and(|r| r.is_err()));
        assert!(reader.next().is_none());

        // announces no entries, holds one
        let bytes = [0, 0, 0, 0, 0, 0, 0];
        let mut reader = SnapshotReader::new(&bytes)?;
        assert!(reader.next().is_some_and(|r| r.is_err()));
        Ok(())
    }

    #[test]
    fn count_larger_than_input() {
        let err = PathStoreError::MalformedPath(
            "path count exceeds snapshot size",
        );
        assert_eq!(
            SnapshotReader::new(&[0xff, 0xff, 0xff, 0xff]).err(),
            Some(err)
        );
        // two empty entries need six bytes, not five
        assert_eq!(
            SnapshotReader::new(&[0, 0, 0, 2, 0, 0, 0, 0, 0]).err(),
            Some(err)
        );
        assert!(SnapshotReader::new(&[0, 0, 0, 2, 0, 0, 0, 0, 0, 0]).is_ok());
    }
}
