use std::collections::TryReserveError;
use std::fmt;

/// Possible errors returned by methods on a [PathStore](crate::PathStore)
/// and by the AS path codec. None of these errors leave the store in an
/// inconsistent state: an insertion that fails has no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStoreError {
    /// Growing the origin map, a bucket, the index or a path buffer failed.
    /// The caller should abandon the current insertion and deal with the
    /// resource exhaustion at a higher level.
    AllocationFailed,
    /// The requested path ID or index does not refer to a stored path.
    PathNotFound,
    /// A serialized path or snapshot is corrupt. The argument describes
    /// what was wrong with it.
    MalformedPath(&'static str),
    /// The encoded path does not fit the u16 length field of a serialized
    /// store path. The argument is the offending length in bytes.
    PathTooLong(usize),
    /// The bucket for this origin hash already holds the maximum number of
    /// paths that a u16 local id can address.
    BucketFull { origin_hash: u32 },
    /// The store already holds `u32::MAX` paths.
    StoreFull,
    /// Writing a snapshot to an `io::Write` failed.
    Io(std::io::ErrorKind),
}

impl std::error::Error for PathStoreError {}

impl fmt::Display for PathStoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PathStoreError::AllocationFailed => {
                write!(f, "Error: Memory allocation for the path store failed.")
            }
            PathStoreError::PathNotFound => {
                write!(f, "Error: The path cannot be found in the store.")
            }
            PathStoreError::MalformedPath(reason) => {
                write!(f, "Error: Malformed AS path data: {}.", reason)
            }
            PathStoreError::PathTooLong(len) => write!(
                f,
                "Error: An encoded path of {} bytes exceeds the maximum of \
                {} bytes.",
                len,
                u16::MAX
            ),
            PathStoreError::BucketFull { origin_hash } => write!(
                f,
                "Error: The bucket for origin hash {:#010x} is full.",
                origin_hash
            ),
            PathStoreError::StoreFull => {
                write!(f, "Error: The path store cannot hold more paths.")
            }
            PathStoreError::Io(kind) => {
                write!(f, "Error: Writing the snapshot failed: {}.", kind)
            }
        }
    }
}

impl From<TryReserveError> for PathStoreError {
    fn from(_: TryReserveError) -> Self {
        PathStoreError::AllocationFailed
    }
}

impl From<std::io::Error> for PathStoreError {
    fn from(value: std::io::Error) -> Self {
        PathStoreError::Io(value.kind())
    }
}

pub type PathStoreResult<T> = Result<T, PathStoreError>;
