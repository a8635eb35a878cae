use zerocopy::{NetworkEndian, U16, U32};

//------------ PathId --------------------------------------------------------

/// The identifier of a path in a [PathStore](crate::PathStore).
///
/// A `PathId` is the hash of the origin segment of the stored path plus the
/// position of the path within the bucket for that hash. It is only
/// meaningful for the store that handed it out, and only stable across
/// store instances if the store is rebuilt by replaying a snapshot.
///
/// The in-memory layout is the 6-byte wire form: a network-endian u32
/// origin hash followed by a network-endian u16 local id, without padding.
/// This allows a `PathId` to be embedded as-is in larger records.
#[derive(
    Hash,
    Eq,
    PartialEq,
    Copy,
    Clone,
    zerocopy::FromBytes,
    zerocopy::IntoBytes,
    zerocopy::KnownLayout,
    zerocopy::Immutable,
    zerocopy::Unaligned,
)]
#[repr(C)]
pub struct PathId {
    origin_hash: U32<NetworkEndian>,
    local_id: U16<NetworkEndian>,
}

/// The size in bytes of the wire form of a [PathId].
pub const PATH_ID_SIZE: usize = 6;

impl PathId {
    pub fn new(origin_hash: u32, local_id: u16) -> Self {
        Self {
            origin_hash: origin_hash.into(),
            local_id: local_id.into(),
        }
    }

    pub fn origin_hash(&self) -> u32 {
        self.origin_hash.get()
    }

    pub fn local_id(&self) -> u16 {
        self.local_id.get()
    }

    pub fn to_bytes(self) -> [u8; PATH_ID_SIZE] {
        zerocopy::transmute!(self)
    }

    // Every 6-byte sequence is a valid PathId.
    pub fn from_bytes(bytes: &[u8; PATH_ID_SIZE]) -> Self {
        zerocopy::transmute!(*bytes)
    }
}

impl std::fmt::Display for PathId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08x}:{}", self.origin_hash(), self.local_id())
    }
}

impl std::fmt::Debug for PathId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathId")
            .field("origin_hash", &format_args!("{:#010x}", self.origin_hash()))
            .field("local_id", &self.local_id())
            .finish()
    }
}

// Serialized as the `hash:local` string form, used for the JSON output of the
// dump tool.
impl serde::Serialize for PathId {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
