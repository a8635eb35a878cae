//------------ AS Path --------------------------------------------------------
//
// Paths are kept in the BGP AS_PATH attribute encoding with four-octet ASNs,
// as produced by `routecore::bgp::aspath`. Decoding and encoding is left to
// routecore; this module only adds what the store needs on top of it: an
// owned path with cheap byte access, a text form and the hop accessors.
//
// Two paths are equal if and only if their encodings are equal.

use std::fmt;
use std::str::FromStr;

use inetnum::asn::Asn;
use routecore::bgp::aspath::AsPath as WireAsPath;

pub use routecore::bgp::aspath::{Hop, HopPath, Segment, SegmentType};

use super::errors::{PathStoreError, PathStoreResult};

/// A single hop of an AS path: either one ASN of an AS_SEQUENCE, or a whole
/// set-like segment.
pub type AsPathSegment = Hop<Vec<u8>>;

/// Returns true if `hop` is a plain ASN hop for `asn`. Sets never match, even
/// if `asn` is their only member.
pub fn is_asn_hop<Octs>(hop: &Hop<Octs>, asn: Asn) -> bool {
    matches!(hop, Hop::Asn(a) if *a == asn)
}

/// Checks that `bytes` is a well-formed AS_PATH with four-octet ASNs.
pub(crate) fn validate(bytes: &[u8]) -> PathStoreResult<()> {
    WireAsPath::new(bytes, true)
        .map(|_| ())
        .map_err(|_| PathStoreError::MalformedPath("invalid AS_PATH encoding"))
}

// Decodes the hops of `bytes`. Bytes that do not decode give an empty path,
// every caller has validated them before.
pub(crate) fn hop_path(bytes: &[u8]) -> HopPath {
    WireAsPath::new(bytes, true)
        .map(|p| p.to_hop_path())
        .unwrap_or_else(|_| HopPath::new())
}

pub(crate) fn encode_hops(hops: &HopPath) -> PathStoreResult<Vec<u8>> {
    hops.to_as_path::<Vec<u8>>()
        .map(|p| p.into_inner())
        .map_err(|_| PathStoreError::AllocationFailed)
}

//------------ AsPath --------------------------------------------------------

/// An owned AS path in its wire encoding.
#[derive(Clone, Default, Hash, PartialEq, Eq)]
pub struct AsPath {
    bytes: Vec<u8>,
}

impl AsPath {
    pub fn new() -> Self {
        Self { bytes: vec![] }
    }

    pub fn from_hops(hops: &HopPath) -> PathStoreResult<Self> {
        encode_hops(hops).map(|bytes| Self { bytes })
    }

    /// Creates a path that consists of a plain sequence of ASNs.
    pub fn from_asns(
        asns: impl IntoIterator<Item = Asn>,
    ) -> PathStoreResult<Self> {
        Self::from_hops(&HopPath::from(asns.into_iter().collect::<Vec<_>>()))
    }

    /// Creates a path from its encoded form, checking every segment.
    pub fn from_bytes(bytes: Vec<u8>) -> PathStoreResult<Self> {
        validate(&bytes)?;
        Ok(Self { bytes })
    }

    // Only for bytes that were validated before.
    pub(crate) fn from_valid_bytes(bytes: Vec<u8>) -> Self {
        debug_assert!(validate(&bytes).is_ok());
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The number of bytes in the encoded path.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// The number of hops in the path.
    pub fn len(&self) -> usize {
        self.to_hop_path().iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_hop_path(&self) -> HopPath {
        hop_path(&self.bytes)
    }

    /// The hop nearest to the observing peer.
    pub fn first_segment(&self) -> Option<AsPathSegment> {
        self.to_hop_path().iter().next().cloned()
    }

    /// The hop farthest from the observing peer.
    pub fn origin_segment(&self) -> Option<AsPathSegment> {
        self.to_hop_path().origin().cloned()
    }

    pub fn iter(&self) -> std::vec::IntoIter<AsPathSegment> {
        self.to_hop_path()
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl IntoIterator for &AsPath {
    type Item = AsPathSegment;
    type IntoIter = std::vec::IntoIter<AsPathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<&HopPath> for AsPath {
    type Error = PathStoreError;

    fn try_from(hops: &HopPath) -> Result<Self, Self::Error> {
        Self::from_hops(hops)
    }
}

/// Writes `hop` in the text form used by [AsPath]: `100`, `{1,2}` for an
/// AS_SET, `[1,2]` for an AS_CONFED_SET and `(1 2)` for an
/// AS_CONFED_SEQUENCE.
pub fn write_hop(
    f: &mut impl fmt::Write,
    hop: &AsPathSegment,
) -> fmt::Result {
    let seg = match hop {
        Hop::Asn(asn) => return write!(f, "{}", asn.into_u32()),
        Hop::Segment(seg) => seg,
    };
    let (open, sep, close) = match seg.stype() {
        SegmentType::Set => ("{", ",", "}"),
        SegmentType::ConfedSet => ("[", ",", "]"),
        SegmentType::ConfedSequence => ("(", " ", ")"),
        SegmentType::Sequence => ("", " ", ""),
    };
    f.write_str(open)?;
    for (i, asn) in seg.asns().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", asn.into_u32())?;
    }
    f.write_str(close)
}

impl fmt::Display for AsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, hop) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write_hop(f, &hop)?;
        }
        Ok(())
    }
}

impl fmt::Debug for AsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AsPath({})", self)
    }
}

fn parse_asn(s: &str) -> PathStoreResult<Asn> {
    let s = s.trim();
    let s = s
        .strip_prefix("AS")
        .or_else(|| s.strip_prefix("as"))
        .unwrap_or(s);
    s.parse::<u32>()
        .map(Asn::from_u32)
        .map_err(|_| PathStoreError::MalformedPath("invalid ASN"))
}

impl FromStr for AsPath {
    type Err = PathStoreError;

    /// Parses the textual form produced by `Display`, e.g.
    /// `100 200 {300,301} (65000 65001) [65002,65003]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut hops: Vec<AsPathSegment> = vec![];
        let mut rest = s.trim_start();

        while let Some(c) = rest.chars().next() {
            let (close, sep) = match c {
                '{' => ('}', ','),
                '[' => (']', ','),
                '(' => (')', ' '),
                _ => {
                    let end = rest
                        .find(char::is_whitespace)
                        .unwrap_or(rest.len());
                    let (token, tail) = rest.split_at(end);
                    hops.push(Hop::Asn(parse_asn(token)?));
                    rest = tail.trim_start();
                    continue;
                }
            };
            let end = rest.find(close).ok_or(PathStoreError::MalformedPath(
                "unterminated segment",
            ))?;
            let inner = rest.get(1..end).unwrap_or_default();
            let asns = inner
                .split(sep)
                .filter(|t| !t.trim().is_empty())
                .map(parse_asn)
                .collect::<PathStoreResult<Vec<_>>>()?;
            if asns.is_empty() {
                return Err(PathStoreError::MalformedPath("empty AS set"));
            }
            if asns.len() > u8::MAX as usize {
                return Err(PathStoreError::MalformedPath("AS set too large"));
            }
            let seg = match c {
                '{' => Segment::new_set(asns),
                '[' => Segment::new_confed_set(asns),
                _ => Segment::new_confed_sequence(asns),
            };
            hops.push(Hop::Segment(seg));
            rest = rest.get(end + 1..).unwrap_or_default().trim_start();
        }

        Self::from_hops(&HopPath::from(hops))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hop_text(hop: &AsPathSegment) -> String {
        let mut s = String::new();
        let _ = write_hop(&mut s, hop);
        s
    }

    #[test]
    fn parse_and_display() -> Result<(), PathStoreError> {
        let text = "100 200 {300,301} (65000 65001) [65002]";
        let path = AsPath::from_str(text)?;
        assert_eq!(path.len(), 5);
        assert_eq!(path.to_string(), text);
        assert!(path
            .first_segment()
            .is_some_and(|h| is_asn_hop(&h, Asn::from_u32(100))));
        assert!(matches!(
            path.origin_segment(),
            Some(Hop::Segment(seg)) if seg.stype() == SegmentType::ConfedSet
        ));
        Ok(())
    }

    #[test]
    fn sequence_encoding() -> Result<(), PathStoreError> {
        let path =
            AsPath::from_asns([Asn::from_u32(1), Asn::from_u32(0x01020304)])?;
        // one AS_SEQUENCE segment of two four-octet ASNs
        assert_eq!(path.as_bytes(), &[2, 2, 0, 0, 0, 1, 1, 2, 3, 4][..]);
        assert_eq!(AsPath::from_str("1 16909060")?, path);
        Ok(())
    }

    #[test]
    fn set_is_not_a_single_asn() -> Result<(), PathStoreError> {
        let path = AsPath::from_str("{100}")?;
        assert_eq!(path.byte_len(), 6);
        let first = path.first_segment();
        assert!(!first
            .as_ref()
            .is_some_and(|h| is_asn_hop(h, Asn::from_u32(100))));
        assert_eq!(first.map(|h| hop_text(&h)).as_deref(), Some("{100}"));
        Ok(())
    }

    #[test]
    fn rejects_truncated_bytes() {
        assert_eq!(
            AsPath::from_bytes(vec![2, 1, 0, 0]),
            Err(PathStoreError::MalformedPath("invalid AS_PATH encoding"))
        );
        assert_eq!(
            AsPath::from_bytes(vec![1, 2, 0, 0, 0, 1]),
            Err(PathStoreError::MalformedPath("invalid AS_PATH encoding"))
        );
        assert!(AsPath::from_bytes(vec![2, 1, 0, 0, 0, 7]).is_ok());
    }

    #[test]
    fn rejects_bad_text() {
        assert!(AsPath::from_str("100 {200").is_err());
        assert!(AsPath::from_str("100 foo").is_err());
        assert!(AsPath::from_str("{}").is_err());
    }

    #[test]
    fn empty_path() -> Result<(), PathStoreError> {
        let path = AsPath::from_str("   ")?;
        assert!(path.is_empty());
        assert_eq!(path.origin_segment(), None);
        assert_eq!(path.to_string(), "");
        Ok(())
    }

    #[test]
    fn hop_path_round_trip() -> Result<(), PathStoreError> {
        let path = AsPath::from_str("7 {8,9} 10")?;
        let hops = path.to_hop_path();
        assert_eq!(AsPath::try_from(&hops)?, path);
        assert_eq!(
            path.iter().map(|h| hop_text(&h)).collect::<Vec<_>>(),
            ["7", "{8,9}", "10"]
        );
        Ok(())
    }
}
