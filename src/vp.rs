//! The decoder's output unit (value-pair) and the cursor it's appended to.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use getset::{CopyGetters, Getters};

use crate::dictionary::Descriptor;

/// An RFC 2868 tunnel tag, grouping related attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tag {
    /// No tag present.
    #[default]
    None,
    /// A tag value in `1..=31`.
    Value(u8),
}

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 text (lossily converted from the wire bytes).
    String(String),
    /// Opaque octets.
    Octets(Vec<u8>),
    /// A 4-byte IPv4 address.
    Ipv4Addr(Ipv4Addr),
    /// A 16-byte IPv6 address.
    Ipv6Addr(Ipv6Addr),
    /// An IPv4 prefix: a masked address plus its prefix length.
    Ipv4Prefix {
        /// Prefix length in bits, `0..=32`.
        prefix_len: u8,
        /// The masked address.
        addr: Ipv4Addr,
    },
    /// An IPv6 prefix: a masked address plus its prefix length.
    Ipv6Prefix {
        /// Prefix length in bits, `0..=128`.
        prefix_len: u8,
        /// The masked address.
        addr: Ipv6Addr,
    },
    /// A single-byte boolean.
    Bool(bool),
    /// An 8-bit unsigned integer.
    Uint8(u8),
    /// A 16-bit unsigned integer.
    Uint16(u16),
    /// A 32-bit unsigned integer.
    Uint32(u32),
    /// A 64-bit unsigned integer.
    Uint64(u64),
    /// An 8-bit signed integer.
    Int8(i8),
    /// A 16-bit signed integer.
    Int16(i16),
    /// A 32-bit signed integer.
    Int32(i32),
    /// A 64-bit signed integer.
    Int64(i64),
    /// A 32-bit IEEE-754 float.
    Float32(f32),
    /// A 64-bit IEEE-754 float.
    Float64(f64),
    /// A 32-bit Unix timestamp.
    Date(u32),
    /// A 32-bit signed duration in seconds.
    TimeDelta(i32),
    /// A 6-byte MAC address.
    Ethernet([u8; 6]),
    /// An 8-byte interface identifier.
    Ifid([u8; 8]),
    /// An unsigned size, stored widened to 64 bits regardless of wire width.
    Size(u64),
    /// Ascend's opaque filter binary format.
    Abinary(Vec<u8>),
}

/// One attribute/value pair produced by the decoder.
///
/// Every value-pair originating from the wire is `tainted`; the field exists
/// so callers that also construct value-pairs programmatically (for encoding,
/// or business-rule injection) can distinguish the two.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct ValuePair {
    /// The dictionary (or fabricated) descriptor this value-pair was decoded against.
    #[getset(get = "pub")]
    descriptor: Arc<Descriptor>,

    /// The RFC 2868 tunnel tag, if any.
    #[getset(get_copy = "pub")]
    tag: Tag,

    /// The decoded value.
    #[getset(get = "pub")]
    value: Value,

    /// Whether this value-pair originated from an untrusted wire buffer.
    #[getset(get_copy = "pub")]
    tainted: bool,
}

impl ValuePair {
    /// Builds a value-pair as produced by the wire decoder (always `tainted`).
    pub fn from_wire(descriptor: Arc<Descriptor>, tag: Tag, value: Value) -> Self {
        Self {
            descriptor,
            tag,
            value,
            tainted: true,
        }
    }
}

/// An ordered, append-only sink for value-pairs.
///
/// Supports [`splice`](Cursor::splice) so a container decoder can stage its
/// children in a local cursor and merge them onto the caller's cursor only on
/// full success, giving TLV/VSA containers atomic all-or-nothing semantics.
#[derive(Debug, Default)]
pub struct Cursor {
    pairs: Vec<ValuePair>,
}

impl Cursor {
    /// Creates an empty cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one value-pair to the tail of the cursor.
    pub fn push(&mut self, pair: ValuePair) {
        self.pairs.push(pair);
    }

    /// Appends the contents of `other` to the tail of this cursor, in order.
    pub fn splice(&mut self, other: Cursor) {
        self.pairs.extend(other.pairs);
    }

    /// The value-pairs produced so far, in wire order.
    pub fn as_slice(&self) -> &[ValuePair] {
        &self.pairs
    }

    /// The number of value-pairs produced so far.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no value-pairs have been produced yet.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Consumes the cursor, returning its value-pairs in wire order.
    pub fn into_vec(self) -> Vec<ValuePair> {
        self.pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Descriptor;

    fn dummy_pair(number: u32) -> ValuePair {
        ValuePair::from_wire(
            Arc::new(Descriptor::unknown(number, None)),
            Tag::None,
            Value::Octets(vec![1, 2, 3]),
        )
    }

    #[test]
    fn splice_preserves_order() {
        let mut outer = Cursor::new();
        outer.push(dummy_pair(1));

        let mut inner = Cursor::new();
        inner.push(dummy_pair(2));
        inner.push(dummy_pair(3));

        outer.splice(inner);

        let numbers: Vec<u32> = outer
            .as_slice()
            .iter()
            .map(|vp| vp.descriptor().number())
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn wire_pairs_are_tainted() {
        assert!(dummy_pair(1).tainted());
    }
}
