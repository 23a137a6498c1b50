//! RFC 2869 §5.13 attribute concatenation: splitting one logical octets value
//! across consecutive same-typed top-level attributes (e.g. EAP-Message).

use std::sync::Arc;

use crate::dictionary::Descriptor;
use crate::error::{DecodeError, DecodeResult};
use crate::vp::{Cursor, Tag, Value, ValuePair};

/// Reads a run of consecutive attributes sharing `parent`'s attribute number
/// out of `body` (which spans from the first attribute's value to the end of
/// the packet) and emits a single `octets` value-pair holding their
/// concatenated bodies.
///
/// Returns the total number of bytes consumed, which may span several
/// attribute headers.
pub fn decode_concat(
    cursor: &mut Cursor,
    parent: &Arc<Descriptor>,
    body: &[u8],
    attr_len: usize,
    packet_len: usize,
) -> DecodeResult<usize> {
    let first = body.get(..attr_len).ok_or(DecodeError::Overflow {
        declared: attr_len,
        remaining: body.len(),
    })?;

    let mut buffer = first.to_vec();
    let mut offset = attr_len;

    while offset + 2 <= packet_len {
        let next_number = body[offset] as u32;
        if next_number != parent.number() {
            break;
        }

        let next_len = body[offset + 1] as usize;
        if next_len < 2 || offset + next_len > packet_len {
            break;
        }

        buffer.extend_from_slice(&body[offset + 2..offset + next_len]);
        offset += next_len;
    }

    cursor.push(ValuePair::from_wire(parent.clone(), Tag::None, Value::Octets(buffer)));
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{Descriptor, DescriptorFlags, SemanticType, Subtype};

    fn eap_descriptor() -> Arc<Descriptor> {
        Arc::new(Descriptor::new(
            79,
            "EAP-Message",
            SemanticType::Octets,
            None,
            DescriptorFlags::CONCAT,
            Subtype::None,
            0,
        ))
    }

    #[test]
    fn stops_at_first_non_matching_type() {
        let parent = eap_descriptor();
        // first attribute: type 79, len 4 ("ab"); second: type 80 (stop)
        let body = [b'a', b'b', 80, 2];
        let mut cursor = Cursor::new();
        let consumed = decode_concat(&mut cursor, &parent, &body, 2, body.len()).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(cursor.len(), 1);
        match cursor.as_slice()[0].value() {
            Value::Octets(bytes) => assert_eq!(bytes, b"ab"),
            _ => panic!("expected octets"),
        }
    }

    #[test]
    fn concatenates_consecutive_matching_attributes() {
        let parent = eap_descriptor();
        // first: value "ab" (attr_len=2); second header (79, 4) value "cd"
        let body = [b'a', b'b', 79, 4, b'c', b'd'];
        let mut cursor = Cursor::new();
        let consumed = decode_concat(&mut cursor, &parent, &body, 2, body.len()).unwrap();
        assert_eq!(consumed, 6);
        match cursor.as_slice()[0].value() {
            Value::Octets(bytes) => assert_eq!(bytes, b"abcd"),
            _ => panic!("expected octets"),
        }
    }
}
