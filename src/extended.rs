//! RFC 6929 extended and long-extended attribute decoding (spec §4.5).

use std::sync::Arc;

use crate::arena::Arena;
use crate::context::PacketContext;
use crate::dictionary::{Descriptor, Dictionary};
use crate::error::{DecodeError, DecodeResult};
use crate::value::decode_pair_value;
use crate::vp::Cursor;

/// Decodes an RFC 6929 extended (or, if `has_extra`, long-extended) attribute.
///
/// `body` starts at the extended-type byte of the *first* fragment and spans
/// to the end of the packet, matching the window convention used throughout
/// this crate's container decoders. If the long-extended "more fragments" bit
/// is set, subsequent sibling top-level attributes (same attribute number,
/// same extended-type) are walked and their bodies concatenated before the
/// child value decoder runs.
///
/// Returns the number of bytes consumed starting from `body`'s first byte,
/// which may span several attribute headers.
#[allow(clippy::too_many_arguments)]
pub fn decode_extended(
    arena: &Arena,
    cursor: &mut Cursor,
    dict: &dyn Dictionary,
    parent: &Arc<Descriptor>,
    has_extra: bool,
    body: &[u8],
    attr_len: usize,
    packet_len: usize,
    ctx: &PacketContext,
    depth: u8,
) -> DecodeResult<usize> {
    let header_len = if has_extra { 2 } else { 1 };

    if attr_len < header_len {
        return Err(DecodeError::InsufficientData {
            needed: header_len,
            available: attr_len,
        });
    }

    let ext_type = body[0] as u32;

    let mut more = false;
    if has_extra {
        more = body[1] & 0x80 != 0;
    }

    let mut buffer = body[header_len..attr_len].to_vec();

    let child_descriptor = dict
        .child_by_num(parent, ext_type)
        .unwrap_or_else(|| dict.unknown_afrom_fields(arena, parent, None, ext_type));

    let mut offset = attr_len;

    while more {
        if offset + 2 > packet_len {
            return Err(DecodeError::MalformedStructure(
                "missing final long-extended fragment",
            ));
        }

        let next_number = body[offset] as u32;
        if next_number != parent.number() {
            return Err(DecodeError::MalformedStructure(
                "long-extended fragment attribute-number mismatch",
            ));
        }

        let next_declared = body[offset + 1] as usize;
        if next_declared < 2 + header_len || offset + next_declared > packet_len {
            return Err(DecodeError::Overflow {
                declared: next_declared,
                remaining: packet_len - offset,
            });
        }

        let frag_ext_type = body[offset + 2] as u32;
        if frag_ext_type != ext_type {
            return Err(DecodeError::MalformedStructure(
                "long-extended fragment extended-type mismatch",
            ));
        }

        let frag_flag = body[offset + 3];
        more = frag_flag & 0x80 != 0;
        buffer.extend_from_slice(&body[offset + 4..offset + next_declared]);
        offset += next_declared;
    }

    let buffer_len = buffer.len();
    decode_pair_value(
        arena,
        cursor,
        dict,
        &child_descriptor,
        &buffer,
        buffer_len,
        buffer_len,
        ctx,
        depth + 1,
    )?;

    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PacketContext;
    use crate::dictionary::{DescriptorFlags, SemanticType, Subtype};
    use crate::vp::Value;

    fn child_string_dict_stub() -> (Arc<Descriptor>, Arc<Descriptor>) {
        let root = Arc::new(Descriptor::unknown(0, None));
        let extended = Arc::new(Descriptor::new(
            241,
            "Extended-Attribute-1",
            SemanticType::Extended,
            Some(root.clone()),
            DescriptorFlags::EXTRA,
            Subtype::None,
            0,
        ));
        (root, extended)
    }

    struct StubDict {
        child: Arc<Descriptor>,
    }

    impl Dictionary for StubDict {
        fn root(&self) -> Arc<Descriptor> {
            self.child.clone()
        }

        fn child_by_num(&self, _parent: &Arc<Descriptor>, number: u32) -> Option<Arc<Descriptor>> {
            (number == self.child.number()).then(|| self.child.clone())
        }

        fn child_by_type(
            &self,
            _parent: &Arc<Descriptor>,
            _semantic_type: SemanticType,
        ) -> Option<Arc<Descriptor>> {
            None
        }

        fn vendor_by_num(&self, _pen: u32) -> Option<Arc<crate::dictionary::VendorRecord>> {
            None
        }

        fn unknown_afrom_fields(
            &self,
            arena: &Arena,
            parent: &Arc<Descriptor>,
            _pen: Option<u32>,
            number: u32,
        ) -> Arc<Descriptor> {
            arena.alloc_descriptor(Descriptor::unknown(number, Some(parent.clone())))
        }

        fn unknown_vendor_afrom_num(
            &self,
            arena: &Arena,
            parent: &Arc<Descriptor>,
            pen: u32,
        ) -> Arc<crate::dictionary::VendorRecord> {
            arena.alloc_vendor(crate::dictionary::VendorRecord::new(pen, "Unknown", 1, 1, false))
        }
    }

    fn ctx() -> PacketContext {
        PacketContext::new("testing123", [0; 16], false)
    }

    #[test]
    fn single_fragment_decodes_in_place() {
        let (_root, extended_descriptor) = child_string_dict_stub();
        let child = Arc::new(Descriptor::new(
            1,
            "Frag-String",
            SemanticType::String,
            Some(extended_descriptor.clone()),
            DescriptorFlags::empty(),
            Subtype::None,
            0,
        ));
        let dict = StubDict { child: child.clone() };
        let arena = Arena::new();
        let mut cursor = Cursor::new();

        // ext_type=1, flag=0 (no more), data="hi"
        let body = [1u8, 0x00, b'h', b'i'];
        let consumed = decode_extended(
            &arena,
            &mut cursor,
            &dict,
            &extended_descriptor,
            true,
            &body,
            body.len(),
            body.len(),
            &ctx(),
            0,
        )
        .unwrap();

        assert_eq!(consumed, 4);
        assert_eq!(cursor.len(), 1);
        match cursor.as_slice()[0].value() {
            Value::String(s) => assert_eq!(s, "hi"),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn two_fragments_are_reassembled() {
        let (_root, extended_descriptor) = child_string_dict_stub();
        let child = Arc::new(Descriptor::new(
            1,
            "Frag-String",
            SemanticType::String,
            Some(extended_descriptor.clone()),
            DescriptorFlags::empty(),
            Subtype::None,
            0,
        ));
        let dict = StubDict { child };
        let arena = Arena::new();
        let mut cursor = Cursor::new();

        // first fragment (as the attribute's own value): ext_type=1, flag=0x80 (more), data="ab"
        let first_value = [1u8, 0x80, b'a', b'b'];
        // second top-level attribute: type=241, declared_len=6 (2 header + ext_type + flag + 2 data),
        // ext_type=1, flag=0x00 (last), data="cd"
        let second = [241u8, 6, 1, 0x00, b'c', b'd'];

        let mut body = first_value.to_vec();
        body.extend_from_slice(&second);

        let consumed = decode_extended(
            &arena,
            &mut cursor,
            &dict,
            &extended_descriptor,
            true,
            &body,
            first_value.len(),
            body.len(),
            &ctx(),
            0,
        )
        .unwrap();

        assert_eq!(consumed, body.len());
        match cursor.as_slice()[0].value() {
            Value::String(s) => assert_eq!(s, "abcd"),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn missing_final_fragment_is_an_error() {
        let (_root, extended_descriptor) = child_string_dict_stub();
        let child = Arc::new(Descriptor::new(
            1,
            "Frag-String",
            SemanticType::String,
            Some(extended_descriptor.clone()),
            DescriptorFlags::empty(),
            Subtype::None,
            0,
        ));
        let dict = StubDict { child };
        let arena = Arena::new();
        let mut cursor = Cursor::new();

        let body = [1u8, 0x80, b'a', b'b']; // more set, nothing follows
        let err = decode_extended(
            &arena,
            &mut cursor,
            &dict,
            &extended_descriptor,
            true,
            &body,
            body.len(),
            body.len(),
            &ctx(),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::MalformedStructure(_)));
    }
}
