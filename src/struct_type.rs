//! Fixed-layout compound type decoding, with an optional trailing TLV tail
//! (spec §4.8 step 5, `struct`).

use std::sync::Arc;

use crate::arena::Arena;
use crate::context::PacketContext;
use crate::dictionary::{Descriptor, Dictionary};
use crate::error::DecodeResult;
use crate::tlv::decode_tlv;
use crate::value::parse_leaf_value;
use crate::vp::{Cursor, Tag, Value, ValuePair};

/// Decodes a `struct`-typed attribute: a run of fixed-width fields, numbered
/// from 1 and looked up as children of `parent`, followed by an optional TLV
/// tail.
///
/// Fixed fields are pushed directly onto `cursor` as they decode — they are
/// *not* staged atomically, unlike TLV/VSA containers. If the trailing bytes
/// fail to parse as a TLV sequence, they're attached as an unknown-octets
/// sibling VP rather than cancelling the fields already emitted (spec §9's
/// open question, decided in favor of partial success).
pub fn decode_struct(
    arena: &Arena,
    cursor: &mut Cursor,
    dict: &dyn Dictionary,
    parent: &Arc<Descriptor>,
    body: &[u8],
    attr_len: usize,
    ctx: &PacketContext,
    depth: u8,
) -> DecodeResult<()> {
    let mut offset = 0usize;
    let mut field_number = 1u32;

    loop {
        let Some(field_descriptor) = dict.child_by_num(parent, field_number) else {
            break;
        };
        let width = field_descriptor.fixed_length();
        if width == 0 {
            break;
        }
        if offset + width > attr_len {
            break;
        }

        let field_bytes = &body[offset..offset + width];
        let value = parse_leaf_value(field_descriptor.semantic_type(), field_bytes)?;
        cursor.push(ValuePair::from_wire(field_descriptor, Tag::None, value));

        offset += width;
        field_number += 1;
    }

    if offset < attr_len {
        let tail = &body[offset..attr_len];
        let mut local = Cursor::new();

        match decode_tlv(arena, &mut local, dict, parent, tail, ctx, depth + 1) {
            Ok(()) => cursor.splice(local),
            Err(_) => {
                let unknown = dict.unknown_afrom_fields(arena, parent, None, parent.number());
                cursor.push(ValuePair::from_wire(unknown, Tag::None, Value::Octets(tail.to_vec())));
            }
        }
    }

    Ok(())
}
