//! WiMAX Forum T33-001-R015v01 fragmented Vendor-Specific Attributes (spec §4.6).
//!
//! Unlike RFC 6929 long-extended, WiMAX fragments are not nested inside one
//! attribute — each fragment is its own top-level Vendor-Specific attribute
//! (PEN 24757), walked the same way [`crate::extended::decode_extended`]
//! walks long-extended fragments.

use std::sync::Arc;

use byteorder::{ByteOrder, NetworkEndian};

use crate::arena::Arena;
use crate::context::PacketContext;
use crate::dictionary::{Dictionary, VendorRecord};
use crate::error::{DecodeError, DecodeResult};
use crate::value::decode_pair_value;
use crate::vp::Cursor;

/// Decodes a (possibly fragmented) WiMAX vendor sub-attribute.
///
/// `body` starts right after the first fragment's 4-byte PEN (i.e. at its
/// `wimax_attr` byte) and spans to the end of the packet. `attr_len` is the
/// first fragment's own VSA value length, PEN excluded. `vsa_number` is the
/// top-level Vendor-Specific attribute's own attribute number (conventionally
/// 26), used to validate that continuation fragments are themselves VSAs.
#[allow(clippy::too_many_arguments)]
pub fn decode_wimax(
    arena: &Arena,
    cursor: &mut Cursor,
    dict: &dyn Dictionary,
    vendor: &Arc<VendorRecord>,
    vsa_number: u32,
    body: &[u8],
    attr_len: usize,
    packet_len: usize,
    ctx: &PacketContext,
    depth: u8,
) -> DecodeResult<usize> {
    if attr_len < 3 {
        return Err(DecodeError::InsufficientData {
            needed: 3,
            available: attr_len,
        });
    }

    let wimax_attr = body[0] as u32;
    let wimax_len = body[1] as usize;
    let cont_byte = body[2];

    if wimax_len != attr_len {
        return Err(DecodeError::MalformedStructure(
            "wimax first fragment length does not match enclosing VSA length",
        ));
    }

    let mut buffer = body[3..attr_len].to_vec();
    let mut more = cont_byte & 0x80 != 0;
    let mut offset = attr_len;

    while more {
        if offset + 9 > packet_len {
            return Err(DecodeError::MalformedStructure(
                "missing final wimax continuation fragment",
            ));
        }

        let next_type = body[offset] as u32;
        if next_type != vsa_number {
            return Err(DecodeError::MalformedStructure(
                "wimax continuation fragment is not a Vendor-Specific attribute",
            ));
        }

        let next_declared = body[offset + 1] as usize;
        if next_declared < 9 || offset + next_declared > packet_len {
            return Err(DecodeError::Overflow {
                declared: next_declared,
                remaining: packet_len - offset,
            });
        }

        let frag_pen = NetworkEndian::read_u32(&body[offset + 2..offset + 6]);
        if frag_pen != vendor.pen() {
            return Err(DecodeError::MalformedStructure(
                "wimax continuation fragment PEN mismatch",
            ));
        }

        let frag_wimax_attr = body[offset + 6] as u32;
        if frag_wimax_attr != wimax_attr {
            return Err(DecodeError::MalformedStructure(
                "wimax continuation fragment attribute-number mismatch",
            ));
        }

        let frag_wimax_len = body[offset + 7] as usize;
        if frag_wimax_len + 6 != next_declared {
            return Err(DecodeError::MalformedStructure(
                "wimax continuation fragment length mismatch",
            ));
        }

        let frag_cont = body[offset + 8];
        more = frag_cont & 0x80 != 0;
        buffer.extend_from_slice(&body[offset + 9..offset + next_declared]);
        offset += next_declared;
    }

    let child_descriptor = dict
        .child_by_num(&vendor.root(), wimax_attr)
        .unwrap_or_else(|| dict.unknown_afrom_fields(arena, &vendor.root(), Some(vendor.pen()), wimax_attr));

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
