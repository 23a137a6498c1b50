//! The top-level attribute decoder (spec §4.10): consumes one `(type,
//! length)` header and hands off to the value dispatcher.

use crate::arena::Arena;
use crate::context::PacketContext;
use crate::dictionary::Dictionary;
use crate::error::{DecodeError, DecodeResult};
use crate::value::decode_pair_value;
use crate::vp::{Cursor, Tag, Value, ValuePair};

/// Chargeable-User-Identity; an empty instance is emitted rather than
/// silently dropped, to satisfy a WiMAX interoperability quirk (spec §4.10).
const CHARGEABLE_USER_IDENTITY: u32 = 89;

/// Decodes one top-level attribute from the front of `bytes`, appending its
/// value-pair(s) to `cursor`.
///
/// Returns the number of bytes consumed (`>= 2`; may exceed the declared
/// attribute length for extended/WiMAX fragmentation). Unlike
/// [`decode_pair_value`], a malformed header here is a hard error: this is
/// the only point in the decoder where a single bad attribute aborts the
/// whole packet rather than falling back to a raw reinterpretation.
pub fn decode_pair(
    arena: &Arena,
    cursor: &mut Cursor,
    dict: &dyn Dictionary,
    bytes: &[u8],
    ctx: &PacketContext,
) -> DecodeResult<usize> {
    if bytes.len() < 2 {
        return Err(DecodeError::InsufficientData {
            needed: 2,
            available: bytes.len(),
        });
    }

    let number = bytes[0] as u32;
    let declared_length = bytes[1] as usize;

    if declared_length < 2 {
        return Err(DecodeError::MalformedStructure(
            "attribute declared length must be at least 2",
        ));
    }
    if declared_length > bytes.len() {
        return Err(DecodeError::Overflow {
            declared: declared_length,
            remaining: bytes.len(),
        });
    }

    let root = dict.root();
    let descriptor = dict
        .child_by_num(&root, number)
        .unwrap_or_else(|| dict.unknown_afrom_fields(arena, &root, None, number));

    if declared_length == 2 {
        if number == CHARGEABLE_USER_IDENTITY {
            cursor.push(ValuePair::from_wire(descriptor, Tag::None, Value::Octets(Vec::new())));
        }
        return Ok(2);
    }

    let attr_len = declared_length - 2;
    let packet_len = bytes.len() - 2;
    let body = &bytes[2..];

    let consumed = decode_pair_value(arena, cursor, dict, &descriptor, body, attr_len, packet_len, ctx, 0)?;
    Ok(2 + consumed)
}
