//! The generic TLV well-formedness check and child-TLV walker (spec §4.2, §4.4).

use std::sync::Arc;

use crate::arena::Arena;
use crate::context::PacketContext;
use crate::dictionary::{Descriptor, Dictionary};
use crate::error::{DecodeError, DecodeResult};
use crate::value::decode_pair_value;
use crate::vp::Cursor;

/// Checks that `buffer` is a well-formed run of `(type, length, value)` records
/// under the vendor-declared `(type_width, length_width)` schema.
///
/// Does not interpret the records, only their shape; used both to validate a
/// VSA body up front and as a standalone sanity check by callers.
pub fn tlv_ok(buffer: &[u8], type_width: u8, length_width: u8) -> bool {
    let mut offset = 0usize;

    while offset < buffer.len() {
        let Some(type_bytes) = buffer.get(offset..offset + type_width as usize) else {
            return false;
        };

        match type_width {
            1 => { /* zero permitted: Colubris quirk */ }
            2 => {
                if type_bytes == [0, 0] {
                    return false;
                }
            }
            4 => {
                if type_bytes[0] != 0 {
                    return false;
                }
                if type_bytes == [0, 0, 0, 0] {
                    return false;
                }
            }
            _ => return false,
        }

        let header_len = type_width as usize + length_width as usize;

        let record_len = match length_width {
            0 => {
                // length is implicit; the whole remainder is one record.
                buffer.len() - offset
            }
            1 => {
                let Some(&len_byte) = buffer.get(offset + type_width as usize) else {
                    return false;
                };
                len_byte as usize
            }
            2 => {
                let Some(len_bytes) = buffer.get(offset + type_width as usize..offset + header_len) else {
                    return false;
                };
                if len_bytes[0] != 0 {
                    return false;
                }
                len_bytes[1] as usize
            }
            _ => return false,
        };

        if record_len < header_len {
            return false;
        }
        if offset + record_len > buffer.len() {
            return false;
        }

        offset += record_len;
    }

    true
}

/// Walks a 1-byte-type/1-byte-length child TLV sequence, recursing into the
/// value decoder for each child.
///
/// Children are staged in a local cursor and spliced onto `cursor` only if
/// every child decodes successfully, giving the whole container atomic
/// all-or-nothing semantics (spec §4.4).
#[allow(clippy::too_many_arguments)]
pub fn decode_tlv(
    arena: &Arena,
    cursor: &mut Cursor,
    dict: &dyn Dictionary,
    parent: &Arc<Descriptor>,
    body: &[u8],
    ctx: &PacketContext,
    depth: u8,
) -> DecodeResult<()> {
    let mut local = Cursor::new();
    let mut offset = 0usize;

    while offset < body.len() {
        if body.len() - offset < 2 {
            return Err(DecodeError::InsufficientData {
                needed: 2,
                available: body.len() - offset,
            });
        }

        let child_number = body[offset] as u32;
        let child_len = body[offset + 1] as usize;

        if child_len < 2 || offset + child_len > body.len() {
            return Err(DecodeError::Overflow {
                declared: child_len,
                remaining: body.len() - offset,
            });
        }

        let child_body = &body[offset + 2..offset + child_len];
        let child_attr_len = child_len - 2;

        let child_descriptor = dict
            .child_by_num(parent, child_number)
            .unwrap_or_else(|| dict.unknown_afrom_fields(arena, parent, None, child_number));

        decode_pair_value(
            arena,
            &mut local,
            dict,
            &child_descriptor,
            child_body,
            child_attr_len,
            child_attr_len,
            ctx,
            depth + 1,
        )?;

        offset += child_len;
    }

    cursor.splice(local);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tlv_ok_accepts_single_record_spanning_buffer() {
        assert!(tlv_ok(&[1, 4, 0xaa, 0xbb], 1, 1));
    }

    #[test]
    fn tlv_ok_rejects_length_shorter_than_header() {
        assert!(!tlv_ok(&[1, 1], 1, 1));
    }

    #[test]
    fn tlv_ok_rejects_overflowing_length() {
        assert!(!tlv_ok(&[1, 10, 2, 3], 1, 1));
    }

    #[test]
    fn tlv_ok_permits_zero_type_with_width_one() {
        assert!(tlv_ok(&[0, 3, 0xaa], 1, 1));
    }

    #[test]
    fn tlv_ok_rejects_zero_type_with_width_two() {
        assert!(!tlv_ok(&[0, 0, 0, 3, 0xaa], 2, 1));
    }

    #[test]
    fn tlv_ok_accepts_two_consecutive_records() {
        assert!(tlv_ok(&[1, 3, 0xaa, 2, 3, 0xbb], 1, 1));
    }
}
