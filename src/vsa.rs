//! Vendor-Specific Attribute decoding (spec §4.7).

use std::sync::Arc;

use byteorder::{ByteOrder, NetworkEndian};

use crate::arena::Arena;
use crate::context::PacketContext;
use crate::dictionary::{Descriptor, Dictionary};
use crate::error::{DecodeError, DecodeResult};
use crate::tlv::tlv_ok;
use crate::value::decode_pair_value;
use crate::vp::Cursor;
use crate::wimax::decode_wimax;

/// Decodes a top-level Vendor-Specific Attribute: a 4-byte PEN followed by
/// vendor sub-attributes under that vendor's declared `(type_width,
/// length_width)` schema (or WiMAX fragmentation, if the vendor uses it).
///
/// `body` starts at the PEN field and spans to the end of the packet, per
/// this crate's window convention; `attr_len` is this VSA's own declared
/// value length.
pub fn decode_vsa(
    arena: &Arena,
    cursor: &mut Cursor,
    dict: &dyn Dictionary,
    parent: &Arc<Descriptor>,
    body: &[u8],
    attr_len: usize,
    packet_len: usize,
    ctx: &PacketContext,
    depth: u8,
) -> DecodeResult<usize> {
    if attr_len < 4 {
        return Err(DecodeError::InsufficientData {
            needed: 4,
            available: attr_len,
        });
    }

    if body[0] != 0 {
        return Err(DecodeError::MalformedStructure(
            "vendor PEN top byte must be zero",
        ));
    }

    let pen = NetworkEndian::read_u32(&body[0..4]);

    let vendor = dict
        .vendor_by_num(pen)
        .unwrap_or_else(|| dict.unknown_vendor_afrom_num(arena, parent, pen));

    if vendor.is_wimax() {
        let consumed = decode_wimax(
            arena,
            cursor,
            dict,
            &vendor,
            parent.number(),
            &body[4..],
            attr_len - 4,
            packet_len - 4,
            ctx,
            depth + 1,
        )?;
        return Ok(4 + consumed);
    }

    let records = &body[4..attr_len];
    let local = decode_vsa_internal(
        arena,
        dict,
        &vendor.root(),
        pen,
        records,
        vendor.type_width(),
        vendor.length_width(),
        ctx,
        depth + 1,
    )?;

    cursor.splice(local);
    Ok(attr_len)
}

/// Decodes a Vendor-Specific attribute nested inline inside an extended
/// attribute (RFC 6929 §2.4, "Extended-Type Vendor-Specific"): a 4-byte
/// vendor ID, a 1-byte vendor sub-type, and a value filling the rest of the
/// attribute. There is no separate length field here — the enclosing
/// extended attribute's own length already bounds the value — and, unlike
/// the top-level form, the vendor ID is not required to fit in 3 bytes.
///
/// `body` starts at the vendor-ID field and spans to the end of the packet;
/// `attr_len` is the remaining value length, vendor ID and sub-type included.
pub fn decode_vsa_evs(
    arena: &Arena,
    cursor: &mut Cursor,
    dict: &dyn Dictionary,
    parent: &Arc<Descriptor>,
    body: &[u8],
    attr_len: usize,
    ctx: &PacketContext,
    depth: u8,
) -> DecodeResult<usize> {
    if attr_len < 5 {
        return Err(DecodeError::InsufficientData {
            needed: 5,
            available: attr_len,
        });
    }

    let pen = NetworkEndian::read_u32(&body[0..4]);
    let vendor_type = body[4] as u32;

    let vendor = dict
        .vendor_by_num(pen)
        .unwrap_or_else(|| dict.unknown_vendor_afrom_num(arena, parent, pen));

    let child_descriptor = dict
        .child_by_num(&vendor.root(), vendor_type)
        .unwrap_or_else(|| dict.unknown_afrom_fields(arena, &vendor.root(), Some(pen), vendor_type));

    let value_len = attr_len - 5;
    let value_body = &body[5..attr_len];

    decode_pair_value(arena, cursor, dict, &child_descriptor, value_body, value_len, value_len, ctx, depth + 1)?;

    Ok(attr_len)
}

/// Walks a vendor's sub-attribute record list under an arbitrary
/// `(type_width, length_width)` schema, recursing into the value decoder for
/// each record. Atomic: records are staged in a local cursor and returned
/// only if every record decodes successfully.
#[allow(clippy::too_many_arguments)]
pub fn decode_vsa_internal(
    arena: &Arena,
    dict: &dyn Dictionary,
    vendor_root: &Arc<Descriptor>,
    pen: u32,
    records: &[u8],
    type_width: u8,
    length_width: u8,
    ctx: &PacketContext,
    depth: u8,
) -> DecodeResult<Cursor> {
    if !tlv_ok(records, type_width, length_width) {
        return Err(DecodeError::MalformedStructure(
            "vendor sub-attribute schema violation",
        ));
    }

    let mut cursor = Cursor::new();
    let mut offset = 0usize;
    let header_len = type_width as usize + length_width as usize;

    while offset < records.len() {
        let type_bytes = &records[offset..offset + type_width as usize];
        let number = match type_width {
            1 => type_bytes[0] as u32,
            2 => NetworkEndian::read_u16(type_bytes) as u32,
            4 => NetworkEndian::read_u32(type_bytes),
            _ => return Err(DecodeError::Sanity("unsupported vendor type_width")),
        };

        let record_len = match length_width {
            0 => records.len() - offset,
            1 => records[offset + type_width as usize] as usize,
            2 => records[offset + type_width as usize + 1] as usize,
            _ => return Err(DecodeError::Sanity("unsupported vendor length_width")),
        };

        let child_body = &records[offset + header_len..offset + record_len];
        let child_attr_len = record_len - header_len;

        let child_descriptor = dict
            .child_by_num(vendor_root, number)
            .unwrap_or_else(|| dict.unknown_afrom_fields(arena, vendor_root, Some(pen), number));

        decode_pair_value(
            arena,
            &mut cursor,
            dict,
            &child_descriptor,
            child_body,
            child_attr_len,
            child_attr_len,
            ctx,
            depth + 1,
        )?;

        offset += record_len;
    }

    Ok(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{DescriptorFlags, SemanticType, Subtype, VendorRecord};
    use crate::vp::Value;

    struct StubDict {
        vendor: Arc<VendorRecord>,
        child: Arc<Descriptor>,
    }

    impl Dictionary for StubDict {
        fn root(&self) -> Arc<Descriptor> {
            self.vendor.root()
        }

        fn child_by_num(&self, _parent: &Arc<Descriptor>, number: u32) -> Option<Arc<Descriptor>> {
            (number == self.child.number()).then(|| self.child.clone())
        }

        fn child_by_type(&self, _parent: &Arc<Descriptor>, _semantic_type: SemanticType) -> Option<Arc<Descriptor>> {
            None
        }

        fn vendor_by_num(&self, pen: u32) -> Option<Arc<VendorRecord>> {
            (pen == self.vendor.pen()).then(|| self.vendor.clone())
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

        fn unknown_vendor_afrom_num(&self, arena: &Arena, _parent: &Arc<Descriptor>, pen: u32) -> Arc<VendorRecord> {
            arena.alloc_vendor(VendorRecord::new(pen, "Unknown", 1, 1, false))
        }
    }

    fn ctx() -> PacketContext {
        PacketContext::new("testing123", [0; 16], false)
    }

    fn cisco_avpair_descriptor(vendor: &VendorRecord) -> Arc<Descriptor> {
        Arc::new(Descriptor::new(
            1,
            "Cisco-AVPair",
            SemanticType::String,
            Some(vendor.root()),
            DescriptorFlags::empty(),
            Subtype::None,
            0,
        ))
    }

    #[test]
    fn cisco_avpair_decodes_under_tlv_1_1_schema() {
        let vendor = Arc::new(VendorRecord::new(9, "Cisco", 1, 1, false));
        let child = cisco_avpair_descriptor(&vendor);
        let dict = StubDict { vendor, child };
        let arena = Arena::new();
        let mut cursor = Cursor::new();

        let value = b"shell:priv-lvl=15";
        let mut body = vec![0, 0, 0, 9]; // PEN 9
        body.push(1); // sub-attr number
        body.push(2 + value.len() as u8); // sub-attr length
        body.extend_from_slice(value);

        let attr_len = body.len();
        let consumed = decode_vsa(&arena, &mut cursor, &dict, &dict.child, &body, attr_len, attr_len, &ctx(), 0).unwrap();

        assert_eq!(consumed, attr_len);
        assert_eq!(cursor.len(), 1);
        match cursor.as_slice()[0].value() {
            Value::String(s) => assert_eq!(s, "shell:priv-lvl=15"),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn evs_nested_form_reads_pen_and_vendor_type_with_no_length_byte() {
        let vendor = Arc::new(VendorRecord::new(9, "Cisco", 1, 1, false));
        let child = cisco_avpair_descriptor(&vendor);
        let dict = StubDict { vendor, child };
        let arena = Arena::new();
        let mut cursor = Cursor::new();
        let extended_parent = Arc::new(Descriptor::new(
            26,
            "Extended-Vendor-Specific",
            SemanticType::Vsa,
            None,
            DescriptorFlags::empty(),
            Subtype::None,
            0,
        ));

        let mut body = vec![0, 0, 0, 9]; // vendor id 9, no reserved-byte restriction
        body.push(1); // vendor sub-type
        body.extend_from_slice(b"shell:priv-lvl=15");

        let attr_len = body.len();
        let consumed =
            decode_vsa_evs(&arena, &mut cursor, &dict, &extended_parent, &body, attr_len, &ctx(), 0).unwrap();

        assert_eq!(consumed, attr_len);
        assert_eq!(cursor.len(), 1);
        match cursor.as_slice()[0].value() {
            Value::String(s) => assert_eq!(s, "shell:priv-lvl=15"),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn malformed_child_length_falls_back_to_error_not_partial_list() {
        let vendor = Arc::new(VendorRecord::new(9, "Cisco", 1, 1, false));
        let child = cisco_avpair_descriptor(&vendor);
        let dict = StubDict { vendor, child };
        let arena = Arena::new();
        let mut cursor = Cursor::new();

        let mut body = vec![0, 0, 0, 9];
        body.push(1);
        body.push(255); // declares far more than available
        body.extend_from_slice(b"short");

        let attr_len = body.len();
        let err = decode_vsa(&arena, &mut cursor, &dict, &dict.child, &body, attr_len, attr_len, &ctx(), 0).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedStructure(_)));
        assert!(cursor.is_empty());
    }
}
