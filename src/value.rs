//! The value decoder: tag stripping, obfuscation unwrap, length validation,
//! and dispatch to the right sub-decoder or leaf parser (spec §4.8, §4.9).

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use crate::arena::Arena;
use crate::context::PacketContext;
use crate::dictionary::{Descriptor, DescriptorFlags, Dictionary, SemanticType, Subtype};
use crate::diagnostics;
use crate::error::{DecodeError, DecodeResult};
use crate::obfuscation;
use crate::struct_type::decode_struct;
use crate::tlv::decode_tlv;
use crate::util;
use crate::extended;
use crate::vsa::{decode_vsa, decode_vsa_evs};
use crate::vp::{Cursor, Tag, Value, ValuePair};

/// Maximum container recursion depth, per the crate's bounded-recursion policy.
pub const MAX_DEPTH: u8 = 10;

/// Attributes declaring a value longer than this are rejected outright.
const MAX_ATTR_LEN: usize = 128 * 1024;

/// Decodes one attribute's value against `parent`, appending the resulting
/// value-pair(s) to `cursor`.
///
/// Any failure below this point — a bad TLV schema, a cryptographic mismatch,
/// an out-of-range length — is caught here and translated into a single
/// `octets` value-pair under a freshly fabricated "unknown" descriptor,
/// rather than propagated to the caller. Only [`crate::pair::decode_pair`]'s
/// own header-level pre-checks return a hard error.
#[allow(clippy::too_many_arguments)]
pub fn decode_pair_value(
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
    match try_decode(arena, cursor, dict, parent, body, attr_len, packet_len, ctx, depth) {
        Ok(consumed) => Ok(consumed),
        Err(err) => {
            let safe_len = attr_len.min(packet_len).min(body.len());
            diagnostics::record(format!(
                "{}: {err} -> reinterpreted as raw octets",
                parent.name()
            ));

            let lineage = parent.parent().cloned().unwrap_or_else(|| dict.root());
            let unknown = dict.unknown_afrom_fields(arena, &lineage, None, parent.number());
            cursor.push(ValuePair::from_wire(unknown, Tag::None, Value::Octets(body[..safe_len].to_vec())));
            Ok(safe_len)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn try_decode(
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
    if depth > MAX_DEPTH {
        return Err(DecodeError::RecursionLimit);
    }
    if attr_len > packet_len {
        return Err(DecodeError::Overflow {
            declared: attr_len,
            remaining: packet_len,
        });
    }
    if attr_len > MAX_ATTR_LEN {
        return Err(DecodeError::Overflow {
            declared: attr_len,
            remaining: MAX_ATTR_LEN,
        });
    }
    if body.len() < packet_len {
        return Err(DecodeError::Sanity("body shorter than declared packet window"));
    }
    if attr_len == 0 {
        return Ok(0);
    }

    if parent.flags().contains(DescriptorFlags::CONCAT) {
        return crate::concat::decode_concat(cursor, parent, body, attr_len, packet_len);
    }

    let mut work = body[..attr_len].to_vec();
    let mut tag = Tag::None;

    if parent.flags().contains(DescriptorFlags::HAS_TAG) {
        if parent.subtype() == Subtype::TunnelPassword {
            if work.is_empty() {
                return Err(DecodeError::InsufficientData {
                    needed: 1,
                    available: 0,
                });
            }
            let byte = work.remove(0);
            tag = if (0x01..=0x1F).contains(&byte) { Tag::Value(byte) } else { Tag::None };
        } else if !work.is_empty() && work[0] < 0x20 {
            match parent.semantic_type() {
                SemanticType::String => {
                    let byte = work.remove(0);
                    tag = if byte >= 1 { Tag::Value(byte) } else { Tag::None };
                }
                SemanticType::Uint32 if work.len() >= 4 => {
                    let byte = work[0];
                    work[0] = 0;
                    tag = if byte >= 1 { Tag::Value(byte) } else { Tag::None };
                }
                _ => {}
            }
        }
    }

    let vector = ctx.vector();
    match parent.subtype() {
        Subtype::None => {}
        Subtype::UserPassword => {
            let mut plaintext = obfuscation::decode_user_password(&work, ctx.secret(), &vector)?;
            if parent.fixed_length() == 0 {
                while plaintext.last() == Some(&0) {
                    plaintext.pop();
                }
            }
            work = plaintext;
        }
        Subtype::TunnelPassword => {
            work = obfuscation::decode_tunnel_password(&work, ctx.secret(), &vector, ctx.tunnel_password_zeros())?;
        }
        Subtype::AscendSecret => {
            work = obfuscation::decode_ascend_secret(&work, ctx.secret(), &vector)?;
        }
    }

    if let Some((min, max)) = length_range(parent.semantic_type()) {
        if work.len() < min || work.len() > max {
            return Err(DecodeError::MalformedStructure(
                "value length out of range for its semantic type",
            ));
        }
    }

    let consumed = match parent.semantic_type() {
        SemanticType::ComboIpAddr => {
            let resolved_type = match work.len() {
                4 => SemanticType::Ipv4Addr,
                16 => SemanticType::Ipv6Addr,
                _ => return Err(DecodeError::MalformedStructure("combo address length must be 4 or 16")),
            };
            let resolved = resolve_combo_descriptor(arena, dict, parent, resolved_type);
            let value = parse_leaf_value(resolved_type, &work)?;
            cursor.push(ValuePair::from_wire(resolved, tag, value));
            attr_len
        }
        SemanticType::ComboIpPrefix => {
            let resolved_type = match work.len() {
                len if (2..=6).contains(&len) => SemanticType::Ipv4Prefix,
                len if (2..=18).contains(&len) => SemanticType::Ipv6Prefix,
                _ => return Err(DecodeError::MalformedStructure("combo prefix length out of range")),
            };
            let resolved = resolve_combo_descriptor(arena, dict, parent, resolved_type);
            let value = parse_leaf_value(resolved_type, &work)?;
            cursor.push(ValuePair::from_wire(resolved, tag, value));
            attr_len
        }
        SemanticType::Extended => {
            let has_extra = parent.flags().contains(DescriptorFlags::EXTRA);
            extended::decode_extended(arena, cursor, dict, parent, has_extra, body, attr_len, packet_len, ctx, depth)?
        }
        SemanticType::Vsa => {
            // Nested under an extended attribute: RFC 6929 §2.4's inline
            // 5-byte vendor header, not the top-level 4-byte-PEN form.
            let nested_evs = parent.parent().is_some_and(|gp| gp.semantic_type() == SemanticType::Extended);
            if nested_evs {
                decode_vsa_evs(arena, cursor, dict, parent, body, attr_len, ctx, depth)?
            } else {
                decode_vsa(arena, cursor, dict, parent, body, attr_len, packet_len, ctx, depth)?
            }
        }
        SemanticType::Tlv => {
            decode_tlv(arena, cursor, dict, parent, &work, ctx, depth)?;
            attr_len
        }
        SemanticType::Struct => {
            let work_len = work.len();
            decode_struct(arena, cursor, dict, parent, &work, work_len, ctx, depth)?;
            attr_len
        }
        semantic_type => {
            let value = parse_leaf_value(semantic_type, &work)?;
            cursor.push(ValuePair::from_wire(parent.clone(), tag, value));
            attr_len
        }
    };

    Ok(consumed)
}

fn resolve_combo_descriptor(
    arena: &Arena,
    dict: &dyn Dictionary,
    parent: &Arc<Descriptor>,
    resolved_type: SemanticType,
) -> Arc<Descriptor> {
    dict.child_by_type(parent, resolved_type).unwrap_or_else(|| {
        arena.alloc_descriptor(Descriptor::new(
            parent.number(),
            parent.name().to_string(),
            resolved_type,
            parent.parent().cloned(),
            DescriptorFlags::empty(),
            Subtype::None,
            0,
        ))
    })
}

/// The `(min, max)` byte-length window each fixed-shape semantic type accepts.
/// Types with no fixed shape (strings, octets, containers) return `None`.
fn length_range(semantic_type: SemanticType) -> Option<(usize, usize)> {
    use SemanticType::*;
    match semantic_type {
        Ipv4Addr => Some((4, 4)),
        Ipv6Addr => Some((16, 16)),
        Ipv4Prefix => Some((2, 6)),
        Ipv6Prefix => Some((2, 18)),
        ComboIpAddr => Some((4, 16)),
        ComboIpPrefix => Some((2, 18)),
        Bool | Uint8 | Int8 => Some((1, 1)),
        Uint16 | Int16 => Some((2, 2)),
        Uint32 | Int32 | Float32 | Date | TimeDelta => Some((4, 4)),
        Uint64 | Int64 | Float64 => Some((8, 8)),
        Size => Some((4, 8)),
        Ethernet => Some((6, 6)),
        Ifid => Some((8, 8)),
        _ => None,
    }
}

/// Parses `bytes` into a typed value according to `semantic_type`. Shared by
/// the dispatcher, the struct-field decoder, and the combo-address paths.
pub(crate) fn parse_leaf_value(semantic_type: SemanticType, bytes: &[u8]) -> DecodeResult<Value> {
    use SemanticType::*;

    Ok(match semantic_type {
        String => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        Octets => Value::Octets(bytes.to_vec()),
        Ipv4Addr => {
            if bytes.len() != 4 {
                return Err(DecodeError::MalformedStructure("ipv4 address must be 4 bytes"));
            }
            Value::Ipv4Addr(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]))
        }
        Ipv6Addr => {
            if bytes.len() != 16 {
                return Err(DecodeError::MalformedStructure("ipv6 address must be 16 bytes"));
            }
            let mut octets = [0u8; 16];
            octets.copy_from_slice(bytes);
            Value::Ipv6Addr(Ipv6Addr::from(octets))
        }
        Ipv4Prefix => parse_ipv4_prefix(bytes)?,
        Ipv6Prefix => parse_ipv6_prefix(bytes)?,
        Bool => Value::Bool(bytes.first().copied().unwrap_or(0) != 0),
        Uint8 => Value::Uint8(util::read_u8(bytes, 0)?),
        Uint16 => Value::Uint16(util::read_be_u16(bytes, 0)?),
        Uint32 => Value::Uint32(util::read_be_u32(bytes, 0)?),
        Uint64 => Value::Uint64(util::read_be_u64(bytes, 0)?),
        Int8 => Value::Int8(util::read_u8(bytes, 0)? as i8),
        Int16 => Value::Int16(util::read_be_u16(bytes, 0)? as i16),
        Int32 => Value::Int32(util::read_be_u32(bytes, 0)? as i32),
        Int64 => Value::Int64(util::read_be_u64(bytes, 0)? as i64),
        Float32 => Value::Float32(f32::from_bits(util::read_be_u32(bytes, 0)?)),
        Float64 => Value::Float64(f64::from_bits(util::read_be_u64(bytes, 0)?)),
        Date => Value::Date(util::read_be_u32(bytes, 0)?),
        TimeDelta => Value::TimeDelta(util::read_be_u32(bytes, 0)? as i32),
        Ethernet => {
            if bytes.len() != 6 {
                return Err(DecodeError::MalformedStructure("ethernet address must be 6 bytes"));
            }
            let mut mac = [0u8; 6];
            mac.copy_from_slice(bytes);
            Value::Ethernet(mac)
        }
        Ifid => {
            if bytes.len() != 8 {
                return Err(DecodeError::MalformedStructure("interface identifier must be 8 bytes"));
            }
            let mut ifid = [0u8; 8];
            ifid.copy_from_slice(bytes);
            Value::Ifid(ifid)
        }
        Size => {
            let widened = match bytes.len() {
                4 => util::read_be_u32(bytes, 0)? as u64,
                8 => util::read_be_u64(bytes, 0)?,
                _ => return Err(DecodeError::MalformedStructure("size must be 4 or 8 bytes")),
            };
            Value::Size(widened)
        }
        Abinary => Value::Abinary(bytes.to_vec()),
        _ => return Err(DecodeError::Sanity("semantic type has no leaf representation")),
    })
}

/// Parses an RFC 3162 §2 IPv4 prefix: reserved byte, prefix length, up to 4
/// address bytes (zero-extended if fewer are present). Non-masked bits are
/// **not** required to be zero (spec §4.9, §9 "Colubris quirk").
fn parse_ipv4_prefix(bytes: &[u8]) -> DecodeResult<Value> {
    if bytes.len() < 2 {
        return Err(DecodeError::InsufficientData {
            needed: 2,
            available: bytes.len(),
        });
    }
    if bytes[0] != 0 {
        return Err(DecodeError::MalformedStructure("ipv4 prefix reserved byte must be zero"));
    }

    let prefix_len = bytes[1];
    if prefix_len > 32 {
        return Err(DecodeError::MalformedStructure("ipv4 prefix length out of range"));
    }

    let addr_bytes = &bytes[2..];
    if addr_bytes.len() > 4 {
        return Err(DecodeError::MalformedStructure("ipv4 prefix address too long"));
    }

    let mut octets = [0u8; 4];
    octets[..addr_bytes.len()].copy_from_slice(addr_bytes);

    let mask: u32 = if prefix_len == 0 { 0 } else { u32::MAX << (32 - prefix_len as u32) };
    let masked = u32::from_be_bytes(octets) & mask;

    Ok(Value::Ipv4Prefix {
        prefix_len,
        addr: Ipv4Addr::from(masked),
    })
}

/// Parses an RFC 3162 §2 IPv6 prefix. Unlike the IPv4 form, bits past the
/// prefix length must already be zero on the wire; a mismatch is treated as
/// malformed rather than silently masked (spec §4.9).
fn parse_ipv6_prefix(bytes: &[u8]) -> DecodeResult<Value> {
    if bytes.len() < 2 {
        return Err(DecodeError::InsufficientData {
            needed: 2,
            available: bytes.len(),
        });
    }
    if bytes[0] != 0 {
        return Err(DecodeError::MalformedStructure("ipv6 prefix reserved byte must be zero"));
    }

    let prefix_len = bytes[1];
    if prefix_len > 128 {
        return Err(DecodeError::MalformedStructure("ipv6 prefix length out of range"));
    }

    let addr_bytes = &bytes[2..];
    let required_bytes = (prefix_len as usize + 7) / 8;
    if addr_bytes.len() < required_bytes {
        return Err(DecodeError::MalformedStructure(
            "ipv6 prefix address too short for its declared prefix length",
        ));
    }
    if addr_bytes.len() > 16 {
        return Err(DecodeError::MalformedStructure("ipv6 prefix address too long"));
    }

    let mut octets = [0u8; 16];
    octets[..addr_bytes.len()].copy_from_slice(addr_bytes);

    let masked = mask_ipv6(octets, prefix_len);
    if masked != octets {
        return Err(DecodeError::MalformedStructure(
            "ipv6 prefix has nonzero bits past its declared prefix length",
        ));
    }

    Ok(Value::Ipv6Prefix {
        prefix_len,
        addr: Ipv6Addr::from(masked),
    })
}

fn mask_ipv6(mut octets: [u8; 16], prefix_len: u8) -> [u8; 16] {
    let mut remaining = prefix_len as u32;
    for byte in octets.iter_mut() {
        if remaining >= 8 {
            remaining -= 8;
            continue;
        }
        let mask: u8 = if remaining == 0 { 0 } else { 0xFFu8 << (8 - remaining) };
        *byte &= mask;
        remaining = 0;
    }
    octets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::VendorRecord;

    struct StubDict {
        root: Arc<Descriptor>,
    }

    impl Dictionary for StubDict {
        fn root(&self) -> Arc<Descriptor> {
            self.root.clone()
        }

        fn child_by_num(&self, _parent: &Arc<Descriptor>, _number: u32) -> Option<Arc<Descriptor>> {
            None
        }

        fn child_by_type(&self, _parent: &Arc<Descriptor>, _semantic_type: SemanticType) -> Option<Arc<Descriptor>> {
            None
        }

        fn vendor_by_num(&self, _pen: u32) -> Option<Arc<VendorRecord>> {
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

        fn unknown_vendor_afrom_num(&self, arena: &Arena, _parent: &Arc<Descriptor>, pen: u32) -> Arc<VendorRecord> {
            arena.alloc_vendor(VendorRecord::new(pen, "Unknown", 1, 1, false))
        }
    }

    fn ctx() -> PacketContext {
        PacketContext::new("testing123", [0; 16], false)
    }

    #[test]
    fn plain_string_attribute_decodes() {
        let root = Arc::new(Descriptor::unknown(0, None));
        let user_name = Arc::new(Descriptor::new(
            1,
            "User-Name",
            SemanticType::String,
            Some(root.clone()),
            DescriptorFlags::empty(),
            Subtype::None,
            0,
        ));
        let dict = StubDict { root };
        let arena = Arena::new();
        let mut cursor = Cursor::new();

        let body = b"bobby";
        let consumed =
            decode_pair_value(&arena, &mut cursor, &dict, &user_name, body, body.len(), body.len(), &ctx(), 0).unwrap();

        assert_eq!(consumed, 5);
        assert_eq!(cursor.len(), 1);
        match cursor.as_slice()[0].value() {
            Value::String(s) => assert_eq!(s, "bobby"),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn zero_length_attribute_emits_no_vps() {
        let root = Arc::new(Descriptor::unknown(0, None));
        let descriptor = Arc::new(Descriptor::new(
            89,
            "Chargeable-User-Identity",
            SemanticType::Octets,
            Some(root.clone()),
            DescriptorFlags::empty(),
            Subtype::None,
            0,
        ));
        let dict = StubDict { root };
        let arena = Arena::new();
        let mut cursor = Cursor::new();

        let consumed = decode_pair_value(&arena, &mut cursor, &dict, &descriptor, &[], 0, 0, &ctx(), 0).unwrap();
        assert_eq!(consumed, 0);
        assert!(cursor.is_empty());
    }

    #[test]
    fn malformed_ipv4_prefix_falls_back_to_raw_octets() {
        let root = Arc::new(Descriptor::unknown(0, None));
        let framed_route = Arc::new(Descriptor::new(
            97,
            "Framed-IPv4-Prefix",
            SemanticType::Ipv4Prefix,
            Some(root.clone()),
            DescriptorFlags::empty(),
            Subtype::None,
            0,
        ));
        let dict = StubDict { root };
        let arena = Arena::new();
        let mut cursor = Cursor::new();

        // reserved byte nonzero -> malformed -> raw fallback
        let body = [1u8, 24, 10, 0, 0, 1];
        let consumed =
            decode_pair_value(&arena, &mut cursor, &dict, &framed_route, &body, body.len(), body.len(), &ctx(), 0)
                .unwrap();

        assert_eq!(consumed, body.len());
        assert_eq!(cursor.len(), 1);
        let vp = &cursor.as_slice()[0];
        assert!(vp.descriptor().is_unknown());
        match vp.value() {
            Value::Octets(raw) => assert_eq!(raw, &body),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn tagged_string_extracts_tag_and_strips_byte() {
        let root = Arc::new(Descriptor::unknown(0, None));
        let tunnel_client = Arc::new(Descriptor::new(
            66,
            "Tunnel-Client-Endpoint",
            SemanticType::String,
            Some(root.clone()),
            DescriptorFlags::HAS_TAG,
            Subtype::None,
            0,
        ));
        let dict = StubDict { root };
        let arena = Arena::new();
        let mut cursor = Cursor::new();

        let mut body = vec![3u8];
        body.extend_from_slice(b"10.0.0.1");

        let body_len = body.len();
        decode_pair_value(&arena, &mut cursor, &dict, &tunnel_client, &body, body_len, body_len, &ctx(), 0).unwrap();

        let vp = &cursor.as_slice()[0];
        assert_eq!(vp.tag(), Tag::Value(3));
        match vp.value() {
            Value::String(s) => assert_eq!(s, "10.0.0.1"),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn ipv4_prefix_masks_non_prefix_bits() {
        let value = parse_ipv4_prefix(&[0, 24, 10, 0, 0, 255]).unwrap();
        match value {
            Value::Ipv4Prefix { prefix_len, addr } => {
                assert_eq!(prefix_len, 24);
                assert_eq!(addr, Ipv4Addr::new(10, 0, 0, 0));
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn ipv6_prefix_rejects_nonzero_bits_past_prefix() {
        let mut bytes = vec![0u8, 8]; // prefix_len 8
        bytes.extend_from_slice(&[0xff, 0xff]); // second byte should be masked off, isn't
        assert!(parse_ipv6_prefix(&bytes).is_err());
    }
}
