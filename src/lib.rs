//! # radius-attrs
//!
//! A RADIUS ([RFC 2865](https://www.rfc-editor.org/rfc/rfc2865),
//! [RFC 2866](https://www.rfc-editor.org/rfc/rfc2866),
//! [RFC 2868](https://www.rfc-editor.org/rfc/rfc2868),
//! [RFC 2869](https://www.rfc-editor.org/rfc/rfc2869),
//! [RFC 6929](https://www.rfc-editor.org/rfc/rfc6929)) attribute decoder.
//!
//! This crate decodes the attribute section of a RADIUS packet into a flat,
//! ordered list of [`ValuePair`]s, given a shared secret, a request
//! authenticator, and a [`Dictionary`] describing the attribute schema. It
//! does not parse the 20-byte RADIUS packet header, send or receive packets,
//! or load dictionary files from disk — those are a transport layer's job,
//! not a wire-format decoder's.
//!
//! Decoding is best-effort by design: a malformed TLV, VSA, or obfuscated
//! value does not abort the packet. It falls back to a raw `octets`
//! reinterpretation under a fabricated descriptor, with the reason recorded
//! on a thread-local diagnostic channel (see [`diagnostics::drain`]). Only a
//! malformed attribute *header* — the two bytes every attribute starts with —
//! is a hard error, since no amount of reinterpretation can find an attribute
//! boundary past a length byte that's simply wrong.
//!
//! ```
//! use radius_attrs::{decode_pair, Arena, Cursor, PacketContext, StaticDictionary};
//!
//! let dict = StaticDictionary::new();
//! let arena = Arena::new();
//! let mut cursor = Cursor::new();
//! let ctx = PacketContext::new("shared-secret", [0u8; 16], false);
//!
//! let bytes = [1u8, 7, b'b', b'o', b'b', b'b', b'y']; // User-Name = "bobby"
//! decode_pair(&arena, &mut cursor, &dict, &bytes, &ctx).unwrap();
//! assert_eq!(cursor.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::cast_lossless)]
#![warn(clippy::cast_possible_truncation)]

mod arena;
mod concat;
mod context;
mod dictionary;
mod diagnostics;
mod encode;
mod error;
mod extended;
mod obfuscation;
mod pair;
mod static_dict;
mod struct_type;
mod tlv;
mod util;
mod value;
mod vp;
mod vsa;
mod wimax;

pub use arena::Arena;
pub use context::PacketContext;
pub use dictionary::{Descriptor, DescriptorFlags, Dictionary, SemanticType, Subtype, VendorRecord};
pub use encode::{
    encode_ascend_secret, encode_pair, encode_tlv_child, encode_tunnel_password, encode_user_password, encode_vsa,
};
pub use error::{DecodeError, DecodeResult};
pub use obfuscation::{decode_ascend_secret, decode_tunnel_password, decode_user_password};
pub use pair::decode_pair;
pub use static_dict::StaticDictionary;
pub use tlv::{decode_tlv, tlv_ok};
pub use value::{decode_pair_value, MAX_DEPTH};
pub use vp::{Cursor, Tag, Value, ValuePair};

/// Drains the thread-local diagnostic messages recorded by fallback decode paths.
pub use diagnostics::drain as drain_diagnostics;
