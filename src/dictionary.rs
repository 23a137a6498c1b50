//! The dictionary interface consumed by the decoder, and the descriptor/vendor
//! types it hands back.
//!
//! Per the crate's scope, the dictionary *loader* (its on-disk format, parsing,
//! persistent mutation) is an external collaborator and is not implemented
//! here. What is implemented is the trait the decoder actually calls, plus one
//! concrete in-memory dictionary (see [`StaticDictionary`] in
//! [`crate::static_dict`]) seeded with enough attributes to exercise every
//! decode path.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::arena::Arena;

/// The semantic type of an attribute's value, as declared by its dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    /// UTF-8 text.
    String,
    /// Opaque octets.
    Octets,
    /// A 4-byte IPv4 address.
    Ipv4Addr,
    /// A 16-byte IPv6 address.
    Ipv6Addr,
    /// A reserved byte, prefix length, and up to 4 address bytes.
    Ipv4Prefix,
    /// A reserved byte, prefix length, and up to 16 address bytes.
    Ipv6Prefix,
    /// Either an IPv4 or IPv6 address, disambiguated by length.
    ComboIpAddr,
    /// Either an IPv4 or IPv6 prefix, disambiguated by length.
    ComboIpPrefix,
    /// A single-byte boolean.
    Bool,
    /// An 8-bit unsigned integer.
    Uint8,
    /// A 16-bit unsigned integer.
    Uint16,
    /// A 32-bit unsigned integer.
    Uint32,
    /// A 64-bit unsigned integer.
    Uint64,
    /// An 8-bit signed integer.
    Int8,
    /// A 16-bit signed integer.
    Int16,
    /// A 32-bit signed integer.
    Int32,
    /// A 64-bit signed integer.
    Int64,
    /// A 32-bit IEEE-754 float.
    Float32,
    /// A 64-bit IEEE-754 float.
    Float64,
    /// A 32-bit Unix timestamp.
    Date,
    /// A 32-bit signed duration in seconds.
    TimeDelta,
    /// A 6-byte MAC address.
    Ethernet,
    /// An 8-byte interface identifier.
    Ifid,
    /// A 4- or 8-byte unsigned size.
    Size,
    /// Ascend's opaque filter binary format.
    Abinary,
    /// A container of child TLV attributes.
    Tlv,
    /// A fixed-layout compound value, possibly with a trailing TLV tail.
    Struct,
    /// A Vendor-Specific Attribute container.
    Vsa,
    /// A vendor root descriptor (not itself a wire value).
    Vendor,
    /// An RFC 6929 extended or long-extended attribute.
    Extended,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Octets => "octets",
            Self::Ipv4Addr => "ipv4addr",
            Self::Ipv6Addr => "ipv6addr",
            Self::Ipv4Prefix => "ipv4prefix",
            Self::Ipv6Prefix => "ipv6prefix",
            Self::ComboIpAddr => "combo-ip-addr",
            Self::ComboIpPrefix => "combo-ip-prefix",
            Self::Bool => "bool",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Date => "date",
            Self::TimeDelta => "time_delta",
            Self::Ethernet => "ethernet",
            Self::Ifid => "ifid",
            Self::Size => "size",
            Self::Abinary => "abinary",
            Self::Tlv => "tlv",
            Self::Struct => "struct",
            Self::Vsa => "vsa",
            Self::Vendor => "vendor",
            Self::Extended => "extended",
        };
        write!(f, "{name}")
    }
}

/// The obfuscation scheme applied to an attribute's value, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Subtype {
    /// No obfuscation.
    #[default]
    None,
    /// RFC 2865 User-Password style obfuscation.
    UserPassword,
    /// RFC 2868 Tunnel-Password style (salted) obfuscation.
    TunnelPassword,
    /// Ascend's vendor-specific single-block obfuscation.
    AscendSecret,
}

bitflags! {
    /// Flags describing a dictionary entry, mirrored from the data model in the
    /// crate's top-level documentation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DescriptorFlags: u8 {
        /// A tag byte (`0x01..0x1F`) may precede the value.
        const HAS_TAG   = 0b0000_0001;
        /// RFC 2869 concatenation across consecutive same-typed attributes.
        const CONCAT    = 0b0000_0010;
        /// Long-extended flag byte is present (RFC 6929).
        const EXTRA     = 0b0000_0100;
        /// This descriptor was fabricated for an attribute absent from the dictionary.
        const IS_UNKNOWN = 0b0000_1000;
    }
}

crate::util::bitflags_display_impl! { DescriptorFlags }

/// An immutable attribute descriptor, as handed back by a [`Dictionary`].
#[derive(Debug, Clone)]
pub struct Descriptor {
    number: u32,
    name: String,
    semantic_type: SemanticType,
    parent: Option<Arc<Descriptor>>,
    flags: DescriptorFlags,
    subtype: Subtype,
    /// Fixed wire width in bytes, if nonzero (the `length` flag in the data model).
    fixed_length: usize,
}

impl Descriptor {
    /// Builds a new descriptor.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        number: u32,
        name: impl Into<String>,
        semantic_type: SemanticType,
        parent: Option<Arc<Descriptor>>,
        flags: DescriptorFlags,
        subtype: Subtype,
        fixed_length: usize,
    ) -> Self {
        Self {
            number,
            name: name.into(),
            semantic_type,
            parent,
            flags,
            subtype,
            fixed_length,
        }
    }

    /// Builds a fabricated "unknown" descriptor for an attribute absent from the dictionary.
    pub fn unknown(number: u32, parent: Option<Arc<Descriptor>>) -> Self {
        Self {
            number,
            name: format!("Unknown-Attribute-{number}"),
            semantic_type: SemanticType::Octets,
            parent,
            flags: DescriptorFlags::IS_UNKNOWN,
            subtype: Subtype::None,
            fixed_length: 0,
        }
    }

    /// The attribute number, unique among siblings under the same parent.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The human-readable attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The semantic type governing how this attribute's value is decoded.
    pub fn semantic_type(&self) -> SemanticType {
        self.semantic_type
    }

    /// The parent descriptor this attribute nests under, if any.
    pub fn parent(&self) -> Option<&Arc<Descriptor>> {
        self.parent.as_ref()
    }

    /// Flags describing tagging, concatenation, long-extended framing, and provenance.
    pub fn flags(&self) -> DescriptorFlags {
        self.flags
    }

    /// The obfuscation scheme applied to this attribute's value.
    pub fn subtype(&self) -> Subtype {
        self.subtype
    }

    /// The fixed wire width of this attribute, or `0` if variable-length.
    pub fn fixed_length(&self) -> usize {
        self.fixed_length
    }

    /// Whether this descriptor was fabricated rather than looked up.
    pub fn is_unknown(&self) -> bool {
        self.flags.contains(DescriptorFlags::IS_UNKNOWN)
    }
}

/// A vendor entry, naming the TLV schema used by its sub-attributes.
#[derive(Debug, Clone)]
pub struct VendorRecord {
    pen: u32,
    name: String,
    type_width: u8,
    length_width: u8,
    is_wimax: bool,
    root: Arc<Descriptor>,
}

impl VendorRecord {
    /// Builds a new vendor record.
    pub fn new(
        pen: u32,
        name: impl Into<String>,
        type_width: u8,
        length_width: u8,
        is_wimax: bool,
    ) -> Self {
        let name = name.into();
        let root = Arc::new(Descriptor::new(
            pen,
            format!("{name}-Vendor-Root"),
            SemanticType::Vendor,
            None,
            DescriptorFlags::empty(),
            Subtype::None,
            0,
        ));

        Self {
            pen,
            name,
            type_width,
            length_width,
            is_wimax,
            root,
        }
    }

    /// The vendor's IANA Private Enterprise Number.
    pub fn pen(&self) -> u32 {
        self.pen
    }

    /// The vendor's human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The width, in bytes, of a sub-attribute type field (1, 2, or 4).
    pub fn type_width(&self) -> u8 {
        self.type_width
    }

    /// The width, in bytes, of a sub-attribute length field (0, 1, or 2).
    pub fn length_width(&self) -> u8 {
        self.length_width
    }

    /// Whether this vendor's sub-attributes are fragmented per the WiMAX Forum scheme.
    pub fn is_wimax(&self) -> bool {
        self.is_wimax
    }

    /// The synthetic descriptor used as the parent for lookups of this vendor's children.
    pub fn root(&self) -> Arc<Descriptor> {
        self.root.clone()
    }
}

/// The dictionary interface the decoder consumes.
///
/// Implementations are expected to be read-only during a decode and shareable
/// across threads (each thread still needs its own [`Arena`](crate::arena::Arena),
/// cursor, and packet context — see the crate's concurrency notes).
pub trait Dictionary: Send + Sync {
    /// The synthetic root descriptor that all top-level attributes nest under.
    fn root(&self) -> Arc<Descriptor>;

    /// Looks up a child of `parent` by its attribute number.
    fn child_by_num(&self, parent: &Arc<Descriptor>, number: u32) -> Option<Arc<Descriptor>>;

    /// Looks up a child of `parent` by semantic type, used to resolve `combo_ip_*` variants.
    fn child_by_type(
        &self,
        parent: &Arc<Descriptor>,
        semantic_type: SemanticType,
    ) -> Option<Arc<Descriptor>>;

    /// Looks up a vendor by its Private Enterprise Number.
    fn vendor_by_num(&self, pen: u32) -> Option<Arc<VendorRecord>>;

    /// Fabricates a placeholder descriptor for an attribute absent from the dictionary,
    /// preserving the parent/vendor lineage for diagnostics.
    fn unknown_afrom_fields(
        &self,
        arena: &Arena,
        parent: &Arc<Descriptor>,
        pen: Option<u32>,
        number: u32,
    ) -> Arc<Descriptor>;

    /// Fabricates a placeholder vendor record for a PEN absent from the dictionary.
    fn unknown_vendor_afrom_num(
        &self,
        arena: &Arena,
        parent: &Arc<Descriptor>,
        pen: u32,
    ) -> Arc<VendorRecord>;
}
