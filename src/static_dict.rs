//! A small in-memory [`Dictionary`] seeded with enough RFC 2865/2866/2868/2869/6929
//! attributes, plus Cisco and WiMAX Forum vendors, to exercise every decode path.
//!
//! This is test/demonstration scaffolding, not a dictionary loader: a real
//! deployment would parse vendor dictionary files and build something like
//! this at startup. Everything here is built once, up front, and is
//! immutable afterward.

use std::sync::Arc;

use crate::arena::Arena;
use crate::dictionary::{Descriptor, DescriptorFlags, Dictionary, SemanticType, Subtype, VendorRecord};

const CISCO_PEN: u32 = 9;
const WIMAX_PEN: u32 = 24757;

/// One parent descriptor and the children looked up underneath it, either by
/// attribute number ([`Dictionary::child_by_num`]) or by semantic type
/// ([`Dictionary::child_by_type`], used to resolve `combo_ip_*` variants).
struct Container {
    owner: Arc<Descriptor>,
    children: Vec<Arc<Descriptor>>,
}

/// A fixed, in-memory RADIUS attribute dictionary.
pub struct StaticDictionary {
    root: Arc<Descriptor>,
    containers: Vec<Container>,
    vendors: Vec<Arc<VendorRecord>>,
}

#[allow(clippy::too_many_arguments)]
fn attr(
    number: u32,
    name: &str,
    semantic_type: SemanticType,
    parent: &Arc<Descriptor>,
    flags: DescriptorFlags,
    subtype: Subtype,
    fixed_length: usize,
) -> Arc<Descriptor> {
    Arc::new(Descriptor::new(
        number,
        name,
        semantic_type,
        Some(parent.clone()),
        flags,
        subtype,
        fixed_length,
    ))
}

impl StaticDictionary {
    /// Builds the dictionary.
    pub fn new() -> Self {
        let root = Arc::new(Descriptor::unknown(0, None));
        let mut containers = Vec::new();

        let mut top_level = Vec::new();
        let mut push = |d: Arc<Descriptor>| top_level.push(d);

        push(attr(1, "User-Name", SemanticType::String, &root, DescriptorFlags::empty(), Subtype::None, 0));
        push(attr(
            2,
            "User-Password",
            SemanticType::Octets,
            &root,
            DescriptorFlags::empty(),
            Subtype::UserPassword,
            0,
        ));
        push(attr(3, "CHAP-Password", SemanticType::Octets, &root, DescriptorFlags::empty(), Subtype::None, 0));
        push(attr(4, "NAS-IP-Address", SemanticType::Ipv4Addr, &root, DescriptorFlags::empty(), Subtype::None, 0));
        push(attr(5, "NAS-Port", SemanticType::Uint32, &root, DescriptorFlags::empty(), Subtype::None, 0));
        push(attr(6, "Service-Type", SemanticType::Uint32, &root, DescriptorFlags::empty(), Subtype::None, 0));
        push(attr(7, "Framed-Protocol", SemanticType::Uint32, &root, DescriptorFlags::empty(), Subtype::None, 0));
        let framed_ip_address =
            attr(8, "Framed-IP-Address", SemanticType::ComboIpAddr, &root, DescriptorFlags::empty(), Subtype::None, 0);
        push(framed_ip_address.clone());
        push(attr(18, "Reply-Message", SemanticType::String, &root, DescriptorFlags::empty(), Subtype::None, 0));
        let vendor_specific =
            attr(26, "Vendor-Specific", SemanticType::Vsa, &root, DescriptorFlags::empty(), Subtype::None, 0);
        push(vendor_specific);
        push(attr(40, "Acct-Status-Type", SemanticType::Uint32, &root, DescriptorFlags::empty(), Subtype::None, 0));
        push(attr(55, "Event-Timestamp", SemanticType::Date, &root, DescriptorFlags::empty(), Subtype::None, 0));
        push(attr(64, "Tunnel-Type", SemanticType::Uint32, &root, DescriptorFlags::HAS_TAG, Subtype::None, 0));
        push(attr(
            69,
            "Tunnel-Password",
            SemanticType::Octets,
            &root,
            DescriptorFlags::HAS_TAG,
            Subtype::TunnelPassword,
            0,
        ));
        push(attr(79, "EAP-Message", SemanticType::Octets, &root, DescriptorFlags::CONCAT, Subtype::None, 0));
        push(attr(80, "Message-Authenticator", SemanticType::Octets, &root, DescriptorFlags::empty(), Subtype::None, 16));
        push(attr(
            81,
            "Tunnel-Private-Group-Id",
            SemanticType::String,
            &root,
            DescriptorFlags::HAS_TAG,
            Subtype::None,
            0,
        ));
        push(attr(88, "Framed-Pool", SemanticType::Octets, &root, DescriptorFlags::empty(), Subtype::None, 0));
        push(attr(
            214,
            "Ascend-Send-Secret",
            SemanticType::Octets,
            &root,
            DescriptorFlags::empty(),
            Subtype::AscendSecret,
            0,
        ));
        push(attr(89, "Chargeable-User-Identity", SemanticType::Octets, &root, DescriptorFlags::empty(), Subtype::None, 0));
        push(attr(96, "Login-IPv6-Host", SemanticType::Ipv6Addr, &root, DescriptorFlags::empty(), Subtype::None, 0));
        push(attr(97, "Framed-IPv6-Prefix", SemanticType::Ipv6Prefix, &root, DescriptorFlags::empty(), Subtype::None, 0));
        push(attr(99, "Framed-IPv6-Route", SemanticType::String, &root, DescriptorFlags::empty(), Subtype::None, 0));
        push(attr(100, "Framed-IPv6-Pool", SemanticType::Octets, &root, DescriptorFlags::empty(), Subtype::None, 0));
        push(attr(
            123,
            "Delegated-IPv6-Prefix",
            SemanticType::Ipv6Prefix,
            &root,
            DescriptorFlags::empty(),
            Subtype::None,
            0,
        ));
        let operator_name_tlv =
            attr(126, "Operator-Name-TLV", SemanticType::Tlv, &root, DescriptorFlags::empty(), Subtype::None, 0);
        push(operator_name_tlv.clone());
        let connect_info_struct =
            attr(140, "Connect-Info-Struct", SemanticType::Struct, &root, DescriptorFlags::empty(), Subtype::None, 0);
        push(connect_info_struct.clone());
        push(attr(168, "Framed-IPv6-Address", SemanticType::Ipv6Addr, &root, DescriptorFlags::empty(), Subtype::None, 0));
        let extended_one = attr(
            241,
            "Extended-Attribute-1",
            SemanticType::Extended,
            &root,
            DescriptorFlags::empty(),
            Subtype::None,
            0,
        );
        push(extended_one.clone());
        let extended_two = attr(
            242,
            "Extended-Attribute-2",
            SemanticType::Extended,
            &root,
            DescriptorFlags::EXTRA,
            Subtype::None,
            0,
        );
        push(extended_two.clone());

        containers.push(Container { owner: root.clone(), children: top_level });

        containers.push(Container {
            owner: framed_ip_address.clone(),
            children: vec![
                attr(8, "Framed-IP-Address", SemanticType::Ipv4Addr, &framed_ip_address, DescriptorFlags::empty(), Subtype::None, 0),
                attr(168, "Framed-IPv6-Address", SemanticType::Ipv6Addr, &framed_ip_address, DescriptorFlags::empty(), Subtype::None, 0),
            ],
        });

        containers.push(Container {
            owner: operator_name_tlv.clone(),
            children: vec![
                attr(1, "Operator-Name-Namespace", SemanticType::Uint8, &operator_name_tlv, DescriptorFlags::empty(), Subtype::None, 0),
                attr(2, "Operator-Name-Value", SemanticType::String, &operator_name_tlv, DescriptorFlags::empty(), Subtype::None, 0),
            ],
        });

        containers.push(Container {
            owner: connect_info_struct.clone(),
            children: vec![
                attr(1, "Connect-Info-Flags", SemanticType::Uint8, &connect_info_struct, DescriptorFlags::empty(), Subtype::None, 1),
                attr(2, "Connect-Info-Identifier", SemanticType::Uint16, &connect_info_struct, DescriptorFlags::empty(), Subtype::None, 2),
                attr(3, "Connect-Info-Extra", SemanticType::String, &connect_info_struct, DescriptorFlags::empty(), Subtype::None, 0),
            ],
        });

        containers.push(Container {
            owner: extended_one.clone(),
            children: vec![
                attr(1, "Original-Packet-Code", SemanticType::Uint8, &extended_one, DescriptorFlags::empty(), Subtype::None, 0),
                attr(2, "Extended-One-Text", SemanticType::String, &extended_one, DescriptorFlags::empty(), Subtype::None, 0),
            ],
        });

        containers.push(Container {
            owner: extended_two.clone(),
            children: vec![
                attr(1, "Extended-Two-Text", SemanticType::String, &extended_two, DescriptorFlags::empty(), Subtype::None, 0),
                attr(26, "Extended-Two-Vsa", SemanticType::Vsa, &extended_two, DescriptorFlags::empty(), Subtype::None, 0),
            ],
        });

        let cisco = Arc::new(VendorRecord::new(CISCO_PEN, "Cisco", 1, 1, false));
        containers.push(Container {
            owner: cisco.root(),
            children: vec![attr(1, "Cisco-AVPair", SemanticType::String, &cisco.root(), DescriptorFlags::empty(), Subtype::None, 0)],
        });

        let wimax = Arc::new(VendorRecord::new(WIMAX_PEN, "WiMAX Forum", 1, 1, true));
        containers.push(Container {
            owner: wimax.root(),
            children: vec![attr(
                1,
                "WiMAX-Capability",
                SemanticType::String,
                &wimax.root(),
                DescriptorFlags::empty(),
                Subtype::None,
                0,
            )],
        });

        Self {
            root,
            containers,
            vendors: vec![cisco, wimax],
        }
    }

    fn container_for(&self, parent: &Arc<Descriptor>) -> Option<&Container> {
        self.containers.iter().find(|c| Arc::ptr_eq(&c.owner, parent))
    }
}

impl Default for StaticDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary for StaticDictionary {
    fn root(&self) -> Arc<Descriptor> {
        self.root.clone()
    }

    fn child_by_num(&self, parent: &Arc<Descriptor>, number: u32) -> Option<Arc<Descriptor>> {
        self.container_for(parent)?.children.iter().find(|c| c.number() == number).cloned()
    }

    fn child_by_type(&self, parent: &Arc<Descriptor>, semantic_type: SemanticType) -> Option<Arc<Descriptor>> {
        self.container_for(parent)?.children.iter().find(|c| c.semantic_type() == semantic_type).cloned()
    }

    fn vendor_by_num(&self, pen: u32) -> Option<Arc<VendorRecord>> {
        self.vendors.iter().find(|v| v.pen() == pen).cloned()
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
