//! A minimal allocation context for descriptors fabricated during a decode.
//!
//! Descriptors are reference-counted ([`Arc`]), so nothing actually requires an
//! arena for memory safety — any value-pair referencing a fabricated descriptor
//! keeps it alive on its own. `Arena` exists anyway because the data model
//! calls for a caller-owned allocation context that fabricated descriptors are
//! minted into and that is dropped alongside the packet/cursor/context bundle
//! for a single decode; it also gives a single place a future on-disk
//! dictionary loader could hook dictionary-lifetime bookkeeping into.
use std::cell::RefCell;
use std::sync::Arc;

use crate::dictionary::{Descriptor, VendorRecord};

/// Owns the "unknown" descriptors and vendor records minted while decoding one packet.
#[derive(Default)]
pub struct Arena {
    descriptors: RefCell<Vec<Arc<Descriptor>>>,
    vendors: RefCell<Vec<Arc<VendorRecord>>>,
}

impl Arena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a descriptor into this arena, returning a shared handle to it.
    pub fn alloc_descriptor(&self, descriptor: Descriptor) -> Arc<Descriptor> {
        let handle = Arc::new(descriptor);
        self.descriptors.borrow_mut().push(handle.clone());
        handle
    }

    /// Allocates a vendor record into this arena, returning a shared handle to it.
    pub fn alloc_vendor(&self, vendor: VendorRecord) -> Arc<VendorRecord> {
        let handle = Arc::new(vendor);
        self.vendors.borrow_mut().push(handle.clone());
        handle
    }

    /// The number of descriptors fabricated so far in this arena.
    pub fn descriptor_count(&self) -> usize {
        self.descriptors.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::SemanticType;

    #[test]
    fn alloc_descriptor_keeps_it_alive() {
        let arena = Arena::new();
        let descriptor = arena.alloc_descriptor(Descriptor::unknown(5, None));
        assert_eq!(descriptor.number(), 5);
        assert_eq!(descriptor.semantic_type(), SemanticType::Octets);
        assert_eq!(arena.descriptor_count(), 1);
    }
}
