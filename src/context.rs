//! The per-packet decoding context: shared secret, request authenticator, and flags.

use getset::{CopyGetters, Getters};

/// Immutable state shared by every decode call within a single packet.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct PacketContext {
    /// The shared secret used to unwrap obfuscated attributes.
    #[getset(get = "pub")]
    secret: Vec<u8>,

    /// The request authenticator vector (16 bytes).
    #[getset(get_copy = "pub")]
    vector: [u8; 16],

    /// Whether bytes past a Tunnel-Password's embedded length must be zero.
    #[getset(get_copy = "pub")]
    tunnel_password_zeros: bool,
}

impl PacketContext {
    /// Bundles together the state needed to decode attributes from one packet.
    pub fn new(secret: impl Into<Vec<u8>>, vector: [u8; 16], tunnel_password_zeros: bool) -> Self {
        Self {
            secret: secret.into(),
            vector,
            tunnel_password_zeros,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stores_fields_verbatim() {
        let ctx = PacketContext::new("testing123", [0; 16], true);
        assert_eq!(ctx.secret(), b"testing123");
        assert_eq!(ctx.vector(), [0; 16]);
        assert!(ctx.tunnel_password_zeros());
    }
}
