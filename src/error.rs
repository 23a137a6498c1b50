//! Error types surfaced by the decoder.

use core::fmt;

/// An error produced while decoding a RADIUS attribute or one of its components.
///
/// Per the propagation policy described in the crate documentation, almost every
/// variant of this type is caught by [`decode_pair_value`](crate::decode_pair_value)
/// and translated into a `raw` reinterpretation rather than aborting the whole
/// packet. Only the header-level pre-checks in [`decode_pair`](crate::decode_pair)
/// let a `DecodeError` escape to the caller.
#[non_exhaustive]
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum DecodeError {
    /// Not enough bytes remained to read a required field.
    InsufficientData {
        /// Number of bytes required.
        needed: usize,
        /// Number of bytes actually available.
        available: usize,
    },

    /// A declared length exceeded the bytes remaining in the packet.
    Overflow {
        /// The length that was declared.
        declared: usize,
        /// The number of bytes actually remaining.
        remaining: usize,
    },

    /// A TLV, VSA, extended, or WiMAX container had a shape the decoder does not
    /// accept (bad schema, zero attribute number where forbidden, nonzero reserved
    /// byte, out-of-range prefix length, and so on).
    MalformedStructure(&'static str),

    /// Tunnel-Password's embedded length field exceeded the ciphertext length, or
    /// the zero-padding invariant (`tunnel_password_zeros`) was violated. Per RFC
    /// 2868 this usually indicates an incorrect shared secret.
    CryptographicMismatch(&'static str),

    /// An internal invariant was violated. These are reported, never panicked.
    Sanity(&'static str),

    /// Recursion depth exceeded the configured maximum.
    RecursionLimit,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData { needed, available } => write!(
                f,
                "insufficient data: needed {needed} bytes, {available} available"
            ),
            Self::Overflow { declared, remaining } => write!(
                f,
                "declared length {declared} exceeds {remaining} remaining bytes"
            ),
            Self::MalformedStructure(reason) => write!(f, "malformed structure: {reason}"),
            Self::CryptographicMismatch(reason) => {
                write!(f, "shared secret probably incorrect: {reason}")
            }
            Self::Sanity(reason) => write!(f, "internal invariant violated: {reason}"),
            Self::RecursionLimit => write!(f, "maximum container recursion depth exceeded"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// A `Result` specialized to [`DecodeError`].
pub type DecodeResult<T> = Result<T, DecodeError>;
