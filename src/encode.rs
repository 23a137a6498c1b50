//! Minimal wire-byte construction for tests.
//!
//! This is deliberately not a general-purpose encoder: it exists to build the
//! literal byte sequences the decoder's round-trip and obfuscation-idempotence
//! tests need, not to mirror every fallback path the decoder accepts on the
//! way in. Real encoding (if this crate ever grows one) would live alongside
//! a `Dictionary`-driven descriptor resolution step this module skips.

use md5::{Digest, Md5};

use crate::error::{DecodeError, DecodeResult};

const MD5_OUTPUT_SIZE: usize = 16;

/// Encodes a flat top-level attribute: `type(1) || length(1) || value`.
pub fn encode_pair(number: u8, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + value.len());
    out.push(number);
    out.push((value.len() + 2) as u8);
    out.extend_from_slice(value);
    out
}

/// Encodes a 1-byte-type/1-byte-length TLV child record.
pub fn encode_tlv_child(number: u8, value: &[u8]) -> Vec<u8> {
    encode_pair(number, value)
}

/// Encodes a Vendor-Specific Attribute body (PEN plus a run of TLV(1,1)
/// children) ready to be wrapped in [`encode_pair`] under attribute 26.
pub fn encode_vsa(pen: u32, children: &[(u8, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&pen.to_be_bytes());
    for (number, value) in children {
        out.extend_from_slice(&encode_tlv_child(*number, value));
    }
    out
}

/// Encodes an RFC 2865 §5.2 User-Password ciphertext.
pub fn encode_user_password(plaintext: &[u8], secret: &[u8], vector: &[u8; 16]) -> Vec<u8> {
    let mut padded = plaintext.to_vec();
    while padded.len() % MD5_OUTPUT_SIZE != 0 {
        padded.push(0);
    }

    let mut ciphertext = Vec::with_capacity(padded.len());
    let mut prior_block = vector.to_vec();

    for block in padded.chunks(MD5_OUTPUT_SIZE) {
        let mut hasher = Md5::new();
        hasher.update(secret);
        hasher.update(&prior_block);
        let pad = hasher.finalize();

        let cipher_block: Vec<u8> = block.iter().zip(pad.iter()).map(|(c, p)| c ^ p).collect();
        ciphertext.extend_from_slice(&cipher_block);
        prior_block = cipher_block;
    }

    ciphertext
}

/// Encodes an RFC 2868 §3.5 Tunnel-Password body:
/// `salt(2) || data_len(1) || ciphertext`.
pub fn encode_tunnel_password(plaintext: &[u8], salt: [u8; 2], secret: &[u8], vector: &[u8; 16]) -> Vec<u8> {
    let mut padded = Vec::with_capacity(1 + plaintext.len());
    padded.push(plaintext.len() as u8);
    padded.extend_from_slice(plaintext);
    while padded.len() % MD5_OUTPUT_SIZE != 0 {
        padded.push(0);
    }

    let mut ciphertext = Vec::with_capacity(padded.len());
    let mut prior_ciphertext_block: Vec<u8> = Vec::new();

    for (i, block) in padded.chunks(MD5_OUTPUT_SIZE).enumerate() {
        let mut hasher = Md5::new();
        hasher.update(secret);
        if i == 0 {
            hasher.update(vector);
            hasher.update(salt);
        } else {
            hasher.update(&prior_ciphertext_block);
        }
        let pad = hasher.finalize();

        let cipher_block: Vec<u8> = block.iter().zip(pad.iter()).map(|(p, k)| p ^ k).collect();
        ciphertext.extend_from_slice(&cipher_block);
        prior_ciphertext_block = cipher_block;
    }

    let mut body = Vec::with_capacity(2 + ciphertext.len());
    body.extend_from_slice(&salt);
    body.extend_from_slice(&ciphertext);
    body
}

/// Encodes an Ascend-Secret single-block payload.
pub fn encode_ascend_secret(plaintext: &[u8], secret: &[u8], vector: &[u8; 16]) -> DecodeResult<Vec<u8>> {
    if plaintext.len() > MD5_OUTPUT_SIZE {
        return Err(DecodeError::Overflow {
            declared: plaintext.len(),
            remaining: MD5_OUTPUT_SIZE,
        });
    }

    let mut hasher = Md5::new();
    hasher.update(vector);
    hasher.update(secret);
    let pad = hasher.finalize();

    let mut ciphertext = vec![0u8; MD5_OUTPUT_SIZE];
    for (i, b) in ciphertext.iter_mut().enumerate() {
        let plain_byte = plaintext.get(i).copied().unwrap_or(0);
        *b = plain_byte ^ pad[i];
    }
    Ok(ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_pair_computes_declared_length() {
        let bytes = encode_pair(1, b"bobby");
        assert_eq!(bytes, vec![1, 7, b'b', b'o', b'b', b'b', b'y']);
    }

    #[test]
    fn encode_vsa_lays_out_pen_and_children() {
        let bytes = encode_vsa(9, &[(1, b"shell:priv-lvl=15")]);
        assert_eq!(&bytes[..4], &[0, 0, 0, 9]);
        assert_eq!(bytes[4], 1);
        assert_eq!(bytes[5] as usize, 2 + "shell:priv-lvl=15".len());
    }
}
