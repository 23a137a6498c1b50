//! The three MD5-keystream obfuscation schemes used by RADIUS to mask
//! sensitive attribute values. None of these are cryptographic confidentiality
//! in the modern sense — they're XOR masking with an MD5-derived pseudo-pad,
//! the same shape as the TACACS+ body obfuscation this crate's wire-parsing
//! style is modeled on, just applied per-attribute instead of per-packet.

use md5::{Digest, Md5};

use crate::error::DecodeError;

/// MD5 digest size in bytes, and so the obfuscation block size for all three schemes.
const MD5_OUTPUT_SIZE: usize = 16;

/// Maximum User-Password ciphertext length; longer input is silently truncated.
const USER_PASSWORD_MAX_LEN: usize = 128;

/// Unwraps an RFC 2865 §5.2 User-Password value.
///
/// Returns plaintext of the same length as the (possibly truncated)
/// ciphertext; trailing-NUL trimming is the dispatcher's responsibility (see
/// the crate's value-dispatch documentation), since whether to trim depends
/// on whether the descriptor pins a fixed width.
pub fn decode_user_password(ciphertext: &[u8], secret: &[u8], vector: &[u8; 16]) -> Result<Vec<u8>, DecodeError> {
    if ciphertext.is_empty() || ciphertext.len() % MD5_OUTPUT_SIZE != 0 {
        return Err(DecodeError::MalformedStructure(
            "User-Password ciphertext must be a nonzero multiple of 16 bytes",
        ));
    }

    let ciphertext = &ciphertext[..ciphertext.len().min(USER_PASSWORD_MAX_LEN)];

    let mut plaintext = Vec::with_capacity(ciphertext.len());
    let mut prior_block: &[u8] = vector;

    for block in ciphertext.chunks(MD5_OUTPUT_SIZE) {
        let mut hasher = Md5::new();
        hasher.update(secret);
        hasher.update(prior_block);
        let pad = hasher.finalize();

        for (c, p) in block.iter().zip(pad.iter()) {
            plaintext.push(c ^ p);
        }

        prior_block = block;
    }

    Ok(plaintext)
}

/// Unwraps an RFC 2868 §3.5 Tunnel-Password value.
///
/// `ciphertext` is the attribute body: `salt(2) || data_len(1) || ciphertext ||
/// optional padding`. Returns the embedded-length prefix of the plaintext.
pub fn decode_tunnel_password(
    ciphertext: &[u8],
    secret: &[u8],
    vector: &[u8; 16],
    tunnel_password_zeros: bool,
) -> Result<Vec<u8>, DecodeError> {
    if ciphertext.len() < 2 {
        return Err(DecodeError::InsufficientData {
            needed: 2,
            available: ciphertext.len(),
        });
    }

    if ciphertext.len() <= 3 {
        // salt (and maybe a data_len byte) with no room for any ciphertext at all.
        return Ok(Vec::new());
    }

    let salt = &ciphertext[..2];
    let encrypted = &ciphertext[2..];

    let mut prefix_hasher = Md5::new();
    prefix_hasher.update(secret);

    let mut plaintext = Vec::with_capacity(encrypted.len());
    let mut prior_ciphertext_block: &[u8] = &[];

    for (i, block) in encrypted.chunks(MD5_OUTPUT_SIZE).enumerate() {
        let mut hasher = prefix_hasher.clone();
        if i == 0 {
            hasher.update(vector);
            hasher.update(salt);
        } else {
            hasher.update(prior_ciphertext_block);
        }
        let pad = hasher.finalize();

        for (c, p) in block.iter().zip(pad.iter()) {
            plaintext.push(c ^ p);
        }

        prior_ciphertext_block = block;
    }

    let embedded_len = plaintext[0] as usize;
    let available = plaintext.len() - 1;

    if embedded_len > available {
        return Err(DecodeError::CryptographicMismatch(
            "Tunnel-Password embedded length exceeds ciphertext length",
        ));
    }

    if tunnel_password_zeros {
        if plaintext[1 + embedded_len..].iter().any(|&b| b != 0) {
            return Err(DecodeError::CryptographicMismatch(
                "Tunnel-Password padding past embedded length was not all zero",
            ));
        }
    }

    Ok(plaintext[1..1 + embedded_len].to_vec())
}

/// Unwraps Ascend's single-block MD5 obfuscation (Ascend-Send-Secret / Ascend-Receive-Secret).
pub fn decode_ascend_secret(ciphertext: &[u8], secret: &[u8], vector: &[u8; 16]) -> Result<Vec<u8>, DecodeError> {
    if ciphertext.is_empty() || ciphertext.len() > MD5_OUTPUT_SIZE {
        return Err(DecodeError::MalformedStructure(
            "Ascend-Secret payload must be 1..=16 bytes",
        ));
    }

    let mut hasher = Md5::new();
    hasher.update(vector);
    hasher.update(secret);
    let pad = hasher.finalize();

    let mut plaintext: Vec<u8> = ciphertext.iter().zip(pad.iter()).map(|(c, p)| c ^ p).collect();
    while plaintext.last() == Some(&0) {
        plaintext.pop();
    }

    Ok(plaintext)
}
