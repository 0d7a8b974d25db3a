//! # Deterministic Hashing
//!
//! BLAKE3 helpers shared by senders and validators. Field lists are hashed
//! with a little-endian `u32` length prefix per field so that adjacent
//! variable-length fields cannot be re-split into a colliding input.

use crate::entities::Hash;
use crate::errors::MessageError;

/// BLAKE3-256 of a byte string.
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// BLAKE3-256 over length-prefixed fields.
pub fn hash_fields(fields: &[&[u8]]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for field in fields {
        hasher.update(&(field.len() as u32).to_le_bytes());
        hasher.update(field);
    }
    *hasher.finalize().as_bytes()
}

/// Decode a hex field of any length.
pub fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, MessageError> {
    hex::decode(value).map_err(|_| MessageError::InvalidHex { field })
}

/// Decode a hex field that must be exactly `N` bytes.
pub fn decode_fixed<const N: usize>(
    field: &'static str,
    value: &str,
) -> Result<[u8; N], MessageError> {
    let bytes = decode_hex(field, value)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| MessageError::InvalidLength {
            field,
            expected: N,
            actual: bytes.len(),
        })
}
