//! # Checksum Addresses
//!
//! Addresses are the network prefix followed by lowercase hex of
//! `public_key || checksum`, where the checksum is the first four bytes of
//! `sha256(sha256(prefix || public_key))`.
//!
//! Every address is exactly [`ADDRESS_SIZE`] ASCII bytes, which is the slot
//! width used by the indexer entry codec.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::entities::PublicKeyBytes;
use crate::errors::AddressError;

/// Human-readable network prefix.
pub const ADDRESS_PREFIX: &str = "trac";

const PUBLIC_KEY_LEN: usize = 32;
const CHECKSUM_LEN: usize = 4;

/// Encoded address length in bytes.
pub const ADDRESS_SIZE: usize = ADDRESS_PREFIX.len() + 2 * (PUBLIC_KEY_LEN + CHECKSUM_LEN);

/// A validated checksum address.
///
/// Construction always verifies prefix, encoding and checksum, so the embedded
/// public key can be read back without failure.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    encoded: String,
    public_key: PublicKeyBytes,
}

impl Address {
    /// Derive the address for a public key.
    pub fn from_public_key(public_key: &PublicKeyBytes) -> Self {
        let mut body = Vec::with_capacity(PUBLIC_KEY_LEN + CHECKSUM_LEN);
        body.extend_from_slice(public_key);
        body.extend_from_slice(&checksum(public_key));

        Self {
            encoded: format!("{ADDRESS_PREFIX}{}", hex::encode(body)),
            public_key: *public_key,
        }
    }

    /// Parse and validate an encoded address.
    pub fn parse(encoded: &str) -> Result<Self, AddressError> {
        let public_key = decode_public_key(encoded)?;
        Ok(Self {
            encoded: encoded.to_owned(),
            public_key,
        })
    }

    /// The public key embedded in this address.
    pub fn public_key(&self) -> &PublicKeyBytes {
        &self.public_key
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// The address as a fixed-width slot of [`ADDRESS_SIZE`] bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.encoded.as_bytes()
    }
}

/// Decode the public key embedded in an encoded address.
pub fn decode_public_key(encoded: &str) -> Result<PublicKeyBytes, AddressError> {
    if encoded.len() != ADDRESS_SIZE {
        return Err(AddressError::InvalidLength {
            expected: ADDRESS_SIZE,
            actual: encoded.len(),
        });
    }

    let body = encoded
        .strip_prefix(ADDRESS_PREFIX)
        .ok_or(AddressError::InvalidPrefix {
            expected: ADDRESS_PREFIX,
        })?;

    // Uppercase hex would produce a second spelling of the same key.
    if body.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(AddressError::InvalidEncoding);
    }

    let raw = hex::decode(body).map_err(|_| AddressError::InvalidEncoding)?;
    let (key, sum) = raw.split_at(PUBLIC_KEY_LEN);

    let mut public_key = [0u8; PUBLIC_KEY_LEN];
    public_key.copy_from_slice(key);

    if checksum(&public_key) != sum {
        return Err(AddressError::ChecksumMismatch);
    }

    Ok(public_key)
}

fn checksum(public_key: &PublicKeyBytes) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(ADDRESS_PREFIX.as_bytes());
    hasher.update(public_key);
    let first = hasher.finalize();
    let second = Sha256::digest(first);

    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&second[..CHECKSUM_LEN]);
    out
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let public_key = decode_public_key(&value)?;
        Ok(Self {
            encoded: value,
            public_key,
        })
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.encoded
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encoded)
    }
}
