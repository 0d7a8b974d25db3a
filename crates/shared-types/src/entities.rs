//! # Core Domain Entities
//!
//! Primitive aliases and the directory records the validators read from the
//! external state store.

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// A 32-byte BLAKE3 hash.
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type SignatureBytes = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKeyBytes = [u8; 32];

/// A 32-byte writing key authorizing a node to append under its address.
pub type WritingKey = [u8; 32];

/// Identifier of a validator peer (its public key).
pub type ValidatorId = PublicKeyBytes;

/// Identifier of a connected peer (its public key).
pub type PeerId = PublicKeyBytes;

/// Registered admin of the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminEntry {
    /// Admin checksum address.
    pub address: Address,
    /// Admin writing key.
    pub wk: WritingKey,
}

/// Directory entry for a node, keyed by its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    /// Node checksum address.
    pub address: Address,
    /// Writing key the node registered.
    pub wk: WritingKey,
    /// Whether the node may append entries.
    pub is_writer: bool,
    /// Whether the node is currently an indexer.
    pub is_indexer: bool,
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
