//! # Attestations
//!
//! Signed statements from an admin or validator node about its own writing
//! key and address.

use serde::{Deserialize, Serialize};

use crate::entities::Hash;
use crate::errors::MessageError;
use crate::hashing::blake3_hash;

/// The signed body of an attestation.
///
/// Field order is part of the canonical form and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationResponse {
    /// Writing key, hex.
    pub wk: String,
    /// Address of the attesting node.
    pub address: String,
    /// Nonce, hex.
    pub nonce: String,
    /// Channel the attestation was produced for.
    pub channel: String,
    /// Public key of the channel owner that requested the attestation, hex.
    pub issuer: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl AttestationResponse {
    /// Canonical serialisation the signature is computed over.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, MessageError> {
        serde_json::to_vec(self).map_err(|e| MessageError::Serialization(e.to_string()))
    }

    /// Hash of the canonical form.
    pub fn signing_hash(&self) -> Result<Hash, MessageError> {
        Ok(blake3_hash(&self.canonical_bytes()?))
    }
}

/// An attestation as received from a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub response: AttestationResponse,
    /// Signature over [`AttestationResponse::signing_hash`], hex.
    pub sig: String,
}
