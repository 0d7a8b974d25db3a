//! # Structural Schema
//!
//! Presence and shape checks run before any cryptographic work. Addresses are
//! only checked for presence here; decoding them is a later stage.

use shared_types::hashing::{decode_fixed, decode_hex};
use shared_types::{Attestation, MessageError, PreTransaction};
use thiserror::Error;

/// A structural defect in an inbound payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A required field is empty.
    #[error("Missing required field `{0}`")]
    Missing(&'static str),

    /// A field is present but malformed.
    #[error(transparent)]
    Malformed(#[from] MessageError),
}

fn require(field: &'static str, value: &str) -> Result<(), SchemaError> {
    if value.is_empty() {
        return Err(SchemaError::Missing(field));
    }
    Ok(())
}

/// Check a proposal's fields.
pub fn check_pre_transaction(pre: &PreTransaction) -> Result<(), SchemaError> {
    for (field, value) in [
        ("bs", &pre.bs),
        ("mbs", &pre.mbs),
        ("va", &pre.va),
        ("iw", &pre.iw),
        ("ia", &pre.ia),
        ("ch", &pre.ch),
        ("in", &pre.index),
        ("tx", &pre.tx),
        ("is", &pre.is),
    ] {
        require(field, value)?;
    }

    decode_hex("bs", &pre.bs)?;
    decode_hex("mbs", &pre.mbs)?;
    decode_hex("ch", &pre.ch)?;
    decode_hex("in", &pre.index)?;
    decode_fixed::<32>("iw", &pre.iw)?;
    decode_fixed::<32>("tx", &pre.tx)?;
    decode_fixed::<64>("is", &pre.is)?;
    Ok(())
}

/// Check that every attestation field is present and well formed.
pub fn check_attestation(attestation: &Attestation) -> Result<(), SchemaError> {
    let response = &attestation.response;
    for (field, value) in [
        ("wk", &response.wk),
        ("address", &response.address),
        ("nonce", &response.nonce),
        ("channel", &response.channel),
        ("issuer", &response.issuer),
        ("sig", &attestation.sig),
    ] {
        require(field, value)?;
    }
    if response.timestamp == 0 {
        return Err(SchemaError::Missing("timestamp"));
    }

    decode_fixed::<32>("wk", &response.wk)?;
    decode_hex("nonce", &response.nonce)?;
    decode_fixed::<64>("sig", &attestation.sig)?;
    Ok(())
}
