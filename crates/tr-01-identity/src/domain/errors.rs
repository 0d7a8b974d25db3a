//! # Identity Errors
//!
//! Construction failures for identity strategies. Signing and verification
//! never fail with an error; verification reports `false`.

use shared_types::AddressError;
use thiserror::Error;

/// Errors raised while building an identity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// A required key was not supplied.
    #[error("Missing {0}")]
    MissingKey(&'static str),

    /// Public key buffer has the wrong shape.
    #[error("Invalid public key length: expected {expected}, got {actual}")]
    InvalidPublicKey { expected: usize, actual: usize },

    /// Secret key buffer has the wrong shape.
    #[error("Invalid secret key length: expected {expected}, got {actual}")]
    InvalidSecretKey { expected: usize, actual: usize },

    /// Secret key does not belong to the supplied public key.
    #[error("Secret key does not match public key")]
    KeyMismatch,

    /// Address could not be derived from the public key.
    #[error("Address derivation failed: {0}")]
    AddressDerivation(String),

    /// Address does not decode to a usable public key.
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// Bytes embedded in an address are not a valid Ed25519 point.
    #[error("Address does not embed a valid public key")]
    InvalidCurvePoint,
}
