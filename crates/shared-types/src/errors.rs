//! # Error Types
//!
//! Defines error types used across crates.

use thiserror::Error;

/// Errors produced when parsing or deriving a checksum address.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Address string has the wrong length.
    #[error("Invalid address length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Address does not start with the network prefix.
    #[error("Invalid address prefix: expected \"{expected}\"")]
    InvalidPrefix { expected: &'static str },

    /// Address body is not lowercase hex.
    #[error("Invalid address encoding")]
    InvalidEncoding,

    /// Embedded checksum does not match the public key.
    #[error("Address checksum mismatch")]
    ChecksumMismatch,
}

/// Errors raised by the external state store.
#[derive(Debug, Clone, Error)]
pub enum StateError {
    /// The backing store could not be read.
    #[error("State store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded.
    #[error("Corrupted state record: {0}")]
    Corrupted(String),
}

/// Errors raised while interpreting a message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessageError {
    /// A hex field could not be decoded.
    #[error("Field `{field}` is not valid hex")]
    InvalidHex { field: &'static str },

    /// A fixed-width field has the wrong length.
    #[error("Field `{field}` has length {actual}, expected {expected}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Operation type and payload object disagree.
    #[error("Operation type {op_type} expects payload `{expected}`, found `{found}`")]
    PayloadMismatch {
        op_type: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Canonical serialisation failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}
