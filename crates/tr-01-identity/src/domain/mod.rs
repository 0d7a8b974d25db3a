//! # Domain Layer
//!
//! Key validation, signing and the strategy-selecting provider. No I/O.

pub mod errors;
pub mod keypair;
pub mod provider;
