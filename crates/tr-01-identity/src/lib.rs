//! # Identity Subsystem (TR-01)
//!
//! Signing and verification facade over the node's key material.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Ed25519 key handling and the provider
//! - **Ports Layer** (`ports/`): The `Wallet` trait an external wallet implements
//!
//! ## Strategies
//!
//! Exactly one strategy is active at a time:
//! - **Wallet**: every operation is delegated to an external wallet
//! - **Network key pair**: raw Ed25519 keys held by the node, validated at
//!   construction
//!
//! The strategy is chosen at construction and only replaced through
//! `set_strategy` / `with_strategy`. There is no global identity.

pub mod domain;
pub mod ports;

pub use domain::errors::IdentityError;
pub use domain::keypair::{decode_public_key, verify_signature, NetworkKeypairIdentity};
pub use domain::provider::{IdentityProvider, IdentityStrategy, StrategyKind};
pub use ports::outbound::Wallet;
