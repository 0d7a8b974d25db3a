//! # Outbound Ports
//!
//! Dependencies this subsystem needs from the outside.

use shared_types::{Address, PublicKeyBytes, SignatureBytes};

/// An externally managed wallet.
///
/// Key derivation and storage are the wallet's concern; the identity
/// provider only forwards calls.
pub trait Wallet: Send + Sync {
    /// Public key of the wallet's active account.
    fn public_key(&self) -> PublicKeyBytes;

    /// Checksum address of the wallet's active account.
    fn address(&self) -> Address;

    /// Sign `message` with the active account.
    fn sign(&self, message: &[u8]) -> SignatureBytes;

    /// Verify `signature` over `message` under `public_key`.
    fn verify(&self, signature: &[u8], message: &[u8], public_key: &PublicKeyBytes) -> bool;
}
