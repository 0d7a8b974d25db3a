//! # Inbound Ports
//!
//! API the router drives.

use async_trait::async_trait;

/// Boolean accept/reject decision over one message type.
///
/// Implementations report every rejection to their observer before returning
/// `false`.
#[async_trait]
pub trait MessageValidator<M: Sync>: Send + Sync {
    async fn validate(&self, message: &M) -> bool;
}
