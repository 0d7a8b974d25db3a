//! # Outbound Ports
//!
//! The connection manager that owns validator sessions and their sent
//! counters.

use async_trait::async_trait;
use shared_types::{NetworkMessage, ValidatorId};

use crate::domain::errors::PoolError;

/// Pool of connected validators.
///
/// Entries may disappear between selection and use; every operation on an
/// unknown id must be harmless.
#[async_trait]
pub trait ValidatorPool: Send + Sync {
    /// A uniformly random connected validator, if any.
    fn pick_random_connected_validator(&self) -> Option<ValidatorId>;

    /// Send `message` to `validator` without waiting for a reply.
    async fn send_single_message(
        &self,
        message: &NetworkMessage,
        validator: &ValidatorId,
    ) -> Result<(), PoolError>;

    /// Record one confirmed delivery. No-op for unknown ids.
    fn increment_sent_count(&self, validator: &ValidatorId);

    /// Confirmed deliveries so far; `0` for unknown ids.
    fn get_sent_count(&self, validator: &ValidatorId) -> u64;

    /// Drop `validator` from the pool. Returns `false` if it was not present.
    fn remove(&self, validator: &ValidatorId) -> bool;
}
