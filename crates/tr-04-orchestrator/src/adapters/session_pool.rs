//! # Session Pool
//!
//! [`ValidatorPool`] over live protocol sessions, one per validator.
//! Removing a validator closes its session exactly once.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::seq::IteratorRandom;
use shared_types::{NetworkMessage, ValidatorId};
use tr_03_protocol::ProtocolSession;
use tracing::{debug, info};

use crate::domain::errors::PoolError;
use crate::ports::outbound::ValidatorPool;

struct PoolEntry {
    session: ProtocolSession,
    sent_count: u64,
}

/// Connected validators and their sessions.
#[derive(Default)]
pub struct SessionPool {
    entries: RwLock<HashMap<ValidatorId, PoolEntry>>,
}

impl SessionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session` for `validator`. A previous session for the same
    /// validator is closed and its sent count reset.
    pub fn add(&self, validator: ValidatorId, session: ProtocolSession) {
        let previous = self.entries.write().insert(
            validator,
            PoolEntry {
                session,
                sent_count: 0,
            },
        );
        if let Some(previous) = previous {
            previous.session.close();
            debug!(validator = %hex::encode(&validator[..4]), "[tr-04] Replaced validator session");
        } else {
            info!(validator = %hex::encode(&validator[..4]), "[tr-04] Validator joined pool");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn contains(&self, validator: &ValidatorId) -> bool {
        self.entries.read().contains_key(validator)
    }

    pub fn validators(&self) -> Vec<ValidatorId> {
        self.entries.read().keys().copied().collect()
    }

    /// Drop validators whose session closed underneath the pool, for example
    /// after the connection was destroyed. Returns how many were dropped.
    pub fn prune_closed(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|validator, entry| {
            let live = !entry.session.is_closed();
            if !live {
                debug!(validator = %hex::encode(&validator[..4]), "[tr-04] Dropping closed session");
            }
            live
        });
        before - entries.len()
    }

    /// Close every session and empty the pool.
    pub fn clear(&self) {
        let drained: Vec<PoolEntry> = self.entries.write().drain().map(|(_, e)| e).collect();
        for entry in drained {
            entry.session.close();
        }
    }
}

#[async_trait]
impl ValidatorPool for SessionPool {
    fn pick_random_connected_validator(&self) -> Option<ValidatorId> {
        self.prune_closed();
        self.entries
            .read()
            .keys()
            .copied()
            .choose(&mut rand::thread_rng())
    }

    async fn send_single_message(
        &self,
        message: &NetworkMessage,
        validator: &ValidatorId,
    ) -> Result<(), PoolError> {
        let session = self
            .entries
            .read()
            .get(validator)
            .map(|entry| entry.session.clone())
            .ok_or_else(|| PoolError::UnknownValidator(hex::encode(validator)))?;

        session.send_and_forget(message.clone()).await?;
        Ok(())
    }

    fn increment_sent_count(&self, validator: &ValidatorId) {
        if let Some(entry) = self.entries.write().get_mut(validator) {
            entry.sent_count += 1;
        }
    }

    fn get_sent_count(&self, validator: &ValidatorId) -> u64 {
        self.entries
            .read()
            .get(validator)
            .map_or(0, |entry| entry.sent_count)
    }

    fn remove(&self, validator: &ValidatorId) -> bool {
        let Some(entry) = self.entries.write().remove(validator) else {
            return false;
        };
        entry.session.close();
        info!(validator = %hex::encode(&validator[..4]), "[tr-04] Validator removed from pool");
        true
    }
}
