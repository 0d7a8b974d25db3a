//! # Message Orchestrator
//!
//! Best-effort reliable delivery of an operation to the validator pool.
//!
//! Confirmation is observed through the state store (the transaction hash
//! appears), never through a protocol reply. Unresponsive validators are
//! evicted; validators that confirmed `max_sent_count` times are rotated out
//! to spread load.

use std::sync::Arc;

use shared_types::{Hash, NetworkMessage, OperationMessage, StateStore, ValidatorId};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::domain::config::OrchestratorConfig;
use crate::domain::errors::PoolError;
use crate::ports::outbound::ValidatorPool;

/// Reliable-broadcast coordinator.
///
/// Concurrent `send` calls share the pool but keep their own deadlines.
pub struct MessageOrchestrator {
    pool: Arc<dyn ValidatorPool>,
    state: Arc<dyn StateStore>,
    config: OrchestratorConfig,
}

/// Outcome of the attempts against one validator.
enum Delivery {
    Confirmed,
    Exhausted,
    /// The validator left the pool mid-delivery.
    Gone,
}

impl MessageOrchestrator {
    pub fn new(
        pool: Arc<dyn ValidatorPool>,
        state: Arc<dyn StateStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            pool,
            state,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Deliver `message` and report whether it was observed in state before
    /// the response timeout.
    pub async fn send(&self, message: &OperationMessage) -> bool {
        let tx_hash = match message.tx_hash() {
            Ok(hash) => hash,
            Err(e) => {
                warn!(error = %e, "[tr-04] Operation has no usable transaction hash");
                return false;
            }
        };
        let envelope = NetworkMessage::Operation(message.clone());
        let started = Instant::now();

        while started.elapsed() < self.config.response_timeout() {
            let Some(validator) = self.pool.pick_random_connected_validator() else {
                warn!(tx = %hex::encode(tx_hash), "[tr-04] No validators connected");
                return false;
            };

            match self.deliver(&envelope, &tx_hash, &validator).await {
                Delivery::Confirmed => {
                    self.record_confirmation(&validator);
                    info!(
                        tx = %hex::encode(tx_hash),
                        validator = %short(&validator),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "[tr-04] Operation confirmed"
                    );
                    return true;
                }
                Delivery::Exhausted => {
                    warn!(
                        validator = %short(&validator),
                        retries = self.config.max_retries,
                        "[tr-04] Validator unresponsive, evicting"
                    );
                    self.pool.remove(&validator);
                }
                Delivery::Gone => {
                    debug!(validator = %short(&validator), "[tr-04] Validator left the pool");
                }
            }
        }

        warn!(
            tx = %hex::encode(tx_hash),
            timeout_ms = self.config.response_timeout_ms,
            "[tr-04] Operation not confirmed before deadline"
        );
        false
    }

    /// Up to `max_retries` send-and-poll attempts against one validator.
    async fn deliver(
        &self,
        envelope: &NetworkMessage,
        tx_hash: &Hash,
        validator: &ValidatorId,
    ) -> Delivery {
        for attempt in 1..=self.config.max_retries {
            match self.pool.send_single_message(envelope, validator).await {
                Ok(()) => {}
                Err(PoolError::UnknownValidator(_)) => return Delivery::Gone,
                Err(e) => {
                    warn!(
                        validator = %short(validator),
                        attempt,
                        error = %e,
                        "[tr-04] Send failed"
                    );
                    continue;
                }
            }

            if self.await_confirmation(tx_hash).await {
                return Delivery::Confirmed;
            }
            debug!(validator = %short(validator), attempt, "[tr-04] Attempt timed out");
        }
        Delivery::Exhausted
    }

    /// Poll state for `tx_hash` until it appears or the attempt times out.
    async fn await_confirmation(&self, tx_hash: &Hash) -> bool {
        let deadline = Instant::now() + self.config.attempt_timeout();
        loop {
            match self.state.get(tx_hash).await {
                Ok(Some(_)) => return true,
                Ok(None) => {}
                Err(e) => warn!(error = %e, "[tr-04] State poll failed"),
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            sleep(self.config.poll_interval().min(deadline - now)).await;
        }
    }

    fn record_confirmation(&self, validator: &ValidatorId) {
        self.pool.increment_sent_count(validator);
        let sent = self.pool.get_sent_count(validator);
        if sent >= self.config.max_sent_count {
            info!(
                validator = %short(validator),
                sent,
                "[tr-04] Validator reached sent threshold, rotating out"
            );
            self.pool.remove(validator);
        }
    }
}

fn short(validator: &ValidatorId) -> String {
    hex::encode(&validator[..4])
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared_types::{InMemoryStateStore, KeyOperation, OperationPayload, OperationType};
    use std::collections::HashMap;
    use std::time::Duration;

    /// Deterministic pool: picks the lowest id, counts sends, and can confirm
    /// the operation in state when a chosen validator receives it.
    #[derive(Default)]
    struct MockPool {
        validators: Mutex<HashMap<ValidatorId, u64>>,
        sends: Mutex<Vec<ValidatorId>>,
        removed: Mutex<Vec<ValidatorId>>,
        confirm_via: Mutex<Option<(ValidatorId, Arc<InMemoryStateStore>, Hash)>>,
    }

    impl MockPool {
        fn with(ids: &[u8]) -> Arc<Self> {
            let pool = Self::default();
            for id in ids {
                pool.validators.lock().insert([*id; 32], 0);
            }
            Arc::new(pool)
        }
    }

    #[async_trait]
    impl ValidatorPool for MockPool {
        fn pick_random_connected_validator(&self) -> Option<ValidatorId> {
            self.validators.lock().keys().min().copied()
        }

        async fn send_single_message(
            &self,
            _message: &NetworkMessage,
            validator: &ValidatorId,
        ) -> Result<(), PoolError> {
            if !self.validators.lock().contains_key(validator) {
                return Err(PoolError::UnknownValidator(short(validator)));
            }
            self.sends.lock().push(*validator);
            if let Some((target, state, hash)) = self.confirm_via.lock().as_ref() {
                if target == validator {
                    state.put(hash, b"confirmed");
                }
            }
            Ok(())
        }

        fn increment_sent_count(&self, validator: &ValidatorId) {
            if let Some(count) = self.validators.lock().get_mut(validator) {
                *count += 1;
            }
        }

        fn get_sent_count(&self, validator: &ValidatorId) -> u64 {
            self.validators.lock().get(validator).copied().unwrap_or(0)
        }

        fn remove(&self, validator: &ValidatorId) -> bool {
            self.removed.lock().push(*validator);
            self.validators.lock().remove(validator).is_some()
        }
    }

    fn operation(tx: Hash) -> OperationMessage {
        OperationMessage {
            op_type: OperationType::AddWriter,
            address: "writer".into(),
            payload: OperationPayload::Key(KeyOperation {
                tx: hex::encode(tx),
                wk: "11".repeat(32),
                index: "22".repeat(32),
                is: "33".repeat(64),
            }),
        }
    }

    fn config() -> OrchestratorConfig {
        OrchestratorConfig {
            response_timeout_ms: 5_000,
            max_retries: 3,
            attempt_timeout_ms: 1_000,
            poll_interval_ms: 200,
            max_sent_count: 2,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_validators_returns_immediately() {
        let pool = MockPool::with(&[]);
        let orchestrator =
            MessageOrchestrator::new(pool, Arc::new(InMemoryStateStore::new()), config());

        let started = Instant::now();
        assert!(!orchestrator.send(&operation([1; 32])).await);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_counts_delivery() {
        let pool = MockPool::with(&[1, 2]);
        let state = Arc::new(InMemoryStateStore::new());
        *pool.confirm_via.lock() = Some(([1; 32], state.clone(), [9; 32]));
        let orchestrator = MessageOrchestrator::new(pool.clone(), state, config());

        assert!(orchestrator.send(&operation([9; 32])).await);
        assert_eq!(pool.get_sent_count(&[1; 32]), 1);
        assert!(pool.removed.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_rotates_validator_out() {
        let pool = MockPool::with(&[1, 2]);
        let state = Arc::new(InMemoryStateStore::new());
        *pool.confirm_via.lock() = Some(([1; 32], state.clone(), [9; 32]));
        let orchestrator = MessageOrchestrator::new(pool.clone(), state, config());

        assert!(orchestrator.send(&operation([9; 32])).await);
        assert!(orchestrator.send(&operation([9; 32])).await);
        assert_eq!(*pool.removed.lock(), vec![[1u8; 32]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresponsive_validator_evicted_then_next_tried() {
        let pool = MockPool::with(&[1, 2]);
        let state = Arc::new(InMemoryStateStore::new());
        *pool.confirm_via.lock() = Some(([2; 32], state.clone(), [9; 32]));
        let orchestrator = MessageOrchestrator::new(pool.clone(), state, config());

        let started = Instant::now();
        assert!(orchestrator.send(&operation([9; 32])).await);

        let sends = pool.sends.lock().clone();
        assert_eq!(sends, vec![[1; 32], [1; 32], [1; 32], [2; 32]]);
        assert_eq!(*pool.removed.lock(), vec![[1u8; 32]]);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_millis(3_500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_stops_rotation() {
        let pool = MockPool::with(&[1, 2, 3]);
        let orchestrator =
            MessageOrchestrator::new(pool.clone(), Arc::new(InMemoryStateStore::new()), config());

        assert!(!orchestrator.send(&operation([9; 32])).await);
        // Two validators fit into 5s at 3s each; the third is never tried.
        assert_eq!(*pool.removed.lock(), vec![[1u8; 32], [2u8; 32]]);
        assert_eq!(pool.validators.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mismatched_payload_not_sent() {
        let pool = MockPool::with(&[1]);
        let orchestrator =
            MessageOrchestrator::new(pool.clone(), Arc::new(InMemoryStateStore::new()), config());
        let mut message = operation([9; 32]);
        message.op_type = OperationType::Transfer;

        assert!(!orchestrator.send(&message).await);
        assert!(pool.sends.lock().is_empty());
    }
}
