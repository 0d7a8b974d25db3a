//! # State Applier
//!
//! Development stand-in for the external ledger: drains accepted items and
//! records transaction hashes in an [`InMemoryStateStore`], which is what the
//! orchestrator polls for confirmation.

use std::sync::Arc;

use shared_types::InMemoryStateStore;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::router::Accepted;

/// Value stored under an applied transaction hash.
pub const APPLIED_MARKER: &[u8] = b"applied";

pub struct StateApplier {
    state: Arc<InMemoryStateStore>,
}

impl StateApplier {
    pub fn new(state: Arc<InMemoryStateStore>) -> Self {
        Self { state }
    }

    /// Apply one accepted item. Returns `true` when state changed.
    pub fn apply(&self, item: &Accepted) -> bool {
        let hash = match item {
            Accepted::Operation(operation) => match operation.tx_hash() {
                Ok(hash) => hash,
                Err(e) => {
                    warn!(error = %e, "[node] Operation not applied");
                    return false;
                }
            },
            Accepted::PreTransaction(pre) => match pre.tx_bytes() {
                Ok(hash) => hash,
                Err(e) => {
                    warn!(error = %e, "[node] Proposal not applied");
                    return false;
                }
            },
            Accepted::AdminAttestation(_) | Accepted::ValidatorAttestation(_) => {
                debug!("[node] Attestation accepted");
                return false;
            }
        };

        self.state.put(&hash, APPLIED_MARKER);
        debug!(tx = %hex::encode(&hash[..4]), "[node] Transaction applied");
        true
    }

    /// Drain `accepted` until every sender is dropped.
    pub async fn run(self, mut accepted: mpsc::Receiver<Accepted>) {
        let mut applied = 0u64;
        while let Some(item) = accepted.recv().await {
            if self.apply(&item) {
                applied += 1;
            }
        }
        info!(applied, "[node] State applier stopped");
    }
}
