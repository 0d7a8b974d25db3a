//! Orchestrator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delivery timing and rotation policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Overall deadline for one `send`, in ms.
    pub response_timeout_ms: u64,
    /// Attempts against one validator before it is evicted.
    pub max_retries: u32,
    /// How long one attempt polls state for confirmation, in ms.
    pub attempt_timeout_ms: u64,
    /// Sleep between state polls, in ms.
    pub poll_interval_ms: u64,
    /// Confirmed deliveries after which a validator is rotated out.
    pub max_sent_count: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: 10_000,
            max_retries: 3,
            attempt_timeout_ms: 3_000,
            poll_interval_ms: 200,
            max_sent_count: 10,
        }
    }
}

impl OrchestratorConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
