//! Value objects for validation configuration and stage outcomes.

use serde::{Deserialize, Serialize};
use shared_types::ValidationStage;

/// Attestation validator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttestationConfig {
    /// Channel every accepted attestation must name.
    pub channel: String,
    /// Maximum distance between an attestation timestamp and now, in ms.
    pub freshness_window_ms: u64,
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            channel: "trac-main".to_string(),
            freshness_window_ms: 5_000,
        }
    }
}

/// Which key an attestation signature is checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttestationKind {
    /// Signed by the registered admin.
    Admin,
    /// Signed by the validator named in `response.address`.
    Validator,
}

/// Why a stage refused a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: ValidationStage,
    pub reason: String,
}

impl StageFailure {
    pub fn new(stage: ValidationStage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

/// Outcome of a single pipeline stage.
pub type StageResult<T = ()> = Result<T, StageFailure>;
