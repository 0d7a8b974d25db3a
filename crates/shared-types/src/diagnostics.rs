//! # Rejection Diagnostics
//!
//! Validators report every rejection to an injected [`RejectionObserver`].
//! Production wiring uses [`TracingObserver`]; tests use
//! [`RecordingObserver`] to assert on the stage that rejected.

use std::fmt;

use parking_lot::Mutex;
use tracing::warn;

/// Pipeline stage at which a message was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationStage {
    /// Structural shape or required-field presence.
    Payload,
    /// Issuer address does not decode to a public key.
    IssuerKeyDecode,
    /// Supplied hash does not match the recomputed hash.
    HashIntegrity,
    /// Signature does not verify.
    Signature,
    /// Proposal is addressed to a different validator.
    ValidatorAddress,
    /// Transaction hash already present in state.
    Uniqueness,
    /// Attestation issuer is not this node.
    IssuerPublicKey,
    /// Attestation is outside the freshness window.
    Timestamp,
    /// Attestation channel does not match.
    Channel,
    /// Admin entry missing or mismatched.
    AdminEntry,
    /// Node entry missing, not a writer, or an indexer.
    NodeEntry,
    /// Writing key does not match the stored entry.
    WritingKey,
    /// State store could not be consulted.
    StateUnavailable,
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single rejected message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Validator that rejected the message.
    pub validator: &'static str,
    /// Stage that failed.
    pub stage: ValidationStage,
    /// Human-readable reason.
    pub reason: String,
    /// Debug rendering of the offending payload.
    pub payload: String,
}

/// Observer notified of every rejection.
pub trait RejectionObserver: Send + Sync {
    fn on_rejection(&self, rejection: &Rejection);
}

/// Logs rejections through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RejectionObserver for TracingObserver {
    fn on_rejection(&self, rejection: &Rejection) {
        warn!(
            validator = rejection.validator,
            stage = %rejection.stage,
            reason = %rejection.reason,
            payload = %rejection.payload,
            "Message rejected"
        );
    }
}

/// Keeps every rejection in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    rejections: Mutex<Vec<Rejection>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rejections seen so far.
    pub fn rejections(&self) -> Vec<Rejection> {
        self.rejections.lock().clone()
    }

    /// Stages of all rejections seen so far, in order.
    pub fn stages(&self) -> Vec<ValidationStage> {
        self.rejections.lock().iter().map(|r| r.stage).collect()
    }

    /// Stage of the most recent rejection.
    pub fn last_stage(&self) -> Option<ValidationStage> {
        self.rejections.lock().last().map(|r| r.stage)
    }

    pub fn is_empty(&self) -> bool {
        self.rejections.lock().is_empty()
    }
}

impl RejectionObserver for RecordingObserver {
    fn on_rejection(&self, rejection: &Rejection) {
        self.rejections.lock().push(rejection.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        assert!(observer.is_empty());

        for stage in [ValidationStage::Payload, ValidationStage::Timestamp] {
            observer.on_rejection(&Rejection {
                validator: "test",
                stage,
                reason: "r".into(),
                payload: "p".into(),
            });
        }

        assert_eq!(
            observer.stages(),
            vec![ValidationStage::Payload, ValidationStage::Timestamp]
        );
        assert_eq!(observer.last_stage(), Some(ValidationStage::Timestamp));
    }
}
