//! # Attestation Pipeline
//!
//! Stages shared by the admin and validator attestation validators. Each
//! concrete validator composes these in its own order with `?`.
//!
//! The pipeline holds the node identity, read access to state and the
//! rejection observer. It has no mutable state.

use std::sync::Arc;

use shared_types::hashing::decode_fixed;
use shared_types::{
    now_ms, Address, Attestation, PublicKeyBytes, Rejection, RejectionObserver, StateError,
    StateStore, ValidationStage,
};
use tr_01_identity::IdentityProvider;
use tracing::debug;

use super::schema;
use super::value_objects::{AttestationConfig, AttestationKind, StageFailure, StageResult};

/// Map a state read failure onto the pipeline.
pub(crate) fn state_failure(err: StateError) -> StageFailure {
    StageFailure::new(ValidationStage::StateUnavailable, err.to_string())
}

/// Base stages for attestation validation.
#[derive(Clone)]
pub struct AttestationPipeline {
    identity: Arc<IdentityProvider>,
    state: Arc<dyn StateStore>,
    observer: Arc<dyn RejectionObserver>,
    config: AttestationConfig,
}

impl AttestationPipeline {
    pub fn new(
        identity: Arc<IdentityProvider>,
        state: Arc<dyn StateStore>,
        observer: Arc<dyn RejectionObserver>,
        config: AttestationConfig,
    ) -> Self {
        Self {
            identity,
            state,
            observer,
            config,
        }
    }

    pub fn state(&self) -> &dyn StateStore {
        self.state.as_ref()
    }

    pub fn config(&self) -> &AttestationConfig {
        &self.config
    }

    /// All required fields present and well formed.
    pub fn validate_payload(&self, attestation: &Attestation) -> StageResult {
        schema::check_attestation(attestation)
            .map_err(|e| StageFailure::new(ValidationStage::Payload, e.to_string()))
    }

    /// The attestation was requested by this node.
    pub fn validate_issuer_public_key(&self, attestation: &Attestation) -> StageResult {
        let issuer = decode_fixed::<32>("issuer", &attestation.response.issuer)
            .map_err(|e| StageFailure::new(ValidationStage::IssuerPublicKey, e.to_string()))?;
        if issuer != self.identity.public_key() {
            return Err(StageFailure::new(
                ValidationStage::IssuerPublicKey,
                "issuer is not this node",
            ));
        }
        Ok(())
    }

    /// The timestamp is within the freshness window of the local clock.
    pub fn validate_timestamp(&self, attestation: &Attestation) -> StageResult {
        self.validate_timestamp_at(attestation, now_ms())
    }

    /// [`validate_timestamp`](Self::validate_timestamp) against an explicit `now`.
    pub fn validate_timestamp_at(&self, attestation: &Attestation, now: u64) -> StageResult {
        let age = now.abs_diff(attestation.response.timestamp);
        if age > self.config.freshness_window_ms {
            return Err(StageFailure::new(
                ValidationStage::Timestamp,
                format!(
                    "timestamp is {age} ms from now, window is {} ms",
                    self.config.freshness_window_ms
                ),
            ));
        }
        Ok(())
    }

    /// The attestation names the expected channel.
    pub fn validate_channel(&self, attestation: &Attestation) -> StageResult {
        if attestation.response.channel != self.config.channel {
            return Err(StageFailure::new(
                ValidationStage::Channel,
                format!("unexpected channel {:?}", attestation.response.channel),
            ));
        }
        Ok(())
    }

    /// The signature verifies over the canonical response hash.
    ///
    /// Admin attestations are checked against the registered admin address;
    /// validator attestations against `response.address`.
    pub async fn validate_signature(
        &self,
        attestation: &Attestation,
        kind: AttestationKind,
    ) -> StageResult {
        let public_key = self.signer_key(attestation, kind).await?;

        let hash = attestation
            .response
            .signing_hash()
            .map_err(|e| StageFailure::new(ValidationStage::Signature, e.to_string()))?;
        let signature = hex::decode(&attestation.sig)
            .map_err(|_| StageFailure::new(ValidationStage::Signature, "signature is not hex"))?;

        if !self.identity.verify(&signature, &hash, Some(&public_key)) {
            return Err(StageFailure::new(
                ValidationStage::Signature,
                format!("{kind:?} signature does not verify"),
            ));
        }
        Ok(())
    }

    async fn signer_key(
        &self,
        attestation: &Attestation,
        kind: AttestationKind,
    ) -> StageResult<PublicKeyBytes> {
        match kind {
            AttestationKind::Admin => {
                let admin = self
                    .state
                    .get_admin_entry()
                    .await
                    .map_err(state_failure)?
                    .ok_or_else(|| {
                        StageFailure::new(ValidationStage::AdminEntry, "no admin registered")
                    })?;
                Ok(*admin.address.public_key())
            }
            AttestationKind::Validator => {
                let address = Address::parse(&attestation.response.address)
                    .map_err(|e| StageFailure::new(ValidationStage::Signature, e.to_string()))?;
                Ok(*address.public_key())
            }
        }
    }

    /// Report a failed stage and convert the outcome to a boolean.
    pub fn conclude<M: std::fmt::Debug>(
        &self,
        validator: &'static str,
        message: &M,
        outcome: StageResult,
    ) -> bool {
        conclude(self.observer.as_ref(), validator, message, outcome)
    }
}

/// Report `outcome` to `observer` if it failed. Returns whether it passed.
pub(crate) fn conclude<M: std::fmt::Debug>(
    observer: &dyn RejectionObserver,
    validator: &'static str,
    message: &M,
    outcome: StageResult,
) -> bool {
    match outcome {
        Ok(()) => {
            debug!(validator, "Message accepted");
            true
        }
        Err(failure) => {
            observer.on_rejection(&Rejection {
                validator,
                stage: failure.stage,
                reason: failure.reason,
                payload: format!("{message:?}"),
            });
            false
        }
    }
}
