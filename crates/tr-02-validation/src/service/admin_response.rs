//! # Admin Response Validator
//!
//! payload → issuer key → timestamp → admin entry → admin signature → channel

use async_trait::async_trait;
use shared_types::hashing::decode_fixed;
use shared_types::{Address, Attestation, ValidationStage};

use crate::domain::pipeline::{state_failure, AttestationPipeline};
use crate::domain::value_objects::{AttestationKind, StageFailure, StageResult};
use crate::ports::inbound::MessageValidator;

const VALIDATOR: &str = "admin_response";

/// Validates attestations from the registered admin.
pub struct AdminResponseValidator {
    pipeline: AttestationPipeline,
}

impl AdminResponseValidator {
    pub fn new(pipeline: AttestationPipeline) -> Self {
        Self { pipeline }
    }

    async fn run(&self, attestation: &Attestation) -> StageResult {
        self.pipeline.validate_payload(attestation)?;
        self.pipeline.validate_issuer_public_key(attestation)?;
        self.pipeline.validate_timestamp(attestation)?;
        self.validate_admin_entry(attestation).await?;
        self.pipeline
            .validate_signature(attestation, AttestationKind::Admin)
            .await?;
        self.pipeline.validate_channel(attestation)
    }

    /// The stored admin entry exists and matches address and writing key.
    async fn validate_admin_entry(&self, attestation: &Attestation) -> StageResult {
        let mismatch = |reason: String| StageFailure::new(ValidationStage::AdminEntry, reason);

        let admin = self
            .pipeline
            .state()
            .get_admin_entry()
            .await
            .map_err(state_failure)?
            .ok_or_else(|| mismatch("no admin registered".into()))?;

        let address =
            Address::parse(&attestation.response.address).map_err(|e| mismatch(e.to_string()))?;
        if address != admin.address {
            return Err(mismatch(format!("{address} is not the admin")));
        }

        let wk = decode_fixed::<32>("wk", &attestation.response.wk)
            .map_err(|e| mismatch(e.to_string()))?;
        if wk != admin.wk {
            return Err(mismatch("writing key differs from admin entry".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageValidator<Attestation> for AdminResponseValidator {
    async fn validate(&self, attestation: &Attestation) -> bool {
        let outcome = self.run(attestation).await;
        self.pipeline.conclude(VALIDATOR, attestation, outcome)
    }
}
