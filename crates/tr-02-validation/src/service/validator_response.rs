//! # Validator Response Validator
//!
//! payload → issuer key → timestamp → node entry → writing key → signature → channel
//!
//! The node entry must be a writer and must not be an indexer. Indexer status
//! is read both from the entry flag and from the encoded indexer list.

use async_trait::async_trait;
use shared_types::hashing::decode_fixed;
use shared_types::indexer_entry;
use shared_types::{Address, Attestation, NodeEntry, ValidationStage};

use crate::domain::pipeline::{state_failure, AttestationPipeline};
use crate::domain::value_objects::{AttestationKind, StageFailure, StageResult};
use crate::ports::inbound::MessageValidator;

const VALIDATOR: &str = "validator_response";

/// Validates attestations from writer validators.
pub struct ValidatorResponseValidator {
    pipeline: AttestationPipeline,
}

impl ValidatorResponseValidator {
    pub fn new(pipeline: AttestationPipeline) -> Self {
        Self { pipeline }
    }

    async fn run(&self, attestation: &Attestation) -> StageResult {
        self.pipeline.validate_payload(attestation)?;
        self.pipeline.validate_issuer_public_key(attestation)?;
        self.pipeline.validate_timestamp(attestation)?;
        let entry = self.validate_node_entry(attestation).await?;
        self.validate_writing_key(attestation, &entry)?;
        self.pipeline
            .validate_signature(attestation, AttestationKind::Validator)
            .await?;
        self.pipeline.validate_channel(attestation)
    }

    async fn validate_node_entry(&self, attestation: &Attestation) -> StageResult<NodeEntry> {
        let reject = |reason: String| StageFailure::new(ValidationStage::NodeEntry, reason);

        let address =
            Address::parse(&attestation.response.address).map_err(|e| reject(e.to_string()))?;
        let state = self.pipeline.state();

        let entry = state
            .get_node_entry(&address)
            .await
            .map_err(state_failure)?
            .ok_or_else(|| reject(format!("{address} is not registered")))?;

        if !entry.is_writer {
            return Err(reject(format!("{address} is not a writer")));
        }
        if entry.is_indexer {
            return Err(reject(format!("{address} is an indexer")));
        }

        let indexers = state.get_indexer_entry().await.map_err(state_failure)?;
        if let Some(list) = indexers {
            if indexer_entry::get_index(&list, address.as_bytes()).is_some() {
                return Err(reject(format!("{address} is listed as an indexer")));
            }
        }

        Ok(entry)
    }

    fn validate_writing_key(&self, attestation: &Attestation, entry: &NodeEntry) -> StageResult {
        let wk = decode_fixed::<32>("wk", &attestation.response.wk)
            .map_err(|e| StageFailure::new(ValidationStage::WritingKey, e.to_string()))?;
        if wk != entry.wk {
            return Err(StageFailure::new(
                ValidationStage::WritingKey,
                "writing key differs from node entry",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageValidator<Attestation> for ValidatorResponseValidator {
    async fn validate(&self, attestation: &Attestation) -> bool {
        let outcome = self.run(attestation).await;
        self.pipeline.conclude(VALIDATOR, attestation, outcome)
    }
}
