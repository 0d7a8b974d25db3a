//! # Pre-Transaction Validator
//!
//! Acceptance pipeline for proposals addressed to this node:
//!
//! 1. Payload shape
//! 2. Issuer key decodability (`ia`)
//! 3. Hash integrity (`tx` equals the recomputed hash)
//! 4. Issuer signature over the raw `tx` bytes
//! 5. `va` is this node's address
//! 6. `tx` is not already in state

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{PreTransaction, PublicKeyBytes, RejectionObserver, StateStore, ValidationStage};
use tr_01_identity::{decode_public_key, IdentityProvider};

use crate::domain::pipeline::{conclude, state_failure};
use crate::domain::schema;
use crate::domain::value_objects::{StageFailure, StageResult};
use crate::ports::inbound::MessageValidator;

const VALIDATOR: &str = "pre_transaction";

/// Validates inbound proposals.
pub struct PreTransactionValidator {
    identity: Arc<IdentityProvider>,
    state: Arc<dyn StateStore>,
    observer: Arc<dyn RejectionObserver>,
}

impl PreTransactionValidator {
    pub fn new(
        identity: Arc<IdentityProvider>,
        state: Arc<dyn StateStore>,
        observer: Arc<dyn RejectionObserver>,
    ) -> Self {
        Self {
            identity,
            state,
            observer,
        }
    }

    async fn run(&self, pre: &PreTransaction) -> StageResult {
        schema::check_pre_transaction(pre)
            .map_err(|e| StageFailure::new(ValidationStage::Payload, e.to_string()))?;

        let issuer = self.issuer_key(pre)?;
        let tx = self.hash_integrity(pre)?;
        self.signature(pre, &tx, &issuer)?;
        self.validator_address(pre)?;
        self.uniqueness(&tx).await
    }

    fn issuer_key(&self, pre: &PreTransaction) -> StageResult<PublicKeyBytes> {
        decode_public_key(&pre.ia)
            .map_err(|e| StageFailure::new(ValidationStage::IssuerKeyDecode, e.to_string()))
    }

    fn hash_integrity(&self, pre: &PreTransaction) -> StageResult<[u8; 32]> {
        let integrity = |e: shared_types::MessageError| {
            StageFailure::new(ValidationStage::HashIntegrity, e.to_string())
        };
        let expected = pre.compute_hash().map_err(integrity)?;
        let supplied = pre.tx_bytes().map_err(integrity)?;
        if expected != supplied {
            return Err(StageFailure::new(
                ValidationStage::HashIntegrity,
                "tx does not match the hash of the proposal fields",
            ));
        }
        Ok(supplied)
    }

    fn signature(&self, pre: &PreTransaction, tx: &[u8; 32], issuer: &PublicKeyBytes) -> StageResult {
        let signature = hex::decode(&pre.is)
            .map_err(|_| StageFailure::new(ValidationStage::Signature, "signature is not hex"))?;
        if !self.identity.verify(&signature, tx, Some(issuer)) {
            return Err(StageFailure::new(
                ValidationStage::Signature,
                "issuer signature does not verify",
            ));
        }
        Ok(())
    }

    fn validator_address(&self, pre: &PreTransaction) -> StageResult {
        if pre.va != self.identity.address().as_str() {
            return Err(StageFailure::new(
                ValidationStage::ValidatorAddress,
                format!("addressed to {}", pre.va),
            ));
        }
        Ok(())
    }

    async fn uniqueness(&self, tx: &[u8; 32]) -> StageResult {
        if self.state.get(tx).await.map_err(state_failure)?.is_some() {
            return Err(StageFailure::new(
                ValidationStage::Uniqueness,
                format!("transaction {} already in state", hex::encode(tx)),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageValidator<PreTransaction> for PreTransactionValidator {
    async fn validate(&self, pre: &PreTransaction) -> bool {
        let outcome = self.run(pre).await;
        conclude(self.observer.as_ref(), VALIDATOR, pre, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use shared_types::{RecordingObserver, StateError};

    fn validator(fixture: &Fixture) -> (PreTransactionValidator, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::new());
        let validator =
            PreTransactionValidator::new(fixture.node.clone(), fixture.state.clone(), observer.clone());
        (validator, observer)
    }

    #[tokio::test]
    async fn test_valid_proposal_accepted() {
        let fixture = Fixture::new();
        let (validator, observer) = validator(&fixture);
        assert!(validator.validate(&fixture.pre_transaction(|_| {})).await);
        assert!(observer.is_empty());
    }

    #[tokio::test]
    async fn test_missing_field_rejected_at_payload() {
        let fixture = Fixture::new();
        let (validator, observer) = validator(&fixture);
        let mut pre = fixture.pre_transaction(|_| {});
        pre.bs.clear();

        assert!(!validator.validate(&pre).await);
        assert_eq!(observer.last_stage(), Some(ValidationStage::Payload));
    }

    #[tokio::test]
    async fn test_undecodable_issuer_rejected() {
        let fixture = Fixture::new();
        let (validator, observer) = validator(&fixture);
        let pre = fixture.pre_transaction(|p| p.ia = "trac-not-an-address".into());

        assert!(!validator.validate(&pre).await);
        assert_eq!(observer.last_stage(), Some(ValidationStage::IssuerKeyDecode));
    }

    #[tokio::test]
    async fn test_tampered_field_fails_hash_integrity() {
        let fixture = Fixture::new();
        let (validator, observer) = validator(&fixture);
        let mut pre = fixture.pre_transaction(|_| {});
        pre.index = "09".repeat(32);

        assert!(!validator.validate(&pre).await);
        assert_eq!(observer.last_stage(), Some(ValidationStage::HashIntegrity));
    }

    #[tokio::test]
    async fn test_hash_binding_holds_even_with_valid_signature() {
        let fixture = Fixture::new();
        let (validator, observer) = validator(&fixture);
        let mut pre = fixture.pre_transaction(|_| {});
        // A correctly signed but unrelated hash.
        let forged = [0x42u8; 32];
        pre.tx = hex::encode(forged);
        pre.is = hex::encode(fixture.issuer.sign(&forged));

        assert!(!validator.validate(&pre).await);
        assert_eq!(observer.last_stage(), Some(ValidationStage::HashIntegrity));
    }

    #[tokio::test]
    async fn test_wrong_signer_rejected() {
        let fixture = Fixture::new();
        let (validator, observer) = validator(&fixture);
        let mut pre = fixture.pre_transaction(|_| {});
        let tx = pre.tx_bytes().unwrap();
        pre.is = hex::encode(fixture.validator.sign(&tx));

        assert!(!validator.validate(&pre).await);
        assert_eq!(observer.last_stage(), Some(ValidationStage::Signature));
    }

    #[tokio::test]
    async fn test_proposal_for_other_validator_rejected() {
        let fixture = Fixture::new();
        let (validator, observer) = validator(&fixture);
        let pre = fixture.pre_transaction(|p| p.va = fixture.validator.address().to_string());

        assert!(!validator.validate(&pre).await);
        assert_eq!(observer.last_stage(), Some(ValidationStage::ValidatorAddress));
    }

    #[tokio::test]
    async fn test_replay_rejected_at_uniqueness() {
        let fixture = Fixture::new();
        let (validator, observer) = validator(&fixture);
        let pre = fixture.pre_transaction(|_| {});

        assert!(validator.validate(&pre).await);
        fixture.state.put(&pre.tx_bytes().unwrap(), b"applied");

        assert!(!validator.validate(&pre).await);
        assert_eq!(observer.stages(), vec![ValidationStage::Uniqueness]);
    }

    #[tokio::test]
    async fn test_rejection_carries_payload() {
        let fixture = Fixture::new();
        let (validator, observer) = validator(&fixture);
        let mut pre = fixture.pre_transaction(|_| {});
        pre.mbs.clear();

        validator.validate(&pre).await;
        let rejection = &observer.rejections()[0];
        assert_eq!(rejection.validator, "pre_transaction");
        assert!(rejection.payload.contains(&pre.tx));
    }

    struct FailingStore;

    #[async_trait]
    impl StateStore for FailingStore {
        async fn get(&self, _key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
            Err(StateError::Unavailable("offline".into()))
        }

        async fn get_admin_entry(&self) -> Result<Option<shared_types::AdminEntry>, StateError> {
            Err(StateError::Unavailable("offline".into()))
        }

        async fn get_node_entry(
            &self,
            _address: &shared_types::Address,
        ) -> Result<Option<shared_types::NodeEntry>, StateError> {
            Err(StateError::Unavailable("offline".into()))
        }
    }

    #[tokio::test]
    async fn test_unreadable_state_rejects() {
        let fixture = Fixture::new();
        let observer = Arc::new(RecordingObserver::new());
        let validator =
            PreTransactionValidator::new(fixture.node.clone(), Arc::new(FailingStore), observer.clone());

        assert!(!validator.validate(&fixture.pre_transaction(|_| {})).await);
        assert_eq!(observer.last_stage(), Some(ValidationStage::StateUnavailable));
    }
}
