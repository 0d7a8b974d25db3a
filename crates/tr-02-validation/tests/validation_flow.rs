//! End-to-end validation through the public API with a real identity and the
//! in-memory state store.

use std::sync::Arc;

use shared_types::{
    now_ms, Attestation, AttestationResponse, InMemoryStateStore, NodeEntry, PreTransaction,
    RecordingObserver, TracingObserver, ValidationStage,
};
use tr_01_identity::{IdentityProvider, NetworkKeypairIdentity};
use tr_02_validation::{
    AttestationConfig, AttestationPipeline, MessageValidator, PreTransactionValidator,
    ValidatorResponseValidator,
};

fn node_identity() -> (Arc<IdentityProvider>, NetworkKeypairIdentity) {
    let keys = NetworkKeypairIdentity::generate();
    let provider =
        IdentityProvider::from_network_keypair(&keys.public_key(), &keys.secret_key_bytes())
            .unwrap();
    (Arc::new(provider), keys)
}

fn proposal(node: &IdentityProvider, issuer: &NetworkKeypairIdentity) -> PreTransaction {
    let mut pre = PreTransaction {
        bs: "aa".repeat(32),
        mbs: "bb".repeat(32),
        va: node.address().to_string(),
        iw: "cc".repeat(32),
        ia: issuer.address().to_string(),
        ch: "dd".repeat(32),
        index: "ee".repeat(32),
        tx: String::new(),
        is: String::new(),
    };
    let tx = pre.compute_hash().unwrap();
    pre.tx = hex::encode(tx);
    pre.is = hex::encode(issuer.sign(&tx));
    pre
}

#[tokio::test]
async fn test_proposal_is_accepted_once_then_replay_rejected() {
    let (node, _) = node_identity();
    let issuer = NetworkKeypairIdentity::generate();
    let state = Arc::new(InMemoryStateStore::new());
    let observer = Arc::new(RecordingObserver::new());
    let validator = PreTransactionValidator::new(node.clone(), state.clone(), observer.clone());

    let pre = proposal(&node, &issuer);
    assert!(validator.validate(&pre).await);

    // The state layer applies the accepted proposal.
    state.put(&pre.tx_bytes().unwrap(), b"applied");

    assert!(!validator.validate(&pre).await);
    assert_eq!(observer.stages(), vec![ValidationStage::Uniqueness]);
}

#[tokio::test]
async fn test_validator_attestation_round_trip() {
    let (node, _) = node_identity();
    let peer = NetworkKeypairIdentity::generate();
    let state = Arc::new(InMemoryStateStore::new());
    let wk = [7u8; 32];
    state.put_node_entry(NodeEntry {
        address: peer.address().clone(),
        wk,
        is_writer: true,
        is_indexer: false,
    });

    let config = AttestationConfig {
        channel: "integration".into(),
        ..AttestationConfig::default()
    };
    let pipeline = AttestationPipeline::new(
        node.clone(),
        state.clone(),
        Arc::new(TracingObserver),
        config,
    );
    let validator = ValidatorResponseValidator::new(pipeline);

    let response = AttestationResponse {
        wk: hex::encode(wk),
        address: peer.address().to_string(),
        nonce: "01".repeat(16),
        channel: "integration".into(),
        issuer: hex::encode(node.public_key()),
        timestamp: now_ms(),
    };
    let sig = hex::encode(peer.sign(&response.signing_hash().unwrap()));
    let attestation = Attestation { response, sig };

    assert!(validator.validate(&attestation).await);

    // Once the peer becomes an indexer its attestations are refused.
    assert!(state.add_indexer(peer.address()));
    assert!(!validator.validate(&attestation).await);
}
