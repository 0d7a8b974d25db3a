//! Two runtimes on the in-memory transport sharing one ledger view.

use std::sync::Arc;
use std::time::Duration;

use node_runtime::{NodeConfig, NodeRuntime, ProtocolKind};
use shared_types::{
    InMemoryStateStore, NetworkMessage, OperationMessage, OperationPayload, OperationType,
    PreTransaction, StateStore, TransferOperation,
};
use tr_01_identity::NetworkKeypairIdentity;
use tr_03_protocol::{memory_pair, ProtocolSession};
use tr_04_orchestrator::ValidatorPool;

struct Network {
    relay: NodeRuntime,
    validator: NodeRuntime,
    state: Arc<InMemoryStateStore>,
    /// Relay-side session to the validator.
    session: ProtocolSession,
    /// Keeps the validator side of the connection alive.
    _served: ProtocolSession,
}

fn config() -> NodeConfig {
    let mut config = NodeConfig::default();
    config.orchestrator.response_timeout_ms = 3_000;
    config.orchestrator.attempt_timeout_ms = 1_000;
    config.orchestrator.poll_interval_ms = 20;
    config
}

fn network(kind: ProtocolKind) -> Network {
    let state = Arc::new(InMemoryStateStore::new());
    let relay = NodeRuntime::new(config(), state.clone()).unwrap();
    let validator = NodeRuntime::new(config(), state.clone()).unwrap();
    relay.start().unwrap();
    validator.start().unwrap();

    let (relay_end, validator_end) = memory_pair(
        relay.identity().public_key(),
        validator.identity().public_key(),
    );
    let _served = validator.accept_peer(validator_end, kind).unwrap();
    let session = relay.connect_validator(relay_end, kind).unwrap();

    Network {
        relay,
        validator,
        state,
        session,
        _served,
    }
}

fn transfer(tx: [u8; 32]) -> OperationMessage {
    OperationMessage {
        op_type: OperationType::Transfer,
        address: "sender".into(),
        payload: OperationPayload::Transfer(TransferOperation {
            tx: hex::encode(tx),
            to: "recipient".into(),
            am: "0a".into(),
            index: "01".repeat(32),
            is: "02".repeat(64),
        }),
    }
}

fn proposal(validator: &NodeRuntime, issuer: &NetworkKeypairIdentity) -> PreTransaction {
    let mut pre = PreTransaction {
        bs: "01".repeat(32),
        mbs: "02".repeat(32),
        va: validator.identity().address().to_string(),
        iw: hex::encode(issuer.public_key()),
        ia: issuer.address().to_string(),
        ch: "04".repeat(32),
        index: "05".repeat(32),
        tx: String::new(),
        is: String::new(),
    };
    let hash = pre.compute_hash().unwrap();
    pre.tx = hex::encode(hash);
    pre.is = hex::encode(issuer.sign(&hash));
    pre
}

async fn eventually_applied(state: &InMemoryStateStore, key: &[u8]) -> bool {
    for _ in 0..50 {
        if state.get(key).await.unwrap().is_some() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn test_broadcast_confirmed_over_v1() {
    let net = network(ProtocolKind::V1);
    let validator_id = net.validator.identity().public_key();

    assert!(net.relay.broadcast(&transfer([0x11; 32])).await);
    assert_eq!(net.relay.pool().get_sent_count(&validator_id), 1);
    assert!(net.state.get(&[0x11; 32]).await.unwrap().is_some());

    net.relay.shutdown().await;
    net.validator.shutdown().await;
}

#[tokio::test]
async fn test_broadcast_confirmed_over_legacy() {
    let net = network(ProtocolKind::Legacy);

    assert!(net.relay.broadcast(&transfer([0x22; 32])).await);
    assert_eq!(net.relay.pool().len(), 1);
}

#[tokio::test]
async fn test_proposal_acked_and_applied() {
    let net = network(ProtocolKind::V1);
    let issuer = NetworkKeypairIdentity::generate();
    let pre = proposal(&net.validator, &issuer);
    let tx = pre.tx_bytes().unwrap();

    let reply = net
        .session
        .send(NetworkMessage::PreTransaction(pre))
        .await
        .unwrap();

    assert_eq!(reply, Some(NetworkMessage::Ack { accepted: true }));
    assert!(eventually_applied(&net.state, &tx).await);
}

#[tokio::test]
async fn test_tampered_proposal_is_refused() {
    let net = network(ProtocolKind::V1);
    let issuer = NetworkKeypairIdentity::generate();
    let mut pre = proposal(&net.validator, &issuer);
    pre.bs = "09".repeat(32);
    let tx = pre.tx_bytes().unwrap();

    let reply = net
        .session
        .send(NetworkMessage::PreTransaction(pre))
        .await
        .unwrap();

    assert_eq!(reply, Some(NetworkMessage::Ack { accepted: false }));
    assert!(!net.session.is_closed());
    assert_eq!(net.state.get(&tx).await.unwrap(), None);
}

#[tokio::test]
async fn test_proposal_for_another_validator_is_refused() {
    let net = network(ProtocolKind::V1);
    let issuer = NetworkKeypairIdentity::generate();
    // Addressed to the relay, delivered to the validator.
    let pre = proposal(&net.relay, &issuer);

    let reply = net
        .session
        .send(NetworkMessage::PreTransaction(pre))
        .await
        .unwrap();

    assert_eq!(reply, Some(NetworkMessage::Ack { accepted: false }));
}

#[tokio::test]
async fn test_shutdown_empties_pool() {
    let net = network(ProtocolKind::V1);
    assert_eq!(net.relay.pool().len(), 1);

    net.relay.shutdown().await;

    assert!(net.relay.pool().is_empty());
    assert!(net.session.is_closed());
    assert!(!net.relay.broadcast(&transfer([0x33; 32])).await);
}
