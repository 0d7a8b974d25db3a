//! # Node Runtime
//!
//! Owns the node identity, the validator pool and the inbound router, and
//! runs the background tasks.
//!
//! ## Startup Sequence
//!
//! 1. Build the identity from `TR_PUBLIC_KEY` / `TR_SECRET_KEY`, or generate
//!    an ephemeral one
//! 2. Wire the validators into `ValidationRouter`
//! 3. `start()` spawns the state applier and the pending-request sweep
//! 4. Peers are attached through `connect_validator` / `accept_peer`

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use shared_types::{
    InMemoryStateStore, OperationMessage, RejectionObserver, StateStore, TracingObserver,
};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tr_01_identity::{IdentityError, IdentityProvider, IdentityStrategy, NetworkKeypairIdentity};
use tr_02_validation::{
    AdminResponseValidator, AttestationPipeline, PreTransactionValidator,
    ValidatorResponseValidator,
};
use tr_03_protocol::{
    LegacySession, MuxConnection, PendingRequestStore, ProtocolSession, SessionError, V1Session,
};
use tr_04_orchestrator::{MessageOrchestrator, SessionPool};
use tracing::{debug, info, warn};

use super::config::{KeyConfig, NodeConfig};
use crate::adapters::router::{Accepted, ValidationRouter};
use crate::adapters::state::StateApplier;

/// Wire protocol spoken on a peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    V1,
    Legacy,
}

/// Runtime errors.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Invalid node key pair: {0}")]
    Identity(#[from] IdentityError),

    #[error("TR_PUBLIC_KEY and TR_SECRET_KEY must be set together")]
    IncompleteKeys,

    #[error("Failed to open session: {0}")]
    Session(#[from] SessionError),

    #[error("Runtime already started")]
    AlreadyStarted,
}

/// A running Trust-Relay node.
pub struct NodeRuntime {
    config: NodeConfig,
    identity: Arc<IdentityProvider>,
    state: Arc<InMemoryStateStore>,
    pool: Arc<SessionPool>,
    pending: Arc<PendingRequestStore>,
    orchestrator: MessageOrchestrator,
    router: Arc<ValidationRouter>,
    accepted_rx: Mutex<Option<mpsc::Receiver<Accepted>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl NodeRuntime {
    /// Build the runtime over `state`.
    ///
    /// # Errors
    /// - `IncompleteKeys` if only one half of the key pair is configured
    /// - `Identity` if the configured key pair is invalid
    pub fn new(config: NodeConfig, state: Arc<InMemoryStateStore>) -> Result<Self, NodeError> {
        let identity = Arc::new(build_identity(&config.keys)?);
        info!(address = %identity.address(), "[node] Identity ready");

        let store: Arc<dyn StateStore> = state.clone();
        let observer: Arc<dyn RejectionObserver> = Arc::new(TracingObserver);
        let pipeline = || {
            AttestationPipeline::new(
                identity.clone(),
                store.clone(),
                observer.clone(),
                config.attestation.clone(),
            )
        };

        let (accepted_tx, accepted_rx) = mpsc::channel(config.node.accept_queue.max(1));
        let router = Arc::new(ValidationRouter::new(
            PreTransactionValidator::new(identity.clone(), store.clone(), observer.clone()),
            AdminResponseValidator::new(pipeline()),
            ValidatorResponseValidator::new(pipeline()),
            accepted_tx,
        ));

        let pool = Arc::new(SessionPool::new());
        let orchestrator =
            MessageOrchestrator::new(pool.clone(), store.clone(), config.orchestrator.clone());
        let pending = Arc::new(PendingRequestStore::new(config.session.reply_timeout()));
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            config,
            identity,
            state,
            pool,
            pending,
            orchestrator,
            router,
            accepted_rx: Mutex::new(Some(accepted_rx)),
            shutdown_tx,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn identity(&self) -> &Arc<IdentityProvider> {
        &self.identity
    }

    pub fn state(&self) -> &Arc<InMemoryStateStore> {
        &self.state
    }

    pub fn pool(&self) -> &Arc<SessionPool> {
        &self.pool
    }

    pub fn pending(&self) -> &Arc<PendingRequestStore> {
        &self.pending
    }

    pub fn orchestrator(&self) -> &MessageOrchestrator {
        &self.orchestrator
    }

    pub fn router(&self) -> &Arc<ValidationRouter> {
        &self.router
    }

    /// Spawn the state applier and the pending-request sweep.
    ///
    /// # Errors
    /// `AlreadyStarted` on a second call.
    pub fn start(&self) -> Result<(), NodeError> {
        let accepted_rx = self.accepted_rx.lock().take().ok_or(NodeError::AlreadyStarted)?;

        let applier = StateApplier::new(self.state.clone());
        let mut applier_shutdown = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = applier.run(accepted_rx) => {}
                _ = applier_shutdown.changed() => {
                    info!("[node] State applier shutdown");
                }
            }
        });

        let pending = self.pending.clone();
        let sweep = Duration::from_millis(self.config.node.pending_sweep_ms.max(1));
        let mut sweep_shutdown = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = pending.remove_expired();
                        if removed > 0 {
                            debug!(removed, "[node] Expired pending requests swept");
                        }
                    }
                    _ = sweep_shutdown.changed() => break,
                }
            }
        });

        info!(
            channel = %self.config.attestation.channel,
            "[node] Runtime started"
        );
        Ok(())
    }

    /// Open a session to a validator and add it to the delivery pool.
    ///
    /// The validator is keyed by the connection's remote peer id.
    pub fn connect_validator(
        &self,
        connection: Arc<dyn MuxConnection>,
        kind: ProtocolKind,
    ) -> Result<ProtocolSession, NodeError> {
        let session = self.open_session(connection, kind)?;
        self.pool.add(session.remote_peer(), session.clone());
        info!(
            validator = %hex::encode(&session.remote_peer()[..4]),
            protocol = session.protocol(),
            validators = self.pool.len(),
            "[node] Validator connected"
        );
        Ok(session)
    }

    /// Serve an inbound peer connection through the validation router.
    pub fn accept_peer(
        &self,
        connection: Arc<dyn MuxConnection>,
        kind: ProtocolKind,
    ) -> Result<ProtocolSession, NodeError> {
        let session = self.open_session(connection, kind)?;
        debug!(
            peer = %hex::encode(&session.remote_peer()[..4]),
            protocol = session.protocol(),
            "[node] Peer accepted"
        );
        Ok(session)
    }

    /// Deliver an operation to the validator pool.
    pub async fn broadcast(&self, operation: &OperationMessage) -> bool {
        self.orchestrator.send(operation).await
    }

    /// Stop background tasks and close every pooled session.
    pub async fn shutdown(&self) {
        info!("[node] Initiating shutdown");
        if self.shutdown_tx.send(true).is_err() {
            debug!("[node] No background tasks running");
        }
        self.pool.clear();
        tokio::task::yield_now().await;
        info!("[node] Shutdown complete");
    }

    fn open_session(
        &self,
        connection: Arc<dyn MuxConnection>,
        kind: ProtocolKind,
    ) -> Result<ProtocolSession, NodeError> {
        let router = self.router.clone();
        let session = match kind {
            ProtocolKind::V1 => ProtocolSession::V1(V1Session::init(
                connection,
                router,
                self.pending.clone(),
                self.config.session.clone(),
            )?),
            ProtocolKind::Legacy => ProtocolSession::Legacy(LegacySession::init(connection, router)?),
        };
        Ok(session)
    }
}

fn build_identity(keys: &KeyConfig) -> Result<IdentityProvider, NodeError> {
    match (&keys.public_key, &keys.secret_key) {
        (Some(public_key), Some(secret_key)) => {
            Ok(IdentityProvider::from_network_keypair(public_key, secret_key)?)
        }
        (None, None) => {
            warn!("[node] No key pair configured, using an ephemeral identity");
            Ok(IdentityProvider::new(IdentityStrategy::NetworkKeypair(
                Arc::new(NetworkKeypairIdentity::generate()),
            )))
        }
        _ => Err(NodeError::IncompleteKeys),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr_01_identity::StrategyKind;
    use zeroize::Zeroizing;

    fn runtime(keys: KeyConfig) -> Result<NodeRuntime, NodeError> {
        let config = NodeConfig {
            keys,
            ..NodeConfig::default()
        };
        NodeRuntime::new(config, Arc::new(InMemoryStateStore::new()))
    }

    #[tokio::test]
    async fn test_configured_keys_become_identity() {
        let keypair = NetworkKeypairIdentity::generate();
        let node = runtime(KeyConfig {
            public_key: Some(keypair.public_key().to_vec()),
            secret_key: Some(Zeroizing::new(keypair.secret_key_bytes().to_vec())),
        })
        .unwrap();

        assert_eq!(node.identity().address(), *keypair.address());
        assert_eq!(node.identity().strategy_kind(), StrategyKind::NetworkKeypair);
    }

    #[tokio::test]
    async fn test_half_a_key_pair_is_rejected() {
        let result = runtime(KeyConfig {
            public_key: Some(vec![0u8; 32]),
            secret_key: None,
        });
        assert!(matches!(result, Err(NodeError::IncompleteKeys)));
    }

    #[tokio::test]
    async fn test_mismatched_key_pair_is_rejected() {
        let a = NetworkKeypairIdentity::generate();
        let b = NetworkKeypairIdentity::generate();
        let result = runtime(KeyConfig {
            public_key: Some(a.public_key().to_vec()),
            secret_key: Some(Zeroizing::new(b.secret_key_bytes().to_vec())),
        });
        assert!(matches!(result, Err(NodeError::Identity(_))));
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let node = runtime(KeyConfig::default()).unwrap();
        node.start().unwrap();
        assert!(matches!(node.start(), Err(NodeError::AlreadyStarted)));
        node.shutdown().await;
    }
}
