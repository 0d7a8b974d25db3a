//! # Validation Router
//!
//! Routes inbound session messages to the validators and forwards whatever
//! they accept to the state layer.
//!
//! | Message | Handling | Reply |
//! |---------|----------|-------|
//! | `PreTransaction` | `PreTransactionValidator` | `Ack { accepted }` |
//! | `AdminAttestation` | `AdminResponseValidator` | `Ack { accepted }` |
//! | `ValidatorAttestation` | `ValidatorResponseValidator` | `Ack { accepted }` |
//! | `Operation` | forwarded unvalidated | none |
//! | `Ack` | dropped on legacy, protocol error on V1 | none |

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{Attestation, NetworkMessage, OperationMessage, PreTransaction};
use tokio::sync::mpsc;
use tr_02_validation::{
    AdminResponseValidator, MessageValidator, PreTransactionValidator, ValidatorResponseValidator,
};
use tr_03_protocol::{MuxConnection, ProtocolSession, RouteError, Router};
use tracing::{debug, warn};

/// Items handed to the state layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accepted {
    PreTransaction(PreTransaction),
    AdminAttestation(Attestation),
    ValidatorAttestation(Attestation),
    Operation(OperationMessage),
}

/// [`Router`] wired to the three validators.
pub struct ValidationRouter {
    pre_transaction: PreTransactionValidator,
    admin: AdminResponseValidator,
    validator: ValidatorResponseValidator,
    accepted: mpsc::Sender<Accepted>,
}

impl ValidationRouter {
    pub fn new(
        pre_transaction: PreTransactionValidator,
        admin: AdminResponseValidator,
        validator: ValidatorResponseValidator,
        accepted: mpsc::Sender<Accepted>,
    ) -> Self {
        Self {
            pre_transaction,
            admin,
            validator,
            accepted,
        }
    }

    async fn forward(&self, item: Accepted) -> Result<(), RouteError> {
        self.accepted
            .send(item)
            .await
            .map_err(|_| RouteError::AcceptChannelClosed)
    }

    async fn acknowledge(
        &self,
        accepted: bool,
        item: Accepted,
    ) -> Result<Option<NetworkMessage>, RouteError> {
        if accepted {
            self.forward(item).await?;
        }
        Ok(Some(NetworkMessage::Ack { accepted }))
    }
}

#[async_trait]
impl Router for ValidationRouter {
    async fn route(
        &self,
        message: NetworkMessage,
        _connection: Arc<dyn MuxConnection>,
        session: Option<ProtocolSession>,
    ) -> Result<Option<NetworkMessage>, RouteError> {
        debug!(kind = message.kind(), "[node] Routing inbound message");

        match message {
            NetworkMessage::PreTransaction(pre) => {
                let accepted = self.pre_transaction.validate(&pre).await;
                self.acknowledge(accepted, Accepted::PreTransaction(pre)).await
            }
            NetworkMessage::AdminAttestation(attestation) => {
                let accepted = self.admin.validate(&attestation).await;
                self.acknowledge(accepted, Accepted::AdminAttestation(attestation))
                    .await
            }
            NetworkMessage::ValidatorAttestation(attestation) => {
                let accepted = self.validator.validate(&attestation).await;
                self.acknowledge(accepted, Accepted::ValidatorAttestation(attestation))
                    .await
            }
            NetworkMessage::Operation(operation) => {
                self.forward(Accepted::Operation(operation)).await?;
                Ok(None)
            }
            NetworkMessage::Ack { accepted } => match session {
                Some(ProtocolSession::V1(_)) => Err(RouteError::UnexpectedMessage("ack")),
                _ => {
                    warn!(accepted, "[node] Uncorrelated ack dropped");
                    Ok(None)
                }
            },
        }
    }
}
