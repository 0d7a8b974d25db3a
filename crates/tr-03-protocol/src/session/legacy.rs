//! # Legacy Session
//!
//! Structured messages, no request correlation. Failures while handling an
//! inbound message are logged and the connection stays up.

use std::sync::Arc;

use shared_types::{NetworkMessage, PeerId};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::core::SessionCore;
use super::ProtocolSession;
use crate::domain::config::LEGACY_PROTOCOL;
use crate::domain::errors::SessionError;
use crate::ports::outbound::{ChannelFrame, MuxConnection, Router};

/// Session speaking the legacy structured protocol.
#[derive(Clone)]
pub struct LegacySession {
    core: Arc<SessionCore>,
}

impl LegacySession {
    /// Open the legacy sub-channel on `connection` and start the inbound
    /// handler. Must be called within a tokio runtime.
    pub fn init(
        connection: Arc<dyn MuxConnection>,
        router: Arc<dyn Router>,
    ) -> Result<Self, SessionError> {
        let channel = connection.open_channel(LEGACY_PROTOCOL)?;
        let session = Self {
            core: Arc::new(SessionCore::new(connection, channel.sink)),
        };

        let handle = tokio::spawn(session.clone().read_loop(channel.inbound, router));
        session.core.set_reader(handle);

        info!(peer = %hex_peer(&session.remote_peer()), "[tr-03] Legacy session opened");
        Ok(session)
    }

    pub fn remote_peer(&self) -> PeerId {
        self.core.connection.remote_peer()
    }

    /// Structured frames pass through unchanged.
    pub fn decode(&self, frame: ChannelFrame) -> Result<NetworkMessage, SessionError> {
        match frame {
            ChannelFrame::Structured(message) => Ok(message),
            other => Err(SessionError::UnexpectedFrame(other.kind())),
        }
    }

    /// Fire-and-forget; always resolves to `None`.
    pub async fn send(
        &self,
        message: NetworkMessage,
    ) -> Result<Option<NetworkMessage>, SessionError> {
        self.send_and_forget(message).await?;
        Ok(None)
    }

    pub async fn send_and_forget(&self, message: NetworkMessage) -> Result<(), SessionError> {
        self.core.write(ChannelFrame::Structured(message)).await
    }

    pub fn close(&self) {
        if self.core.shutdown() {
            debug!(peer = %hex_peer(&self.remote_peer()), "[tr-03] Legacy session closed");
        }
        self.core.abort_reader();
    }

    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    async fn read_loop(self, mut inbound: mpsc::Receiver<ChannelFrame>, router: Arc<dyn Router>) {
        while let Some(frame) = inbound.recv().await {
            if let Err(e) = self.handle_frame(frame, router.as_ref()).await {
                warn!(
                    peer = %hex_peer(&self.remote_peer()),
                    error = %e,
                    "[tr-03] Legacy message dropped"
                );
            }
        }
        debug!(peer = %hex_peer(&self.remote_peer()), "[tr-03] Legacy channel ended");
        self.core.shutdown();
    }

    async fn handle_frame(&self, frame: ChannelFrame, router: &dyn Router) -> Result<(), SessionError> {
        let message = self.decode(frame)?;
        let reply = router
            .route(
                message,
                self.core.connection.clone(),
                Some(ProtocolSession::Legacy(self.clone())),
            )
            .await?;
        if let Some(reply) = reply {
            self.send_and_forget(reply).await?;
        }
        Ok(())
    }
}

/// Short hex form of a peer id for logs.
pub(crate) fn hex_peer(peer: &PeerId) -> String {
    hex::encode(&peer[..4])
}
