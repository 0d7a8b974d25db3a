//! # V1 Session
//!
//! Binary frames with request correlation. Any decode or route failure on
//! the inbound side destroys the connection: after a desync the two ends can
//! no longer agree on which reply belongs to which request.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use shared_types::{NetworkMessage, PeerId};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::core::SessionCore;
use super::legacy::hex_peer;
use super::ProtocolSession;
use crate::domain::config::{SessionConfig, V1_PROTOCOL};
use crate::domain::errors::SessionError;
use crate::domain::frame::V1Frame;
use crate::ports::outbound::{ChannelFrame, MuxConnection, PendingRequests, ReplyResult, Router};

/// Session speaking the V1 binary protocol.
#[derive(Clone)]
pub struct V1Session {
    core: Arc<SessionCore>,
    pending: Arc<dyn PendingRequests>,
    /// Requests this session registered and is still waiting on.
    outstanding: Arc<Mutex<HashSet<Uuid>>>,
    config: SessionConfig,
}

impl V1Session {
    /// Open the V1 sub-channel on `connection` and start the inbound handler.
    /// Must be called within a tokio runtime.
    pub fn init(
        connection: Arc<dyn MuxConnection>,
        router: Arc<dyn Router>,
        pending: Arc<dyn PendingRequests>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let channel = connection.open_channel(V1_PROTOCOL)?;
        let session = Self {
            core: Arc::new(SessionCore::new(connection, channel.sink)),
            pending,
            outstanding: Arc::new(Mutex::new(HashSet::new())),
            config,
        };

        let handle = tokio::spawn(session.clone().read_loop(channel.inbound, router));
        session.core.set_reader(handle);

        info!(peer = %hex_peer(&session.remote_peer()), "[tr-03] V1 session opened");
        Ok(session)
    }

    pub fn remote_peer(&self) -> PeerId {
        self.core.connection.remote_peer()
    }

    /// Decode a binary frame.
    pub fn decode(&self, frame: ChannelFrame) -> Result<V1Frame, SessionError> {
        match frame {
            ChannelFrame::Binary(bytes) => V1Frame::decode(&bytes),
            other => Err(SessionError::UnexpectedFrame(other.kind())),
        }
    }

    /// Send a request and await its reply.
    ///
    /// # Errors
    /// - `Transport` if the write fails; the pending request is rejected first
    /// - `ReplyTimeout` if no reply arrives within the configured timeout
    /// - `Closed` if the session closes while waiting
    pub async fn send(&self, message: NetworkMessage) -> Result<NetworkMessage, SessionError> {
        let frame = V1Frame::request(message);
        let bytes = frame.encode()?;
        let reply = self
            .pending
            .register_pending_request(self.remote_peer(), &frame);
        self.outstanding.lock().insert(frame.id);

        let result = self.await_reply(frame.id, bytes, reply).await;
        self.outstanding.lock().remove(&frame.id);
        result
    }

    async fn await_reply(
        &self,
        request_id: Uuid,
        bytes: Vec<u8>,
        reply: oneshot::Receiver<ReplyResult>,
    ) -> Result<NetworkMessage, SessionError> {
        if let Err(e) = self.core.write(ChannelFrame::Binary(bytes)).await {
            self.pending.reject_pending_request(request_id, e.clone());
            return Err(e);
        }

        match tokio::time::timeout(self.config.reply_timeout(), reply).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(SessionError::RequestDropped),
            Err(_) => {
                self.pending
                    .reject_pending_request(request_id, SessionError::ReplyTimeout);
                Err(SessionError::ReplyTimeout)
            }
        }
    }

    pub async fn send_and_forget(&self, message: NetworkMessage) -> Result<(), SessionError> {
        let bytes = V1Frame::request(message).encode()?;
        self.core.write(ChannelFrame::Binary(bytes)).await
    }

    async fn reply(&self, request_id: Uuid, message: NetworkMessage) -> Result<(), SessionError> {
        let bytes = V1Frame::reply(request_id, message).encode()?;
        self.core.write(ChannelFrame::Binary(bytes)).await
    }

    pub fn close(&self) {
        self.shutdown();
        self.core.abort_reader();
    }

    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    fn shutdown(&self) {
        if self.core.shutdown() {
            let own: Vec<Uuid> = self.outstanding.lock().drain().collect();
            let failed = own
                .into_iter()
                .filter(|id| {
                    self.pending
                        .reject_pending_request(*id, SessionError::Closed)
                })
                .count();
            debug!(
                peer = %hex_peer(&self.remote_peer()),
                failed_requests = failed,
                "[tr-03] V1 session closed"
            );
        }
    }

    async fn read_loop(self, mut inbound: mpsc::Receiver<ChannelFrame>, router: Arc<dyn Router>) {
        while let Some(frame) = inbound.recv().await {
            if let Err(e) = self.handle_frame(frame, router.as_ref()).await {
                error!(
                    peer = %hex_peer(&self.remote_peer()),
                    error = %e,
                    "[tr-03] V1 protocol error, destroying connection"
                );
                self.core.connection.destroy(&e.to_string());
                break;
            }
        }
        self.shutdown();
    }

    async fn handle_frame(&self, frame: ChannelFrame, router: &dyn Router) -> Result<(), SessionError> {
        let frame = self.decode(frame)?;

        if let Some(request_id) = frame.in_reply_to {
            if !self.pending.complete(request_id, frame.message) {
                debug!(request_id = %request_id, "[tr-03] Late or unsolicited reply");
            }
            return Ok(());
        }

        let reply = router
            .route(
                frame.message,
                self.core.connection.clone(),
                Some(ProtocolSession::V1(self.clone())),
            )
            .await?;
        if let Some(reply) = reply {
            self.reply(frame.id, reply).await?;
        }
        Ok(())
    }
}
