//! # Protocol Sessions
//!
//! One session wraps one sub-channel of one connection. Both variants share
//! the same capability set and are dispatched through [`ProtocolSession`].

mod core;
mod legacy;
mod v1;

pub use legacy::LegacySession;
pub use v1::V1Session;

use shared_types::{NetworkMessage, PeerId};

use crate::domain::errors::SessionError;
use crate::ports::outbound::ChannelFrame;

/// A live protocol session of either variant.
#[derive(Clone)]
pub enum ProtocolSession {
    V1(V1Session),
    Legacy(LegacySession),
}

impl ProtocolSession {
    /// Channel tag of the underlying sub-channel.
    pub fn protocol(&self) -> &'static str {
        match self {
            ProtocolSession::V1(_) => crate::domain::config::V1_PROTOCOL,
            ProtocolSession::Legacy(_) => crate::domain::config::LEGACY_PROTOCOL,
        }
    }

    pub fn remote_peer(&self) -> PeerId {
        match self {
            ProtocolSession::V1(session) => session.remote_peer(),
            ProtocolSession::Legacy(session) => session.remote_peer(),
        }
    }

    /// Decode an inbound frame into a message.
    pub fn decode(&self, frame: ChannelFrame) -> Result<NetworkMessage, SessionError> {
        match self {
            ProtocolSession::V1(session) => session.decode(frame).map(|f| f.message),
            ProtocolSession::Legacy(session) => session.decode(frame),
        }
    }

    /// Send and, for V1, await the reply. Legacy always resolves to `None`.
    pub async fn send(
        &self,
        message: NetworkMessage,
    ) -> Result<Option<NetworkMessage>, SessionError> {
        match self {
            ProtocolSession::V1(session) => session.send(message).await.map(Some),
            ProtocolSession::Legacy(session) => session.send(message).await,
        }
    }

    /// Send without waiting for a reply.
    pub async fn send_and_forget(&self, message: NetworkMessage) -> Result<(), SessionError> {
        match self {
            ProtocolSession::V1(session) => session.send_and_forget(message).await,
            ProtocolSession::Legacy(session) => session.send_and_forget(message).await,
        }
    }

    /// Close the session. Idempotent.
    pub fn close(&self) {
        match self {
            ProtocolSession::V1(session) => session.close(),
            ProtocolSession::Legacy(session) => session.close(),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            ProtocolSession::V1(session) => session.is_closed(),
            ProtocolSession::Legacy(session) => session.is_closed(),
        }
    }
}

impl std::fmt::Debug for ProtocolSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolSession")
            .field("protocol", &self.protocol())
            .field("closed", &self.is_closed())
            .finish()
    }
}
