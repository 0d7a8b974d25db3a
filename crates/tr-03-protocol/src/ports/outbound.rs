//! # Outbound Ports
//!
//! Collaborators a protocol session depends on: the mux transport, the router
//! that handles inbound messages, and the pending-request service V1 uses to
//! correlate replies.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{NetworkMessage, PeerId};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::domain::errors::{RouteError, SessionError, TransportError};
use crate::domain::frame::V1Frame;
use crate::session::ProtocolSession;

// =============================================================================
// MUX TRANSPORT
// =============================================================================

/// One unit of data on a sub-channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelFrame {
    /// Self-describing structured message.
    Structured(NetworkMessage),
    /// Opaque encoded bytes.
    Binary(Vec<u8>),
}

impl ChannelFrame {
    pub fn kind(&self) -> &'static str {
        match self {
            ChannelFrame::Structured(_) => "structured",
            ChannelFrame::Binary(_) => "binary",
        }
    }
}

/// Write half of a sub-channel.
#[async_trait]
pub trait ChannelSink: Send + Sync {
    async fn send(&self, frame: ChannelFrame) -> Result<(), TransportError>;

    /// Close the write half. Idempotent.
    fn close(&self);
}

/// A freshly opened sub-channel. `inbound` is the single inbound handler's
/// source.
pub struct MuxChannel {
    pub sink: Arc<dyn ChannelSink>,
    pub inbound: mpsc::Receiver<ChannelFrame>,
}

/// A multiplexed connection to one peer.
pub trait MuxConnection: Send + Sync {
    /// Public key of the remote peer.
    fn remote_peer(&self) -> PeerId;

    /// Open the sub-channel tagged `protocol`.
    fn open_channel(&self, protocol: &'static str) -> Result<MuxChannel, TransportError>;

    /// Tear the connection down. Idempotent.
    fn destroy(&self, reason: &str);

    fn is_destroyed(&self) -> bool;
}

// =============================================================================
// ROUTER
// =============================================================================

/// Handles inbound messages decoded by a session.
#[async_trait]
pub trait Router: Send + Sync {
    /// Route `message`. A returned reply is sent back over `session`.
    ///
    /// # Errors
    /// Only protocol-level failures. Rejected content yields a reply, not an
    /// error.
    async fn route(
        &self,
        message: NetworkMessage,
        connection: Arc<dyn MuxConnection>,
        session: Option<ProtocolSession>,
    ) -> Result<Option<NetworkMessage>, RouteError>;
}

// =============================================================================
// PENDING REQUESTS
// =============================================================================

/// What a pending V1 request resolves to.
pub type ReplyResult = Result<NetworkMessage, SessionError>;

/// Correlates V1 requests with their replies.
pub trait PendingRequests: Send + Sync {
    /// Register `frame` as awaiting a reply from `peer`.
    fn register_pending_request(
        &self,
        peer: PeerId,
        frame: &V1Frame,
    ) -> oneshot::Receiver<ReplyResult>;

    /// Resolve a pending request with its reply. Returns `false` if unknown.
    fn complete(&self, request_id: Uuid, reply: NetworkMessage) -> bool;

    /// Fail a pending request. Returns `false` if unknown.
    fn reject_pending_request(&self, request_id: Uuid, error: SessionError) -> bool;
}
