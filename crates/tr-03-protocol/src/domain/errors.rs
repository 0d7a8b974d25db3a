//! # Protocol Errors

use thiserror::Error;

/// Failures of the underlying mux transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The connection was destroyed.
    #[error("Connection destroyed")]
    Destroyed,

    /// The sub-channel was closed.
    #[error("Channel closed")]
    ChannelClosed,

    /// A channel with this protocol tag is already open on this end.
    #[error("Channel already open for protocol {0}")]
    ChannelInUse(&'static str),
}

/// Failures surfaced by a protocol session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Frame encoding failed: {0}")]
    Encode(String),

    #[error("Frame decoding failed: {0}")]
    Decode(String),

    /// A frame of the other protocol arrived on this channel.
    #[error("Unexpected {0} frame")]
    UnexpectedFrame(&'static str),

    /// No reply arrived within the configured reply timeout.
    #[error("Reply timed out")]
    ReplyTimeout,

    /// The pending request was dropped without a reply.
    #[error("Pending request dropped")]
    RequestDropped,

    #[error("Session closed")]
    Closed,

    #[error("Route failed: {0}")]
    Route(#[from] RouteError),
}

/// Protocol-level failures reported by a router.
///
/// Validation rejections are not errors; they produce an `Ack`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    /// Downstream consumer of accepted messages is gone.
    #[error("Accept channel closed")]
    AcceptChannelClosed,

    /// The message kind is not valid as an inbound request.
    #[error("Unexpected {0} message")]
    UnexpectedMessage(&'static str),
}
