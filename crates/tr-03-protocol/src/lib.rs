//! # Protocol Subsystem (TR-03)
//!
//! Wire protocol sessions over a multiplexed peer connection.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): V1 frame codec, pending-request store,
//!   configuration and errors
//! - **Ports Layer** (`ports/`): the mux transport, router and pending-request
//!   contracts
//! - **Session Layer** (`session/`): `ProtocolSession` and its two variants
//! - **Adapters Layer** (`adapters/`): in-memory mux transport
//!
//! ## Protocols
//!
//! | Variant | Channel tag | Frames | On route failure |
//! |---------|-------------|--------|------------------|
//! | `LegacySession` | `tr/legacy/json` | structured messages | log, keep connection |
//! | `V1Session` | `tr/v1/binary` | bincode `V1Frame` | log, destroy connection |
//!
//! Legacy `send` never correlates and resolves to `None`. V1 `send` registers
//! a pending request and awaits the reply frame.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod session;

pub use adapters::memory::{memory_pair, MemoryConnection};
pub use domain::config::{SessionConfig, LEGACY_PROTOCOL, V1_PROTOCOL};
pub use domain::errors::{RouteError, SessionError, TransportError};
pub use domain::frame::{V1Frame, MAX_FRAME_SIZE};
pub use domain::pending::{PendingRequestStore, PendingStats};
pub use ports::outbound::{
    ChannelFrame, ChannelSink, MuxChannel, MuxConnection, PendingRequests, ReplyResult, Router,
};
pub use session::{LegacySession, ProtocolSession, V1Session};
