//! # Trust-Relay Node Runtime
//!
//! Wires the subsystems into a running node.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and the `NodeRuntime`
//! - `adapters/` - the validation router and the development state applier
//! - `logging` - tracing subscriber setup
//!
//! ## Message Flow
//!
//! ```text
//! peer ──session──→ ValidationRouter ──accepted──→ StateApplier ──→ state
//!                        │                                          ↑
//!                        └── Ack { accepted } ──→ peer              │
//!                                                                   │
//! broadcast(op) ──→ MessageOrchestrator ──→ SessionPool ──→ validator
//!                        └────────── polls for tx hash ─────────────┘
//! ```

pub mod adapters;
pub mod container;
pub mod logging;

pub use adapters::router::{Accepted, ValidationRouter};
pub use adapters::state::StateApplier;
pub use container::{ConfigError, NodeConfig, NodeError, NodeRuntime, ProtocolKind};
