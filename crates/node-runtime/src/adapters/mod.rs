//! Node adapters: inbound routing and the development state layer.

pub mod router;
pub mod state;
