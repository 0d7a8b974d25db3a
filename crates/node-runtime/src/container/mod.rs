//! Configuration and the runtime container.

pub mod config;
pub mod node;

pub use config::{ConfigError, KeyConfig, NodeConfig, RuntimeConfig};
pub use node::{NodeError, NodeRuntime, ProtocolKind};
