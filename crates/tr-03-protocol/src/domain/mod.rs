//! Domain layer for protocol sessions.

pub mod config;
pub mod errors;
pub mod frame;
pub mod pending;
