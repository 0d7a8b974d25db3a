//! Domain layer for the orchestrator.

pub mod config;
pub mod errors;
