//! Adapters for the orchestrator.

pub mod session_pool;
