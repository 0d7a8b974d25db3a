//! Ports for the orchestrator.

pub mod outbound;
