//! Ports for the protocol subsystem.

pub mod outbound;
