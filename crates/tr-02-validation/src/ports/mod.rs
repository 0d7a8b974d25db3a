//! Ports for the validation subsystem.

pub mod inbound;
