//! # Ports Layer
//!
//! - **Outbound (Driven)**: the external wallet a provider may delegate to

pub mod outbound;
