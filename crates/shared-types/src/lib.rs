//! # Shared Types Crate
//!
//! Types that cross crate boundaries in the Trust-Relay node: checksum
//! addresses, operation messages and proposals, attestations, the binary
//! indexer entry codec and the external state store port.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Wire formats are defined once, here.
//! - **Total Codecs**: Binary state records never panic on malformed input.
//! - **Injected Diagnostics**: Rejections flow through a `RejectionObserver`
//!   instead of process-wide logging so callers can assert on them.

pub mod address;
pub mod attestation;
pub mod diagnostics;
pub mod entities;
pub mod errors;
pub mod hashing;
pub mod indexer_entry;
pub mod messages;
pub mod state;

pub use address::{Address, ADDRESS_PREFIX, ADDRESS_SIZE};
pub use attestation::{Attestation, AttestationResponse};
pub use diagnostics::{
    RecordingObserver, Rejection, RejectionObserver, TracingObserver, ValidationStage,
};
pub use entities::*;
pub use errors::*;
pub use messages::*;
pub use state::{InMemoryStateStore, StateStore};
