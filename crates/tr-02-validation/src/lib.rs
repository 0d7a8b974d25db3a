//! # Validation Subsystem (TR-02)
//!
//! Decides whether inbound proposals and attestations may influence local
//! state.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): structural schema, pipeline stages shared by
//!   the attestation validators, configuration
//! - **Ports Layer** (`ports/`): the `MessageValidator` API
//! - **Service Layer** (`service/`): the concrete validators
//!
//! ## Pipelines
//!
//! | Validator | Stages |
//! |-----------|--------|
//! | `PreTransactionValidator` | shape, issuer key, hash integrity, signature, validator address, uniqueness |
//! | `AdminResponseValidator` | payload, issuer, timestamp, admin entry, admin signature, channel |
//! | `ValidatorResponseValidator` | payload, issuer, timestamp, node entry, writing key, signature, channel |
//!
//! Every stage short-circuits. Rejections are reported to the injected
//! `RejectionObserver` and surface as `false`; validation never errors.

pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use domain::pipeline::AttestationPipeline;
pub use domain::value_objects::{AttestationConfig, AttestationKind, StageFailure, StageResult};
pub use ports::inbound::MessageValidator;
pub use service::{AdminResponseValidator, PreTransactionValidator, ValidatorResponseValidator};
