//! # Orchestrator Subsystem (TR-04)
//!
//! Delivers an operation to *some* validator and reports whether it was
//! observed in state before the overall deadline.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): configuration and pool errors
//! - **Ports Layer** (`ports/`): the `ValidatorPool` contract
//! - **Service Layer** (`service.rs`): `MessageOrchestrator`
//! - **Adapters Layer** (`adapters/`): `SessionPool` over protocol sessions
//!
//! ## Delivery Loop
//!
//! ```text
//! while elapsed < response_timeout:
//!     pick a random validator (none → false)
//!     repeat max_retries times:
//!         send, then poll state for the tx hash until attempt_timeout
//!         confirmed → bump sent count, rotate out at max_sent_count → true
//!     evict the validator
//! false
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::session_pool::SessionPool;
pub use domain::config::OrchestratorConfig;
pub use domain::errors::PoolError;
pub use ports::outbound::ValidatorPool;
pub use service::MessageOrchestrator;
