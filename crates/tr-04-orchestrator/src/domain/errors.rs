//! Validator pool errors.

use thiserror::Error;
use tr_03_protocol::SessionError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PoolError {
    /// The validator is not (or no longer) in the pool.
    #[error("Unknown validator {0}")]
    UnknownValidator(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}
