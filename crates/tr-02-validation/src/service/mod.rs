//! Concrete validators.

mod admin_response;
mod pre_transaction;
mod validator_response;

pub use admin_response::AdminResponseValidator;
pub use pre_transaction::PreTransactionValidator;
pub use validator_response::ValidatorResponseValidator;
