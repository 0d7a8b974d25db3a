//! Domain layer for validation.

pub mod pipeline;
pub mod schema;
pub mod value_objects;
