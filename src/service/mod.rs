//! Query predicates, response assembly and request validation shared by the handlers.

pub mod assembly;
pub mod query;
mod validation;
pub use validation::Validate;
