//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, error types and the state machine trait
//! that form the vocabulary of the intake domain.

mod errors;
mod percentage;
mod state_machine;

pub use errors::{ErrorCode, ValidationError};
pub use percentage::Percentage;
pub use state_machine::StateMachine;
