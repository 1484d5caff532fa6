//! State machine trait for phase enums.
//!
//! Provides a consistent interface for validating forward transitions
//! of the guided-intake conversation.

use super::ValidationError;

/// Trait for enums that represent state machines.
///
/// Implementors define valid state transitions and get validated
/// transition methods for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for Phase {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Intro, Intake) | (Intake, ConfirmCalc))
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Intro => vec![Intake],
///             // ... etc
///         }
///     }
/// }
///
/// let next = Phase::Intro.transition_to(Phase::Intake)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
