//! Phase transition engine.
//!
//! Decides the next phase from the session state alone. The latest message
//! is accepted for interface stability but no transition reads it.

use super::{Phase, PhaseTag, SessionState};
use crate::domain::foundation::StateMachine;
use crate::domain::intake::missing_required_fields;

/// Total, deterministic transition function over the conversation phases.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseTransitionEngine;

impl PhaseTransitionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Determines the next phase.
    ///
    /// - No phase → `Intro`
    /// - `Intro` stays put; advancing to `Intake` is the caller's decision
    /// - `Intake` loops until every required field is present
    /// - `ConfirmCalc`, `Calc`, `Interpret` advance unconditionally
    /// - `RetrieveSolve` and unrecognized phases pass through
    pub fn next_phase(&self, state: &SessionState, _latest_message: &str) -> PhaseTag {
        let current = match &state.phase {
            None => return Phase::Intro.into(),
            Some(PhaseTag::Unrecognized(raw)) => return PhaseTag::Unrecognized(raw.clone()),
            Some(PhaseTag::Known(phase)) => *phase,
        };

        let next = match current {
            Phase::Intro => Phase::Intro,
            Phase::Intake => self.transition_from_intake(state),
            Phase::ConfirmCalc => Phase::Calc,
            Phase::Calc => Phase::Interpret,
            Phase::Interpret => Phase::RetrieveSolve,
            Phase::RetrieveSolve => Phase::RetrieveSolve,
        };
        if next == current {
            return current.into();
        }
        // Anything the phase table does not allow keeps the current phase.
        current.transition_to(next).unwrap_or(current).into()
    }

    fn transition_from_intake(&self, state: &SessionState) -> Phase {
        if missing_required_fields(&state.intake).is_empty() {
            Phase::ConfirmCalc
        } else {
            Phase::Intake
        }
    }
}
