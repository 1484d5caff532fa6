//! Session state - the unit of conversational memory.
//!
//! Passed in and returned by value on every turn. Callers persist it however
//! they like; the core never holds on to it.

use serde::{Deserialize, Serialize};

use super::{Phase, PhaseTag};
use crate::domain::intake::Intake;
use crate::domain::risk::RiskResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    /// Absent before the first turn.
    pub phase: Option<PhaseTag>,
    pub intake: Intake,
    /// Last computed verdict.
    pub calc: Option<RiskResult>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_phase(phase: Phase) -> Self {
        Self {
            phase: Some(phase.into()),
            ..Self::default()
        }
    }

    pub fn with_intake(mut self, intake: Intake) -> Self {
        self.intake = intake;
        self
    }

    /// The phase if it is one the engine knows.
    pub fn known_phase(&self) -> Option<Phase> {
        self.phase.as_ref().and_then(PhaseTag::known)
    }

    /// True before the first turn and while still in `Intro`.
    pub fn is_introducing(&self) -> bool {
        match &self.phase {
            None => true,
            Some(tag) => tag.is(Phase::Intro),
        }
    }
}
