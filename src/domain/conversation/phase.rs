//! Conversation phases.
//!
//! Phases decide what the assistant does on a turn. They advance in a fixed
//! order; `Intake` loops until every required field is collected and
//! `RetrieveSolve` absorbs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Stage of the guided-intake conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Greeting; waits for the first structured input.
    #[default]
    Intro,

    /// Collecting the required measurements.
    Intake,

    /// All measurements present; the next turn computes.
    ConfirmCalc,

    /// Risk has been computed on this turn.
    Calc,

    /// Explaining the verdict.
    Interpret,

    /// Recommending solutions from retrieved sources.
    RetrieveSolve,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Intro,
        Phase::Intake,
        Phase::ConfirmCalc,
        Phase::Calc,
        Phase::Interpret,
        Phase::RetrieveSolve,
    ];

    /// Wire name, e.g. `CONFIRM_CALC`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intro => "INTRO",
            Self::Intake => "INTAKE",
            Self::ConfirmCalc => "CONFIRM_CALC",
            Self::Calc => "CALC",
            Self::Interpret => "INTERPRET",
            Self::RetrieveSolve => "RETRIEVE_SOLVE",
        }
    }

    /// Returns true if the risk verdict is available in this phase.
    pub fn has_verdict(&self) -> bool {
        matches!(self, Self::Calc | Self::Interpret | Self::RetrieveSolve)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("phase", format!("unknown phase '{}'", s)))
    }
}

impl StateMachine for Phase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use Phase::*;
        matches!(
            (self, target),
            (Intro, Intake)
                | (Intake, Intake)
                | (Intake, ConfirmCalc)
                | (ConfirmCalc, Calc)
                | (Calc, Interpret)
                | (Interpret, RetrieveSolve)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use Phase::*;
        match self {
            Intro => vec![Intake],
            Intake => vec![Intake, ConfirmCalc],
            ConfirmCalc => vec![Calc],
            Calc => vec![Interpret],
            Interpret => vec![RetrieveSolve],
            RetrieveSolve => vec![],
        }
    }
}

/// A phase as stored in session state.
///
/// Values written by other clients may not name a known phase. They are kept
/// verbatim so the engine can pass them through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PhaseTag {
    Known(Phase),
    Unrecognized(String),
}

impl PhaseTag {
    pub fn known(&self) -> Option<Phase> {
        match self {
            PhaseTag::Known(phase) => Some(*phase),
            PhaseTag::Unrecognized(_) => None,
        }
    }

    pub fn is(&self, phase: Phase) -> bool {
        self.known() == Some(phase)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PhaseTag::Known(phase) => phase.as_str(),
            PhaseTag::Unrecognized(raw) => raw,
        }
    }
}

impl From<Phase> for PhaseTag {
    fn from(phase: Phase) -> Self {
        PhaseTag::Known(phase)
    }
}

impl From<String> for PhaseTag {
    fn from(raw: String) -> Self {
        match raw.parse::<Phase>() {
            Ok(phase) => PhaseTag::Known(phase),
            Err(_) => PhaseTag::Unrecognized(raw),
        }
    }
}

impl From<&str> for PhaseTag {
    fn from(raw: &str) -> Self {
        PhaseTag::from(raw.to_string())
    }
}

impl From<PhaseTag> for String {
    fn from(tag: PhaseTag) -> Self {
        match tag {
            PhaseTag::Known(phase) => phase.as_str().to_string(),
            PhaseTag::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for PhaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod phase_basics {
        use super::*;

        #[test]
        fn default_phase_is_intro() {
            assert_eq!(Phase::default(), Phase::Intro);
        }

        #[test]
        fn serializes_to_screaming_snake_case() {
            let json = serde_json::to_string(&Phase::ConfirmCalc).unwrap();
            assert_eq!(json, "\"CONFIRM_CALC\"");
        }

        #[test]
        fn wire_names_round_trip_through_from_str() {
            for phase in Phase::ALL {
                assert_eq!(phase.as_str().parse::<Phase>().unwrap(), phase);
            }
        }

        #[test]
        fn parsing_is_case_sensitive() {
            assert!("intake".parse::<Phase>().is_err());
        }

        #[test]
        fn verdict_available_from_calc_onwards() {
            assert!(!Phase::ConfirmCalc.has_verdict());
            assert!(Phase::Calc.has_verdict());
            assert!(Phase::RetrieveSolve.has_verdict());
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn intake_loops_or_advances() {
            assert!(Phase::Intake.can_transition_to(&Phase::Intake));
            assert!(Phase::Intake.can_transition_to(&Phase::ConfirmCalc));
            assert!(!Phase::Intake.can_transition_to(&Phase::Calc));
        }

        #[test]
        fn no_backward_transitions() {
            for (i, from) in Phase::ALL.iter().enumerate() {
                for to in &Phase::ALL[..i] {
                    assert!(!from.can_transition_to(to), "{} -> {}", from, to);
                }
            }
        }

        #[test]
        fn retrieve_solve_is_terminal() {
            assert!(Phase::RetrieveSolve.is_terminal());
            assert!(!Phase::Interpret.is_terminal());
        }

        #[test]
        fn valid_transitions_agree_with_can_transition() {
            for from in Phase::ALL {
                for to in Phase::ALL {
                    assert_eq!(
                        from.can_transition_to(&to),
                        from.valid_transitions().contains(&to)
                    );
                }
            }
        }

        #[test]
        fn invalid_transition_errors() {
            assert!(Phase::Calc.transition_to(Phase::Intake).is_err());
            assert_eq!(Phase::Calc.transition_to(Phase::Interpret).unwrap(), Phase::Interpret);
        }
    }

    mod tags {
        use super::*;

        #[test]
        fn known_tag_deserializes_to_phase() {
            let tag: PhaseTag = serde_json::from_str("\"INTERPRET\"").unwrap();
            assert_eq!(tag, PhaseTag::Known(Phase::Interpret));
        }

        #[test]
        fn unknown_tag_is_kept_verbatim() {
            let tag: PhaseTag = serde_json::from_str("\"SMALL_TALK\"").unwrap();
            assert_eq!(tag, PhaseTag::Unrecognized("SMALL_TALK".to_string()));
            assert_eq!(serde_json::to_string(&tag).unwrap(), "\"SMALL_TALK\"");
            assert!(tag.known().is_none());
        }

        #[test]
        fn known_tag_serializes_to_wire_name() {
            let tag = PhaseTag::from(Phase::RetrieveSolve);
            assert_eq!(serde_json::to_string(&tag).unwrap(), "\"RETRIEVE_SOLVE\"");
            assert!(tag.is(Phase::RetrieveSolve));
        }
    }
}
