//! Turn Orchestrator - one conversational turn over the pure core.
//!
//! Composes the phase engine and the risk calculator. No I/O; the caller
//! runs extraction, retrieval and narration around it.

use super::{
    AssistantDirective, ChatMessage, Phase, PhaseTag, PhaseTransitionEngine, ReplyMode,
    SessionState,
};
use crate::domain::foundation::ErrorCode;
use crate::domain::intake::{IncompleteIntake, Intake};
use crate::domain::retrieval::{RetrievalRequest, DEFAULT_TOP_K};
use crate::domain::risk::{RiskCalculator, RiskError};

/// Input for one turn.
#[derive(Debug, Clone)]
pub struct TurnInput<'a> {
    pub message: &'a str,
    pub history: &'a [ChatMessage],
    pub state: &'a SessionState,
}

/// Result of a successful turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub directive: AssistantDirective,
    pub next_state: SessionState,
}

/// A turn that could not complete. The caller keeps its previous state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    IncompleteIntake(#[from] IncompleteIntake),

    #[error(transparent)]
    Risk(#[from] RiskError),
}

impl TurnError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TurnError::IncompleteIntake(_) => ErrorCode::IncompleteIntake,
            TurnError::Risk(err) => err.code(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TurnOrchestrator {
    engine: PhaseTransitionEngine,
    calculator: RiskCalculator,
    top_k: usize,
}

impl Default for TurnOrchestrator {
    fn default() -> Self {
        Self::new(RiskCalculator::default())
    }
}

impl TurnOrchestrator {
    pub fn new(calculator: RiskCalculator) -> Self {
        Self {
            engine: PhaseTransitionEngine::new(),
            calculator,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Number of sources requested on a solution turn.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn calculator(&self) -> &RiskCalculator {
        &self.calculator
    }

    /// False once the intake is frozen and updates would be ignored.
    pub fn accepts_intake_updates(&self, state: &SessionState) -> bool {
        !intake_is_frozen(state)
    }

    /// Folds newly extracted values into the session.
    ///
    /// Updates are merged while measurements are still being gathered
    /// (before `Calc`); after that the intake is frozen and updates are
    /// ignored. Any structured value promotes an introducing session to
    /// `Intake`.
    pub fn accept_intake_update(&self, state: &SessionState, update: &Intake) -> SessionState {
        let mut next = state.clone();
        if intake_is_frozen(state) {
            return next;
        }

        next.intake.merge(update);
        if state.is_introducing() && update.has_structured_input() {
            next.phase = Some(Phase::Intake.into());
        }
        next
    }

    /// Runs one turn.
    ///
    /// 1. Ask the engine for the next phase
    /// 2. On arrival in `Calc`, freeze the intake and compute the verdict
    /// 3. Assemble the directive for the narrator
    ///
    /// On error nothing is returned; the input state is untouched.
    pub fn run_turn(&self, input: TurnInput<'_>) -> Result<TurnOutcome, TurnError> {
        let state = input.state;
        let next_phase = self.engine.next_phase(state, input.message);

        let mut next_state = state.clone();
        if next_phase.is(Phase::Calc) {
            let measurements = state.intake.freeze()?;
            next_state.calc = Some(self.calculator.assess(&measurements)?);
        }
        next_state.phase = Some(next_phase.clone());

        let directive = self.directive_for(next_phase, input.message, &next_state);
        Ok(TurnOutcome {
            directive,
            next_state,
        })
    }

    fn directive_for(&self, phase: PhaseTag, message: &str, state: &SessionState) -> AssistantDirective {
        let retrieval = phase.is(Phase::RetrieveSolve).then(|| {
            RetrievalRequest::for_task(message, &state.intake, state.calc.as_ref())
                .with_top_k(self.top_k)
        });

        AssistantDirective {
            mode: ReplyMode::for_phase(&phase),
            phase,
            message: message.to_string(),
            missing_fields: state.intake.missing_required_fields(),
            intake: state.intake.clone(),
            calc: state.calc.clone(),
            retrieval,
            sources: Vec::new(),
        }
    }
}

fn intake_is_frozen(state: &SessionState) -> bool {
    match &state.phase {
        Some(PhaseTag::Known(phase)) => phase.has_verdict(),
        Some(PhaseTag::Unrecognized(_)) => true,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intake::{IntakeField, TaskAction};
    use crate::domain::risk::{RiskFactor, RiskModel, LEGACY_TARGET_Z};

    fn orchestrator() -> TurnOrchestrator {
        TurnOrchestrator::default()
    }

    fn intake(initial_force: f64) -> Intake {
        Intake {
            action: Some(TaskAction::Push),
            initial_force: Some(initial_force),
            hand_height: Some(0.5),
            distance: Some(5.0),
            frequency: Some(12.0),
            ..Default::default()
        }
    }

    fn turn(state: &SessionState, message: &str) -> Result<TurnOutcome, TurnError> {
        orchestrator().run_turn(TurnInput {
            message,
            history: &[],
            state,
        })
    }

    mod intake_updates {
        use super::*;

        #[test]
        fn structured_value_promotes_intro_to_intake() {
            let update = Intake {
                action: Some(TaskAction::Pull),
                ..Default::default()
            };
            let next = orchestrator().accept_intake_update(&SessionState::new(), &update);
            assert_eq!(next.known_phase(), Some(Phase::Intake));
            assert_eq!(next.intake.action, Some(TaskAction::Pull));
        }

        #[test]
        fn empty_update_keeps_intro() {
            let state = SessionState::in_phase(Phase::Intro);
            let next = orchestrator().accept_intake_update(&state, &Intake::new());
            assert_eq!(next, state);
        }

        #[test]
        fn environment_alone_does_not_promote() {
            let mut update = Intake::new();
            update.environment.summary = Some("loading dock".to_string());
            let next = orchestrator().accept_intake_update(&SessionState::new(), &update);
            assert!(next.phase.is_none());
            assert_eq!(next.intake.environment.summary.as_deref(), Some("loading dock"));
        }

        #[test]
        fn merges_during_intake_without_phase_change() {
            let state = SessionState::in_phase(Phase::Intake).with_intake(Intake {
                action: Some(TaskAction::Push),
                ..Default::default()
            });
            let update = Intake {
                distance: Some(7.0),
                ..Default::default()
            };
            let next = orchestrator().accept_intake_update(&state, &update);
            assert_eq!(next.known_phase(), Some(Phase::Intake));
            assert_eq!(next.intake.distance, Some(7.0));
            assert_eq!(next.intake.action, Some(TaskAction::Push));
        }

        #[test]
        fn intake_is_frozen_after_calc() {
            let state = SessionState::in_phase(Phase::Interpret).with_intake(intake(15.0));
            let next = orchestrator().accept_intake_update(&state, &intake(99.0));
            assert_eq!(next.intake.initial_force, Some(15.0));
            assert!(!orchestrator().accepts_intake_updates(&state));
        }

        #[test]
        fn unrecognized_phase_freezes_intake() {
            let mut state = SessionState::new();
            state.phase = Some(PhaseTag::from("LEGACY_PHASE"));
            assert!(!orchestrator().accepts_intake_updates(&state));
            assert!(orchestrator().accepts_intake_updates(&SessionState::in_phase(Phase::ConfirmCalc)));
        }
    }

    mod turns {
        use super::*;

        #[test]
        fn first_turn_introduces() {
            let outcome = turn(&SessionState::new(), "hi").unwrap();
            assert_eq!(outcome.directive.mode, ReplyMode::Introduce);
            assert_eq!(outcome.next_state.known_phase(), Some(Phase::Intro));
            assert_eq!(outcome.directive.missing_fields.len(), 5);
        }

        #[test]
        fn incomplete_intake_asks_for_missing_fields() {
            let state = SessionState::in_phase(Phase::Intake).with_intake(Intake {
                frequency: None,
                ..intake(10.0)
            });
            let outcome = turn(&state, "it's a cart").unwrap();
            assert_eq!(outcome.directive.mode, ReplyMode::Clarify);
            assert_eq!(outcome.directive.missing_fields, vec![IntakeField::Frequency]);
            assert!(outcome.next_state.calc.is_none());
        }

        #[test]
        fn complete_intake_asks_for_confirmation() {
            let state = SessionState::in_phase(Phase::Intake).with_intake(intake(10.0));
            let outcome = turn(&state, "12 times a minute").unwrap();
            assert_eq!(outcome.next_state.known_phase(), Some(Phase::ConfirmCalc));
            assert!(outcome.directive.missing_fields.is_empty());
            assert!(outcome.next_state.calc.is_none());
        }

        #[test]
        fn calc_turn_stores_verdict() {
            let state = SessionState::in_phase(Phase::ConfirmCalc).with_intake(intake(15.0));
            let outcome = turn(&state, "yes").unwrap();

            assert_eq!(outcome.next_state.known_phase(), Some(Phase::Calc));
            let calc = outcome.next_state.calc.as_ref().unwrap();
            assert!(!calc.acceptable);
            assert_eq!(calc.top_contributor().unwrap().factor, RiskFactor::Frequency);
            assert_eq!(outcome.directive.calc.as_ref(), Some(calc));
            assert_eq!(outcome.directive.mode, ReplyMode::Chat);
        }

        #[test]
        fn later_turns_do_not_recompute() {
            let state = SessionState::in_phase(Phase::ConfirmCalc).with_intake(intake(15.0));
            let calc_state = turn(&state, "yes").unwrap().next_state;
            let interpret = turn(&calc_state, "why?").unwrap();
            assert_eq!(interpret.next_state.known_phase(), Some(Phase::Interpret));
            assert_eq!(interpret.next_state.calc, calc_state.calc);
            assert!(interpret.directive.retrieval.is_none());
        }

        #[test]
        fn solution_turn_requests_retrieval() {
            let state = SessionState::in_phase(Phase::ConfirmCalc).with_intake(intake(15.0));
            let calc_state = turn(&state, "yes").unwrap().next_state;
            let interpret_state = turn(&calc_state, "why?").unwrap().next_state;
            let outcome = orchestrator()
                .with_top_k(4)
                .run_turn(TurnInput {
                    message: "what should we change?",
                    history: &[],
                    state: &interpret_state,
                })
                .unwrap();

            assert_eq!(outcome.directive.mode, ReplyMode::RagAnswer);
            let request = outcome.directive.retrieval.as_ref().unwrap();
            assert_eq!(request.top_k, 4);
            assert!(request.question.starts_with("what should we change?"));
            assert!(request.question.contains("Frequency"));
        }

        #[test]
        fn acceptable_task_has_no_contributions() {
            let calculator = RiskCalculator::new(RiskModel::default().with_target_z(LEGACY_TARGET_Z));
            let state = SessionState::in_phase(Phase::ConfirmCalc).with_intake(intake(9.0));
            let outcome = TurnOrchestrator::new(calculator)
                .run_turn(TurnInput {
                    message: "ok",
                    history: &[],
                    state: &state,
                })
                .unwrap();
            let calc = outcome.next_state.calc.unwrap();
            assert!(calc.acceptable);
            assert!(calc.contributions.is_empty());
            assert!(calc.percent_workers_fatigued.is_none());
        }

        #[test]
        fn unrecognized_phase_chats_and_passes_through() {
            let state = SessionState {
                phase: Some(PhaseTag::from("LEGACY")),
                ..Default::default()
            };
            let outcome = turn(&state, "hello").unwrap();
            assert_eq!(outcome.directive.mode, ReplyMode::Chat);
            assert_eq!(outcome.next_state, state);
        }
    }

    mod failures {
        use super::*;

        #[test]
        fn calc_with_incomplete_intake_fails() {
            let state = SessionState::in_phase(Phase::ConfirmCalc).with_intake(Intake {
                hand_height: None,
                ..intake(15.0)
            });
            let err = turn(&state, "yes").unwrap_err();
            assert_eq!(err.code(), ErrorCode::IncompleteIntake);
        }

        #[test]
        fn calc_with_zero_frequency_fails() {
            let state = SessionState::in_phase(Phase::ConfirmCalc).with_intake(Intake {
                frequency: Some(0.0),
                ..intake(15.0)
            });
            let err = turn(&state, "yes").unwrap_err();
            assert!(matches!(err, TurnError::Risk(RiskError::InvalidInput(_))));
        }

        #[test]
        fn failed_turn_leaves_input_untouched() {
            let state = SessionState::in_phase(Phase::ConfirmCalc).with_intake(Intake {
                frequency: Some(-1.0),
                ..intake(15.0)
            });
            let before = state.clone();
            assert!(turn(&state, "yes").is_err());
            assert_eq!(state, before);
        }
    }

    #[test]
    fn identical_turns_are_reproducible() {
        let state = SessionState::in_phase(Phase::ConfirmCalc).with_intake(intake(15.0));
        let history = [ChatMessage::user("push"), ChatMessage::assistant("how far?")];
        let input = TurnInput {
            message: "yes",
            history: &history,
            state: &state,
        };
        assert_eq!(
            orchestrator().run_turn(input.clone()).unwrap(),
            orchestrator().run_turn(input).unwrap()
        );
    }
}
