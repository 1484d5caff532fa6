//! HandleTurn command handler.
//!
//! Runs one chat turn end to end: extraction, the pure core turn,
//! retrieval for solution turns, then narration. A failed turn returns an
//! error and no state; the caller keeps the state it sent.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::conversation::{
    ChatMessage, PhaseTag, ReplyMode, SessionState, TurnError, TurnInput, TurnOrchestrator,
};
use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::domain::intake::{Intake, IntakeBounds, IntakeForm};
use crate::domain::retrieval::RetrievedSource;
use crate::ports::{
    ExtractionError, IntakeExtractor, NarrativeError, NarrativeGenerator, RetrievalError,
    SolutionRetriever,
};

/// Command for one conversational turn.
#[derive(Debug, Clone, Default)]
pub struct HandleTurnCommand {
    pub message: String,
    pub history: Vec<ChatMessage>,
    pub state: SessionState,
    /// Values typed into the intake form, applied after extraction.
    pub form: Option<IntakeForm>,
    /// Overrides the number of sources fetched on a solution turn.
    pub top_k: Option<usize>,
    /// Metadata filter for retrieval.
    pub filter: Option<Value>,
}

impl HandleTurnCommand {
    pub fn new(message: impl Into<String>, state: SessionState) -> Self {
        Self {
            message: message.into(),
            state,
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_form(mut self, form: IntakeForm) -> Self {
        self.form = Some(form);
        self
    }
}

/// Result of a successful turn.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleTurnResult {
    pub turn_id: Uuid,
    pub phase: PhaseTag,
    pub mode: ReplyMode,
    pub assistant_message: String,
    pub state: SessionState,
    pub sources: Vec<RetrievedSource>,
}

/// Errors that can occur while handling a turn.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HandleTurnError {
    #[error("message (string) is required")]
    EmptyMessage,

    #[error("Invalid intake form: {0}")]
    InvalidForm(ValidationError),

    #[error("Invalid session intake: {0}")]
    InvalidState(ValidationError),

    #[error("Intake extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Narration failed: {0}")]
    Narrative(#[from] NarrativeError),
}

impl HandleTurnError {
    pub fn code(&self) -> ErrorCode {
        match self {
            HandleTurnError::EmptyMessage => ErrorCode::MissingField,
            HandleTurnError::InvalidForm(err) | HandleTurnError::InvalidState(err) => err.code(),
            HandleTurnError::Extraction(err) => err.code(),
            HandleTurnError::Turn(err) => err.code(),
            HandleTurnError::Retrieval(err) => err.code(),
            HandleTurnError::Narrative(err) => err.code(),
        }
    }
}

/// Handler for HandleTurn commands.
#[derive(Clone)]
pub struct HandleTurnHandler {
    extractor: Arc<dyn IntakeExtractor>,
    retriever: Arc<dyn SolutionRetriever>,
    narrator: Arc<dyn NarrativeGenerator>,
    orchestrator: TurnOrchestrator,
    bounds: IntakeBounds,
}

impl HandleTurnHandler {
    pub fn new(
        extractor: Arc<dyn IntakeExtractor>,
        retriever: Arc<dyn SolutionRetriever>,
        narrator: Arc<dyn NarrativeGenerator>,
    ) -> Self {
        Self {
            extractor,
            retriever,
            narrator,
            orchestrator: TurnOrchestrator::default(),
            bounds: IntakeBounds::default(),
        }
    }

    pub fn with_orchestrator(mut self, orchestrator: TurnOrchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    pub fn with_bounds(mut self, bounds: IntakeBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub async fn handle(&self, cmd: HandleTurnCommand) -> Result<HandleTurnResult, HandleTurnError> {
        let turn_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "turn",
            %turn_id,
            phase = cmd.state.phase.as_ref().map(PhaseTag::as_str).unwrap_or("-")
        );

        let result = self.run(turn_id, cmd).instrument(span.clone()).await;
        span.in_scope(|| match &result {
            Ok(done) => tracing::info!(next_phase = %done.phase, mode = %done.mode, "Turn completed"),
            Err(err) => tracing::warn!(code = ?err.code(), error = %err, "Turn failed"),
        });
        result
    }

    async fn run(&self, turn_id: Uuid, cmd: HandleTurnCommand) -> Result<HandleTurnResult, HandleTurnError> {
        let message = cmd.message.trim();
        if message.is_empty() {
            return Err(HandleTurnError::EmptyMessage);
        }

        // Client-held intake and form values are checked before any model call.
        self.bounds
            .validate(&cmd.state.intake)
            .map_err(HandleTurnError::InvalidState)?;
        let form_intake = cmd.form.map(|form| self.validate_form(form)).transpose()?;

        let mut state = cmd.state;
        if self.orchestrator.accepts_intake_updates(&state) {
            let extracted = self.extractor.extract(message, &cmd.history).await?;
            state = self.orchestrator.accept_intake_update(&state, &extracted);
            if let Some(form_intake) = &form_intake {
                state = self.orchestrator.accept_intake_update(&state, form_intake);
            }
            tracing::debug!(
                missing = state.intake.missing_required_fields().len(),
                "Intake merged"
            );
        }

        let outcome = self.orchestrator.run_turn(TurnInput {
            message,
            history: &cmd.history,
            state: &state,
        })?;

        let mut directive = outcome.directive;
        if let Some(mut request) = directive.retrieval.clone() {
            if let Some(top_k) = cmd.top_k {
                request.top_k = top_k;
            }
            if let Some(filter) = cmd.filter {
                request.filter = Some(filter);
            }
            let sources = self.retriever.retrieve(&request).await?;
            tracing::debug!(count = sources.len(), "Attached retrieved sources");
            directive = directive.with_sources(sources);
        }

        let assistant_message = self.narrator.narrate(&directive, &cmd.history).await?;

        Ok(HandleTurnResult {
            turn_id,
            phase: directive.phase,
            mode: directive.mode,
            assistant_message,
            state: outcome.next_state,
            sources: directive.sources,
        })
    }

    fn validate_form(&self, form: IntakeForm) -> Result<Intake, HandleTurnError> {
        let intake = form.into_intake().map_err(HandleTurnError::InvalidForm)?;
        self.bounds
            .validate(&intake)
            .map_err(HandleTurnError::InvalidForm)?;
        Ok(intake)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::narrative::{ScriptedIntakeExtractor, TemplateNarrator};
    use crate::adapters::retrieval::StaticRetriever;
    use crate::domain::conversation::Phase;
    use crate::domain::intake::{NumericInput, TaskAction};
    use crate::domain::retrieval::SourceMetadata;
    use crate::ports::AIError;

    fn complete_intake(initial_force: f64) -> Intake {
        Intake {
            action: Some(TaskAction::Push),
            initial_force: Some(initial_force),
            hand_height: Some(0.5),
            distance: Some(5.0),
            frequency: Some(12.0),
            ..Default::default()
        }
    }

    fn handler(extractor: ScriptedIntakeExtractor, retriever: StaticRetriever) -> HandleTurnHandler {
        HandleTurnHandler::new(
            Arc::new(extractor),
            Arc::new(retriever),
            Arc::new(TemplateNarrator::new()),
        )
    }

    mod validation {
        use super::*;

        #[tokio::test]
        async fn blank_message_is_rejected() {
            let h = handler(ScriptedIntakeExtractor::new(), StaticRetriever::new());
            let err = h
                .handle(HandleTurnCommand::new("   ", SessionState::new()))
                .await
                .unwrap_err();
            assert_eq!(err, HandleTurnError::EmptyMessage);
            assert_eq!(err.code(), ErrorCode::MissingField);
        }

        #[tokio::test]
        async fn out_of_range_form_value_is_rejected_before_extraction() {
            let extractor = ScriptedIntakeExtractor::new();
            let h = handler(extractor.clone(), StaticRetriever::new());
            let form = IntakeForm {
                hand_height: Some(NumericInput::Text("9".into())),
                ..Default::default()
            };

            let err = h
                .handle(HandleTurnCommand::new("here", SessionState::new()).with_form(form))
                .await
                .unwrap_err();

            assert!(matches!(err, HandleTurnError::InvalidForm(_)));
            assert_eq!(err.code(), ErrorCode::OutOfRange);
            assert!(extractor.messages().is_empty());
        }

        #[tokio::test]
        async fn out_of_range_session_intake_is_rejected_before_calculation() {
            let extractor = ScriptedIntakeExtractor::new();
            let h = handler(extractor.clone(), StaticRetriever::new());
            let intake = Intake {
                hand_height: Some(10.0),
                distance: Some(5000.0),
                ..complete_intake(15.0)
            };
            let state = SessionState::in_phase(Phase::ConfirmCalc).with_intake(intake);

            let err = h.handle(HandleTurnCommand::new("yes", state)).await.unwrap_err();

            assert!(matches!(
                &err,
                HandleTurnError::InvalidState(ValidationError::OutOfRange { field, .. }) if field == "handHeight"
            ));
            assert_eq!(err.code(), ErrorCode::OutOfRange);
            assert!(extractor.messages().is_empty());
        }

        #[tokio::test]
        async fn non_positive_session_force_is_rejected() {
            let h = handler(ScriptedIntakeExtractor::new(), StaticRetriever::new());
            let state = SessionState::in_phase(Phase::ConfirmCalc).with_intake(complete_intake(-3.0));

            let err = h.handle(HandleTurnCommand::new("yes", state)).await.unwrap_err();

            assert!(matches!(err, HandleTurnError::InvalidState(ValidationError::NotPositive { .. })));
        }
    }

    mod phases {
        use super::*;

        #[tokio::test]
        async fn first_message_without_values_introduces() {
            let h = handler(ScriptedIntakeExtractor::new(), StaticRetriever::new());
            let result = h
                .handle(HandleTurnCommand::new("hi", SessionState::new()))
                .await
                .unwrap();

            assert_eq!(result.phase, PhaseTag::from(Phase::Intro));
            assert_eq!(result.mode, ReplyMode::Introduce);
            assert!(result.assistant_message.starts_with("Hi, I'm Ergo."));
        }

        #[tokio::test]
        async fn extracted_values_promote_to_intake_and_ask_for_the_rest() {
            let extractor = ScriptedIntakeExtractor::new().with_intake(Intake {
                action: Some(TaskAction::Pull),
                ..Default::default()
            });
            let h = handler(extractor, StaticRetriever::new());

            let result = h
                .handle(HandleTurnCommand::new("I pull a cart", SessionState::new()))
                .await
                .unwrap();

            assert_eq!(result.state.known_phase(), Some(Phase::Intake));
            assert_eq!(result.mode, ReplyMode::Clarify);
            assert_eq!(
                result.assistant_message,
                "I still need: initialForce, handHeight, distance, frequency."
            );
        }

        #[tokio::test]
        async fn form_values_complete_the_intake() {
            let extractor = ScriptedIntakeExtractor::new().with_intake(Intake {
                action: Some(TaskAction::Push),
                ..Default::default()
            });
            let h = handler(extractor, StaticRetriever::new());
            let form = IntakeForm {
                initial_force: Some(NumericInput::Text("15".into())),
                hand_height: Some(NumericInput::Number(0.5)),
                distance: Some(NumericInput::Text("5".into())),
                frequency: Some(NumericInput::Number(12.0)),
                ..Default::default()
            };
            let state = SessionState::in_phase(Phase::Intake);

            let result = h
                .handle(HandleTurnCommand::new("done", state).with_form(form))
                .await
                .unwrap();

            assert_eq!(result.state.known_phase(), Some(Phase::ConfirmCalc));
            assert_eq!(result.state.intake, complete_intake(15.0));
        }

        #[tokio::test]
        async fn confirmation_computes_the_verdict() {
            let extractor = ScriptedIntakeExtractor::new();
            let h = handler(extractor, StaticRetriever::new());
            let state = SessionState::in_phase(Phase::ConfirmCalc).with_intake(complete_intake(15.0));

            let result = h.handle(HandleTurnCommand::new("yes", state)).await.unwrap();

            assert_eq!(result.state.known_phase(), Some(Phase::Calc));
            let calc = result.state.calc.as_ref().unwrap();
            assert!(!calc.acceptable);
            assert!(result.assistant_message.contains("Frequency"));
        }

        #[tokio::test]
        async fn solution_turn_retrieves_and_skips_extraction() {
            let extractor = ScriptedIntakeExtractor::new();
            let retriever = StaticRetriever::new();
            retriever
                .insert("Use a powered tug.", SourceMetadata::default())
                .await;
            let h = handler(extractor.clone(), retriever);

            let calc = TurnOrchestrator::default()
                .calculator()
                .assess(&complete_intake(15.0).freeze().unwrap())
                .unwrap();
            let mut state = SessionState::in_phase(Phase::Interpret).with_intake(complete_intake(15.0));
            state.calc = Some(calc);

            let mut cmd = HandleTurnCommand::new("how do I fix it?", state);
            cmd.top_k = Some(1);
            let result = h.handle(cmd).await.unwrap();

            assert_eq!(result.mode, ReplyMode::RagAnswer);
            assert_eq!(result.sources.len(), 1);
            assert_eq!(result.assistant_message, "Suggested solutions: [SOURCE 1]");
            assert!(extractor.messages().is_empty());
        }
    }

    mod failures {
        use super::*;

        #[tokio::test]
        async fn extraction_failure_fails_the_turn() {
            let extractor = ScriptedIntakeExtractor::new()
                .with_error(ExtractionError::Model(AIError::AuthenticationFailed));
            let h = handler(extractor, StaticRetriever::new());

            let err = h
                .handle(HandleTurnCommand::new("hi", SessionState::new()))
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::AIProviderError);
        }

        #[tokio::test]
        async fn retrieval_failure_fails_the_turn() {
            let retriever = StaticRetriever::new().with_failure(RetrievalError::Network("down".into()));
            let h = handler(ScriptedIntakeExtractor::new(), retriever);
            let state = SessionState::in_phase(Phase::RetrieveSolve).with_intake(complete_intake(15.0));

            let err = h.handle(HandleTurnCommand::new("more", state)).await.unwrap_err();
            assert_eq!(err, HandleTurnError::Retrieval(RetrievalError::Network("down".into())));
            assert_eq!(err.code(), ErrorCode::RetrievalError);
        }
    }
}
