//! Assistant directives - structured instructions for the narrator.
//!
//! The orchestrator never writes user-facing text. It hands the narrator a
//! directive carrying the phase and the data that phase talks about.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Phase, PhaseTag};
use crate::domain::intake::{Intake, IntakeField};
use crate::domain::retrieval::{RetrievalRequest, RetrievedSource};
use crate::domain::risk::RiskResult;

/// Which kind of reply the turn produces. Informative only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyMode {
    Introduce,
    Clarify,
    Chat,
    RagAnswer,
}

impl ReplyMode {
    pub fn for_phase(phase: &PhaseTag) -> Self {
        match phase.known() {
            Some(Phase::Intro) => ReplyMode::Introduce,
            Some(Phase::Intake) | Some(Phase::ConfirmCalc) => ReplyMode::Clarify,
            Some(Phase::RetrieveSolve) => ReplyMode::RagAnswer,
            Some(Phase::Calc) | Some(Phase::Interpret) | None => ReplyMode::Chat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyMode::Introduce => "introduce",
            ReplyMode::Clarify => "clarify",
            ReplyMode::Chat => "chat",
            ReplyMode::RagAnswer => "rag_answer",
        }
    }
}

impl fmt::Display for ReplyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the narrator needs to produce one reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantDirective {
    pub phase: PhaseTag,
    pub mode: ReplyMode,
    /// The user's latest message.
    pub message: String,
    /// Required fields still missing; empty once intake is complete.
    pub missing_fields: Vec<IntakeField>,
    /// Values collected so far.
    pub intake: Intake,
    pub calc: Option<RiskResult>,
    /// Set when this turn should consult the solution database.
    pub retrieval: Option<RetrievalRequest>,
    /// Filled in by the caller after retrieval.
    pub sources: Vec<RetrievedSource>,
}

impl AssistantDirective {
    pub fn wants_retrieval(&self) -> bool {
        self.retrieval.is_some()
    }

    pub fn with_sources(mut self, sources: Vec<RetrievedSource>) -> Self {
        self.sources = sources;
        self
    }
}
