//! Deterministic narration and extraction for tests and offline runs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::prompts::{describe_intake, describe_verdict};
use crate::domain::conversation::{AssistantDirective, ChatMessage, ReplyMode};
use crate::domain::intake::{Intake, IntakeField};
use crate::ports::{ExtractionError, IntakeExtractor, NarrativeError, NarrativeGenerator};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Extractor that replays queued results.
///
/// Returns an empty intake once the queue runs out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIntakeExtractor {
    results: Arc<Mutex<VecDeque<Result<Intake, ExtractionError>>>>,
    messages: Arc<Mutex<Vec<String>>>,
}

impl ScriptedIntakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_intake(self, intake: Intake) -> Self {
        lock(&self.results).push_back(Ok(intake));
        self
    }

    pub fn with_error(self, error: ExtractionError) -> Self {
        lock(&self.results).push_back(Err(error));
        self
    }

    /// Messages passed to `extract`, in call order.
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

#[async_trait]
impl IntakeExtractor for ScriptedIntakeExtractor {
    async fn extract(
        &self,
        message: &str,
        _history: &[ChatMessage],
    ) -> Result<Intake, ExtractionError> {
        lock(&self.messages).push(message.to_string());
        lock(&self.results)
            .pop_front()
            .unwrap_or_else(|| Ok(Intake::new()))
    }
}

/// Narrator that renders fixed templates from the directive.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    pub fn new() -> Self {
        Self
    }

    pub fn render(directive: &AssistantDirective) -> String {
        match directive.mode {
            ReplyMode::Introduce => "Hi, I'm Ergo. Tell me about the push or pull task you'd like to assess.".to_string(),
            ReplyMode::Clarify if directive.missing_fields.is_empty() => format!(
                "Here is what I have:\n{}\nShall I run the assessment?",
                describe_intake(&directive.intake)
            ),
            ReplyMode::Clarify => {
                let names: Vec<&str> = directive
                    .missing_fields
                    .iter()
                    .map(IntakeField::name)
                    .collect();
                format!("I still need: {}.", names.join(", "))
            }
            ReplyMode::Chat => match &directive.calc {
                Some(calc) => describe_verdict(calc),
                None => "Let's keep going.".to_string(),
            },
            ReplyMode::RagAnswer => {
                let cited: Vec<String> = (1..=directive.sources.len().min(3))
                    .map(|i| format!("[SOURCE {}]", i))
                    .collect();
                if cited.is_empty() {
                    "I could not find matching solutions.".to_string()
                } else {
                    format!("Suggested solutions: {}", cited.join(" "))
                }
            }
        }
    }
}

#[async_trait]
impl NarrativeGenerator for TemplateNarrator {
    async fn narrate(
        &self,
        directive: &AssistantDirective,
        _history: &[ChatMessage],
    ) -> Result<String, NarrativeError> {
        Ok(Self::render(directive))
    }
}
