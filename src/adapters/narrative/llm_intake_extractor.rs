//! Intake extraction through a language model in JSON mode.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::json_reply::extract_json_object;
use crate::domain::conversation::{ChatMessage, Role};
use crate::domain::intake::{Intake, IntakeBounds, IntakeForm};
use crate::ports::{CompletionRequest, ExtractionError, IntakeExtractor, LanguageModel, ResponseFormat};

pub const EXTRACTION_PROMPT: &str = "\
You are an intake parser for a push/pull ergonomics assistant.

TASK:
Extract structured intake fields from the conversation.

FIELDS:
- action (\"push\" or \"pull\")
- initialForce (number): force needed to get the object moving
- sustainedForce (number): force needed to keep it moving
- handHeight (number): height of the worker's hands above the ground
- distance (number): how far the object is moved
- frequency (number): how often the action is performed
- forceUnit, heightUnit, distanceUnit, frequencyUnit (string, e.g. \"lb\", \"in\", \"ft\", \"per_min\")
- environment (object): summary, surface, slope, loadType, constraints (strings)

OUTPUT:
Return ONLY valid JSON of the form {\"intake\": {...}} using the field names above.

RULES:
- Use null when unknown.
- If a user provides a value without a unit, infer from context if obvious; otherwise leave unit null.
- Never guess a number the user did not give.";

/// Renders history as `ROLE: content` lines.
pub fn history_to_text(history: &[ChatMessage]) -> String {
    history
        .iter()
        .filter(|m| !m.content.trim().is_empty())
        .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses a model reply into an intake.
///
/// Accepts `{"intake": {...}}` or the bare field object. Malformed or
/// out-of-range values are dropped with a warning.
pub fn parse_extraction(reply: &str, bounds: &IntakeBounds) -> Result<Intake, ExtractionError> {
    let invalid = |reason: String| ExtractionError::InvalidJson {
        reason,
        raw: reply.to_string(),
    };

    let json = extract_json_object(reply).ok_or_else(|| invalid("no JSON object found".into()))?;
    let mut value: Value = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;

    let fields = if value.get("intake").is_some_and(Value::is_object) {
        value["intake"].take()
    } else {
        value
    };
    let form: IntakeForm = serde_json::from_value(fields).map_err(|e| invalid(e.to_string()))?;

    let (intake, malformed) = form.into_intake_lenient();
    for err in &malformed {
        tracing::warn!(field = err.field(), error = %err, "Dropping malformed extracted value");
    }

    let (intake, violations) = bounds.retain_valid(intake);
    for err in &violations {
        tracing::warn!(field = err.field(), error = %err, "Dropping out-of-range extracted value");
    }

    Ok(intake)
}

/// [`IntakeExtractor`] backed by a [`LanguageModel`].
pub struct LlmIntakeExtractor {
    model: Arc<dyn LanguageModel>,
    bounds: IntakeBounds,
}

impl LlmIntakeExtractor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            bounds: IntakeBounds::default(),
        }
    }

    pub fn with_bounds(mut self, bounds: IntakeBounds) -> Self {
        self.bounds = bounds;
        self
    }
}

#[async_trait]
impl IntakeExtractor for LlmIntakeExtractor {
    async fn extract(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<Intake, ExtractionError> {
        let request = CompletionRequest::new()
            .with_system_prompt(EXTRACTION_PROMPT)
            .with_message(
                Role::User,
                format!(
                    "HISTORY:\n{}\n\nLATEST USER MESSAGE:\n{}",
                    history_to_text(history),
                    message
                ),
            )
            .with_temperature(0.0)
            .with_response_format(ResponseFormat::JsonObject);

        let response = self.model.complete(request).await?;
        let intake = parse_extraction(&response.content, &self.bounds)?;

        tracing::debug!(
            missing = intake.missing_required_fields().len(),
            "Extracted intake fields"
        );
        Ok(intake)
    }
}
