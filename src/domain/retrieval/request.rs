//! Retrieval requests.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::ValidationError;
use crate::domain::intake::Intake;
use crate::domain::risk::RiskResult;

/// Default number of sources fetched for a solution turn.
pub const DEFAULT_TOP_K: usize = 10;

/// Upper bound on `top_k` accepted from callers.
pub const MAX_TOP_K: usize = 50;

/// A similarity query against the solution database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalRequest {
    pub question: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Metadata filter passed to the store verbatim.
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    /// Drop sources whose distance exceeds this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_similarity: Option<f64>,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl RetrievalRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: DEFAULT_TOP_K,
            filter: None,
            min_similarity: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Builds the solution query for a completed task.
    ///
    /// The user's message leads; task context and the dominant risk factor
    /// follow so the embedding lands near relevant solutions.
    pub fn for_task(message: &str, intake: &Intake, calc: Option<&RiskResult>) -> Self {
        let mut lines = vec![message.trim().to_string()];

        if let Some(action) = intake.action {
            lines.push(format!("Task: {} a load", action));
        }
        let environment: Vec<&str> = intake.environment.descriptors().collect();
        if !environment.is_empty() {
            lines.push(format!("Environment: {}", environment.join("; ")));
        }
        if let Some(top) = calc.and_then(RiskResult::top_contributor) {
            lines.push(format!("Primary risk factor: {}", top.factor.label()));
        }

        let question = lines
            .into_iter()
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(question)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.question.trim().is_empty() {
            return Err(ValidationError::missing_field("question"));
        }
        if self.top_k == 0 || self.top_k > MAX_TOP_K {
            return Err(ValidationError::out_of_range(
                "topK",
                1.0,
                MAX_TOP_K as f64,
                self.top_k as f64,
            ));
        }
        if let Some(filter) = &self.filter {
            if !filter.is_object() {
                return Err(ValidationError::invalid_format("where", "must be an object"));
            }
        }
        Ok(())
    }
}
