//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors raised when a measurement or field fails validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    MissingField { field: String },

    #[error("Field '{field}' must be a finite number, got {actual}")]
    NonFinite { field: String, actual: f64 },

    #[error("Field '{field}' must be greater than zero, got {actual}")]
    NotPositive { field: String, actual: f64 },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a missing field validation error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        ValidationError::MissingField { field: field.into() }
    }

    /// Creates a non-finite value validation error.
    pub fn non_finite(field: impl Into<String>, actual: f64) -> Self {
        ValidationError::NonFinite {
            field: field.into(),
            actual,
        }
    }

    /// Creates a non-positive value validation error.
    pub fn not_positive(field: impl Into<String>, actual: f64) -> Self {
        ValidationError::NotPositive {
            field: field.into(),
            actual,
        }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::NonFinite { field, .. }
            | ValidationError::NotPositive { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }

    /// Maps the variant to its error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::MissingField { .. } => ErrorCode::MissingField,
            ValidationError::NonFinite { .. } | ValidationError::InvalidFormat { .. } => {
                ErrorCode::InvalidFormat
            }
            ValidationError::NotPositive { .. } | ValidationError::OutOfRange { .. } => {
                ErrorCode::OutOfRange
            }
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    MissingField,
    OutOfRange,
    InvalidFormat,

    // Computation errors
    IncompleteIntake,
    DegenerateRisk,

    // Collaborator errors
    AIProviderError,
    RetrievalError,
    ExtractionError,

    // Infrastructure errors
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::MissingField => "MISSING_FIELD",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::IncompleteIntake => "INCOMPLETE_INTAKE",
            ErrorCode::DegenerateRisk => "DEGENERATE_RISK",
            ErrorCode::AIProviderError => "AI_PROVIDER_ERROR",
            ErrorCode::RetrievalError => "RETRIEVAL_ERROR",
            ErrorCode::ExtractionError => "EXTRACTION_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}
