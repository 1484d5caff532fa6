//! Error types for the risk computation.

use crate::domain::foundation::{ErrorCode, ValidationError};

/// Failures of [`RiskCalculator`](super::RiskCalculator).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiskError {
    #[error("Invalid risk input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("Contribution total is {total}; factor shares are undefined")]
    DegenerateContributions { total: f64 },
}

impl RiskError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RiskError::InvalidInput(err) => err.code(),
            RiskError::DegenerateContributions { .. } => ErrorCode::DegenerateRisk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_wraps_validation_message() {
        let err = RiskError::from(ValidationError::not_positive("frequency", 0.0));
        assert!(err.to_string().contains("frequency"));
        assert_eq!(err.code(), ErrorCode::OutOfRange);
    }

    #[test]
    fn degenerate_contributions_reports_total() {
        let err = RiskError::DegenerateContributions { total: 0.0 };
        assert!(err.to_string().contains("total is 0"));
        assert_eq!(err.code(), ErrorCode::DegenerateRisk);
    }
}
