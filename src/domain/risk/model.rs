//! Population reference constants for the push/pull capacity model.

use serde::{Deserialize, Serialize};

use super::percentile;
use crate::domain::foundation::ValidationError;

/// Maximum acceptable initial force of the reference population under ideal conditions.
pub const REFERENCE_LOAD: f64 = 36.9;

/// Coefficient of variation of the reference population's acceptable force.
pub const COEFFICIENT_OF_VARIATION: f64 = 0.214;

/// Population percentile the task must accommodate.
pub const TARGET_PERCENTILE: u8 = 25;

/// The z-value hardcoded by earlier revisions of the model.
///
/// The percentile table gives -0.67 at the 25th percentile; this value is kept
/// so callers can reproduce results computed with the older constant.
pub const LEGACY_TARGET_Z: f64 = -0.63;

/// Tunable constants of the risk model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskModel {
    pub reference_load: f64,
    pub coefficient_of_variation: f64,
    pub target_percentile: u8,
    /// Standard-normal quantile used for the acceptability threshold.
    pub target_z: f64,
}

impl RiskModel {
    /// Overrides the threshold z-value while keeping the nominal percentile.
    pub fn with_target_z(mut self, z: f64) -> Self {
        self.target_z = z;
        self
    }

    /// Targets a different population percentile, taking z from the table.
    pub fn with_target_percentile(mut self, percentile: u8) -> Result<Self, ValidationError> {
        let z = percentile::z_score(percentile).ok_or_else(|| {
            ValidationError::out_of_range("target_percentile", 1.0, 100.0, f64::from(percentile))
        })?;
        self.target_percentile = percentile;
        self.target_z = z;
        Ok(self)
    }

    /// Validates the constants before they reach the calculator.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.reference_load.is_finite() {
            return Err(ValidationError::non_finite("reference_load", self.reference_load));
        }
        if self.reference_load <= 0.0 {
            return Err(ValidationError::not_positive("reference_load", self.reference_load));
        }
        if !self.coefficient_of_variation.is_finite() {
            return Err(ValidationError::non_finite(
                "coefficient_of_variation",
                self.coefficient_of_variation,
            ));
        }
        if self.coefficient_of_variation <= 0.0 {
            return Err(ValidationError::not_positive(
                "coefficient_of_variation",
                self.coefficient_of_variation,
            ));
        }
        if !self.target_z.is_finite() {
            return Err(ValidationError::non_finite("target_z", self.target_z));
        }
        Ok(())
    }
}

impl Default for RiskModel {
    fn default() -> Self {
        Self {
            reference_load: REFERENCE_LOAD,
            coefficient_of_variation: COEFFICIENT_OF_VARIATION,
            target_percentile: TARGET_PERCENTILE,
            target_z: percentile::Z_TABLE[usize::from(TARGET_PERCENTILE) - 1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_uses_table_z_for_25th_percentile() {
        let model = RiskModel::default();
        assert_eq!(model.reference_load, 36.9);
        assert_eq!(model.coefficient_of_variation, 0.214);
        assert_eq!(model.target_percentile, 25);
        assert_eq!(model.target_z, -0.67);
    }

    #[test]
    fn legacy_z_can_be_selected() {
        let model = RiskModel::default().with_target_z(LEGACY_TARGET_Z);
        assert_eq!(model.target_z, -0.63);
        assert_eq!(model.target_percentile, 25);
    }

    #[test]
    fn with_target_percentile_reads_table() {
        let model = RiskModel::default().with_target_percentile(50).unwrap();
        assert_eq!(model.target_percentile, 50);
        assert_eq!(model.target_z, 0.0);
    }

    #[test]
    fn with_target_percentile_rejects_zero() {
        assert!(RiskModel::default().with_target_percentile(0).is_err());
        assert!(RiskModel::default().with_target_percentile(101).is_err());
    }

    #[test]
    fn validate_rejects_non_positive_constants() {
        let model = RiskModel {
            reference_load: 0.0,
            ..Default::default()
        };
        assert!(model.validate().is_err());

        let model = RiskModel {
            coefficient_of_variation: -0.1,
            ..Default::default()
        };
        assert!(model.validate().is_err());

        assert!(RiskModel::default().validate().is_ok());
    }
}
