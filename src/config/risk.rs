//! Risk model configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::risk::{RiskModel, LEGACY_TARGET_Z};

/// Risk model configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskConfig {
    /// Explicit threshold z-value; takes precedence over the other settings
    #[serde(default)]
    pub target_z: Option<f64>,

    /// Population percentile to accommodate, z read from the percentile table
    #[serde(default)]
    pub target_percentile: Option<u8>,

    /// Use the z-value of earlier model revisions (-0.63)
    #[serde(default)]
    pub legacy_z: bool,
}

impl RiskConfig {
    /// The risk model these settings describe
    pub fn model(&self) -> Result<RiskModel, ValidationError> {
        let model = RiskModel::default();
        let model = match (self.target_z, self.target_percentile, self.legacy_z) {
            (Some(z), _, _) => model.with_target_z(z),
            (None, Some(percentile), _) => model
                .with_target_percentile(percentile)
                .map_err(|e| ValidationError::InvalidRiskModel(e.to_string()))?,
            (None, None, true) => model.with_target_z(LEGACY_TARGET_Z),
            (None, None, false) => model,
        };
        Ok(model)
    }

    /// Validate risk configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.model()?
            .validate()
            .map_err(|e| ValidationError::InvalidRiskModel(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_table_z() {
        let config = RiskConfig::default();
        assert!((config.model().unwrap().target_z - -0.67).abs() < 1e-9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_legacy_flag_selects_legacy_z() {
        let config = RiskConfig {
            legacy_z: true,
            ..Default::default()
        };
        assert_eq!(config.model().unwrap().target_z, LEGACY_TARGET_Z);
    }

    #[test]
    fn test_explicit_z_wins() {
        let config = RiskConfig {
            target_z: Some(-1.0),
            target_percentile: Some(50),
            legacy_z: true,
        };
        assert_eq!(config.model().unwrap().target_z, -1.0);
    }

    #[test]
    fn test_percentile_reads_z_from_table() {
        let config = RiskConfig {
            target_percentile: Some(50),
            legacy_z: true,
            ..Default::default()
        };
        let model = config.model().unwrap();
        assert_eq!(model.target_percentile, 50);
        assert_eq!(model.target_z, 0.0);
    }

    #[test]
    fn test_percentile_outside_table_rejected() {
        let config = RiskConfig {
            target_percentile: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidRiskModel(_))
        ));
    }

    #[test]
    fn test_non_finite_z_rejected() {
        let config = RiskConfig {
            target_z: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidRiskModel(_))
        ));
    }
}
