//! Risk Calculator - acceptability verdict and factor attribution for one task.

use super::contribution::{self, ContributionTerms};
use super::percentile;
use super::{RiskError, RiskModel, RiskResult, ScaleFactors};
use crate::domain::foundation::ValidationError;
use crate::domain::intake::TaskMeasurements;

/// Stateless calculator over a fixed [`RiskModel`].
#[derive(Debug, Clone, Default)]
pub struct RiskCalculator {
    model: RiskModel,
}

impl RiskCalculator {
    pub fn new(model: RiskModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &RiskModel {
        &self.model
    }

    /// Assesses a frozen intake. Sustained force is not part of the model.
    pub fn assess(&self, task: &TaskMeasurements) -> Result<RiskResult, RiskError> {
        self.compute_risk(
            task.hand_height,
            task.distance,
            task.frequency,
            task.initial_force,
        )
    }

    /// Computes the verdict for a single push/pull task.
    ///
    /// 1. Scale factors for hand height, distance and frequency
    /// 2. Maximum acceptable load = reference load × the three factors
    /// 3. Threshold at the target population percentile
    /// 4. Acceptable when the initial force does not exceed the threshold
    /// 5. Otherwise: fatigued percentile and ranked factor shares
    ///
    /// # Errors
    /// - Any non-finite input
    /// - `frequency <= 0` (it passes through a logarithm)
    /// - A zero contribution total on the unacceptable branch
    pub fn compute_risk(
        &self,
        hand_height: f64,
        distance: f64,
        frequency: f64,
        initial_force: f64,
    ) -> Result<RiskResult, RiskError> {
        require_finite("handHeight", hand_height)?;
        require_finite("distance", distance)?;
        require_finite("frequency", frequency)?;
        require_finite("initialForce", initial_force)?;
        if frequency <= 0.0 {
            return Err(ValidationError::not_positive("frequency", frequency).into());
        }

        let model = &self.model;
        let scale_factors = ScaleFactors::compute(hand_height, distance, frequency);
        let max_acceptable_load = model.reference_load * scale_factors.combined();
        let spread = max_acceptable_load * model.coefficient_of_variation;
        let acceptable_force_threshold = max_acceptable_load + model.target_z * spread;

        if initial_force <= acceptable_force_threshold {
            return Ok(RiskResult {
                acceptable: true,
                max_acceptable_load,
                acceptable_force_threshold,
                percent_workers_fatigued: None,
                contributions: Vec::new(),
                scale_factors,
                summary: format!(
                    "The task meets the criteria for the {} percentile of female workers; \
                     therefore, it is acceptable.",
                    ordinal(model.target_percentile)
                ),
            });
        }

        let deviation = (initial_force - max_acceptable_load) / spread;
        let percent_workers_fatigued = percentile::fatigued_percentile(deviation);

        let terms =
            ContributionTerms::from_factors(&scale_factors, initial_force, model.reference_load);
        let mut contributions = terms
            .shares()
            .ok_or(RiskError::DegenerateContributions {
                total: terms.total(),
            })?
            .to_vec();
        contribution::rank(&mut contributions);

        let top = contributions[0];
        let summary = format!(
            "The task did not meet the criteria for the {} percentile of female workers; \
             therefore, it is not acceptable. The most impactful task input for this job is \
             {} with a metric contribution of {}",
            ordinal(model.target_percentile),
            top.factor.name(),
            top.rounded_share()
        );

        Ok(RiskResult {
            acceptable: false,
            max_acceptable_load,
            acceptable_force_threshold,
            percent_workers_fatigued: Some(percent_workers_fatigued),
            contributions,
            scale_factors,
            summary,
        })
    }
}

fn require_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::non_finite(field, value))
    }
}

fn ordinal(n: u8) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
