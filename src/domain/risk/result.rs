//! Output of a risk assessment.

use serde::{Deserialize, Serialize};

use super::{Contribution, ScaleFactors};
use crate::domain::foundation::Percentage;

/// Verdict for one task. Created once per calculation and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResult {
    pub acceptable: bool,
    pub max_acceptable_load: f64,
    pub acceptable_force_threshold: f64,
    /// Population percentile unable to sustain the task; `None` when acceptable.
    pub percent_workers_fatigued: Option<Percentage>,
    /// Ranked factor shares; empty when acceptable.
    pub contributions: Vec<Contribution>,
    pub scale_factors: ScaleFactors,
    pub summary: String,
}

impl RiskResult {
    /// The factor with the largest share, if the task is not acceptable.
    pub fn top_contributor(&self) -> Option<&Contribution> {
        self.contributions.first()
    }

    /// Sum of all contribution shares (1.0 when not acceptable, 0.0 otherwise).
    pub fn share_total(&self) -> f64 {
        self.contributions.iter().map(|c| c.share).sum()
    }
}
