//! Risk Module - Psychophysical push/pull exertion assessment.
//!
//! A single-task adaptation of a population capacity model: three regression
//! scale factors reduce a reference load to the task's maximum acceptable
//! load, which is compared against the measured initial force at a target
//! population percentile. Unacceptable tasks get a fatigued-population
//! estimate and a ranked attribution of the risk to each input.
//!
//! # Components
//!
//! - `RiskModel` - Reference load, coefficient of variation, target z
//! - `ScaleFactors` - Hand height, distance and frequency regressions
//! - `percentile` - Standard-normal quantile table and fatigue lookup
//! - `Contribution` / `RiskFactor` - Normalized factor shares and ranking
//! - `RiskCalculator` - The verdict itself
//!
//! All functions are pure. Identical inputs give bit-identical results.

mod calculator;
mod contribution;
mod errors;
mod model;
pub mod percentile;
mod result;
mod scale_factors;

pub use calculator::RiskCalculator;
pub use contribution::{rank, round_to, Contribution, ContributionTerms, RiskFactor};
pub use errors::RiskError;
pub use model::{
    RiskModel, COEFFICIENT_OF_VARIATION, LEGACY_TARGET_Z, REFERENCE_LOAD, TARGET_PERCENTILE,
};
pub use result::RiskResult;
pub use scale_factors::ScaleFactors;
