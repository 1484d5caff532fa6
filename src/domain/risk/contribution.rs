//! Attribution of residual risk to the task inputs.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::ScaleFactors;

/// A task input that can carry part of the risk.
///
/// Declaration order is the tie-break order when two shares are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Height,
    Distance,
    Frequency,
    Force,
}

impl RiskFactor {
    /// All factors in tie-break order.
    pub const ALL: [RiskFactor; 4] = [
        RiskFactor::Height,
        RiskFactor::Distance,
        RiskFactor::Frequency,
        RiskFactor::Force,
    ];

    /// Machine name used in summaries and serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            RiskFactor::Height => "height",
            RiskFactor::Distance => "distance",
            RiskFactor::Frequency => "frequency",
            RiskFactor::Force => "force",
        }
    }

    /// Label suitable for UI display.
    pub fn label(&self) -> &'static str {
        match self {
            RiskFactor::Height => "Hand height",
            RiskFactor::Distance => "Distance",
            RiskFactor::Frequency => "Frequency",
            RiskFactor::Force => "Initial Force",
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One factor's normalized share of the total contribution (its MCP).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    #[serde(rename = "factorName")]
    pub factor: RiskFactor,
    pub share: f64,
}

impl Contribution {
    pub fn new(factor: RiskFactor, share: f64) -> Self {
        Self { factor, share }
    }

    /// Share rounded to two decimals for presentation.
    pub fn rounded_share(&self) -> f64 {
        round_to(self.share, 2)
    }
}

/// Un-normalized contribution terms, one per factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContributionTerms {
    pub vertical: f64,
    pub horizontal: f64,
    pub frequency: f64,
    pub force: f64,
}

impl ContributionTerms {
    /// Derives the terms from the scale factors and the measured initial force.
    ///
    /// Force only contributes above the reference load.
    pub fn from_factors(factors: &ScaleFactors, initial_force: f64, reference_load: f64) -> Self {
        let force = if initial_force > reference_load {
            (initial_force - reference_load) / reference_load
        } else {
            0.0
        };

        Self {
            vertical: 1.0 - factors.vertical,
            horizontal: 1.0 - factors.horizontal,
            frequency: 1.0 - factors.frequency,
            force,
        }
    }

    pub fn total(&self) -> f64 {
        self.vertical + self.horizontal + self.frequency + self.force
    }

    /// Normalizes each term by the total, in tie-break order.
    ///
    /// Returns `None` when the total is zero or not finite.
    pub fn shares(&self) -> Option<[Contribution; 4]> {
        let total = self.total();
        if total == 0.0 || !total.is_finite() {
            return None;
        }

        Some([
            Contribution::new(RiskFactor::Height, self.vertical / total),
            Contribution::new(RiskFactor::Distance, self.horizontal / total),
            Contribution::new(RiskFactor::Frequency, self.frequency / total),
            Contribution::new(RiskFactor::Force, self.force / total),
        ])
    }
}

/// Orders contributions by descending share, ties in [`RiskFactor`] order.
pub fn rank(contributions: &mut [Contribution]) {
    contributions.sort_by(|a, b| {
        b.share
            .partial_cmp(&a.share)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.factor.cmp(&b.factor))
    });
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors(vertical: f64, horizontal: f64, frequency: f64) -> ScaleFactors {
        ScaleFactors {
            vertical,
            horizontal,
            frequency,
        }
    }

    mod terms {
        use super::*;

        #[test]
        fn force_below_reference_contributes_nothing() {
            let terms = ContributionTerms::from_factors(&factors(0.5, 0.5, 0.5), 15.0, 36.9);
            assert_eq!(terms.force, 0.0);
        }

        #[test]
        fn force_at_reference_contributes_nothing() {
            let terms = ContributionTerms::from_factors(&factors(0.5, 0.5, 0.5), 36.9, 36.9);
            assert_eq!(terms.force, 0.0);
        }

        #[test]
        fn force_above_reference_is_relative_excess() {
            let terms = ContributionTerms::from_factors(&factors(0.5, 0.5, 0.5), 73.8, 36.9);
            assert!((terms.force - 1.0).abs() < 1e-12);
        }

        #[test]
        fn factor_terms_are_complements() {
            let terms = ContributionTerms::from_factors(&factors(0.6, 0.9, 0.5), 0.0, 36.9);
            assert!((terms.vertical - 0.4).abs() < 1e-12);
            assert!((terms.horizontal - 0.1).abs() < 1e-12);
            assert!((terms.frequency - 0.5).abs() < 1e-12);
        }

        #[test]
        fn shares_sum_to_one() {
            let terms = ContributionTerms::from_factors(&factors(0.6, 0.9, 0.5), 50.0, 36.9);
            let total: f64 = terms.shares().unwrap().iter().map(|c| c.share).sum();
            assert!((total - 1.0).abs() < 1e-9);
        }

        #[test]
        fn zero_total_has_no_shares() {
            let terms = ContributionTerms::from_factors(&factors(1.0, 1.0, 1.0), 10.0, 36.9);
            assert_eq!(terms.total(), 0.0);
            assert!(terms.shares().is_none());
        }

        #[test]
        fn factor_above_one_yields_negative_share() {
            let terms = ContributionTerms::from_factors(&factors(1.2, 0.5, 0.5), 10.0, 36.9);
            let shares = terms.shares().unwrap();
            assert!(shares[0].share < 0.0);
        }
    }

    mod ranking {
        use super::*;

        #[test]
        fn sorts_descending() {
            let mut list = vec![
                Contribution::new(RiskFactor::Height, 0.2),
                Contribution::new(RiskFactor::Distance, 0.1),
                Contribution::new(RiskFactor::Frequency, 0.6),
                Contribution::new(RiskFactor::Force, 0.1),
            ];
            rank(&mut list);
            let order: Vec<_> = list.iter().map(|c| c.factor).collect();
            assert_eq!(
                order,
                vec![
                    RiskFactor::Frequency,
                    RiskFactor::Height,
                    RiskFactor::Distance,
                    RiskFactor::Force
                ]
            );
        }

        #[test]
        fn ties_follow_factor_order_regardless_of_input_order() {
            let mut list = vec![
                Contribution::new(RiskFactor::Force, 0.25),
                Contribution::new(RiskFactor::Frequency, 0.25),
                Contribution::new(RiskFactor::Distance, 0.25),
                Contribution::new(RiskFactor::Height, 0.25),
            ];
            rank(&mut list);
            let order: Vec<_> = list.iter().map(|c| c.factor).collect();
            assert_eq!(order, RiskFactor::ALL.to_vec());
        }
    }

    mod presentation {
        use super::*;

        #[test]
        fn rounded_share_uses_two_decimals() {
            assert_eq!(Contribution::new(RiskFactor::Height, 0.43148).rounded_share(), 0.43);
            assert_eq!(Contribution::new(RiskFactor::Height, 0.5278).rounded_share(), 0.53);
        }

        #[test]
        fn serializes_factor_name() {
            let json =
                serde_json::to_value(Contribution::new(RiskFactor::Frequency, 0.5)).unwrap();
            assert_eq!(json["factorName"], "frequency");
            assert_eq!(json["share"], 0.5);
        }

        #[test]
        fn labels_match_display_names() {
            assert_eq!(RiskFactor::Height.label(), "Hand height");
            assert_eq!(RiskFactor::Force.label(), "Initial Force");
            assert_eq!(RiskFactor::Distance.to_string(), "distance");
        }
    }
}
