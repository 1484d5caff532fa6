//! Scale factor regressions for the three task parameters.

use serde::{Deserialize, Serialize};

/// Dimensionless multipliers applied to the reference load.
///
/// Each factor is 1.0 at its idealized reference condition. Values outside
/// [0, 1] are possible at the edges of the input domain and are kept as is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleFactors {
    /// Hand height factor (`V_SF`).
    pub vertical: f64,
    /// Travel distance factor (`DH_SF`).
    pub horizontal: f64,
    /// Repetition frequency factor (`F_SF`).
    pub frequency: f64,
}

impl ScaleFactors {
    /// Computes all three factors. `frequency` must be positive.
    pub fn compute(hand_height: f64, distance: f64, frequency: f64) -> Self {
        Self {
            vertical: vertical_factor(hand_height),
            horizontal: horizontal_factor(distance),
            frequency: frequency_factor(frequency),
        }
    }

    /// Product of the three factors.
    pub fn combined(&self) -> f64 {
        self.vertical * self.horizontal * self.frequency
    }
}

fn vertical_factor(hand_height: f64) -> f64 {
    -0.5304 + hand_height / 0.3361 - hand_height.powi(2) / 0.6915
}

fn horizontal_factor(distance: f64) -> f64 {
    1.0286 - distance / 72.22 + distance.powi(2) / 9782.0
}

fn frequency_factor(frequency: f64) -> f64 {
    let log_f = frequency.ln();
    0.7251 - log_f / 13.19 - log_f.powi(2) / 197.3
}
