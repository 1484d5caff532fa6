//! Standard-normal quantiles sampled at integer percentiles.

use crate::domain::foundation::Percentage;

/// Highest fatigued-population percentile the model reports.
pub const MAX_FATIGUED_PERCENTILE: u8 = 99;

/// `Z_TABLE[k - 1]` is the standard-normal quantile at percentile `k`.
///
/// The last entry (3.09) is the 99.9th percentile.
pub const Z_TABLE: [f64; 100] = [
    -2.33, -2.05, -1.88, -1.75, -1.64, -1.55, -1.48, -1.41, -1.34, -1.28, //
    -1.23, -1.18, -1.13, -1.08, -1.04, -0.99, -0.95, -0.92, -0.88, -0.84, //
    -0.81, -0.77, -0.74, -0.71, -0.67, -0.64, -0.61, -0.58, -0.55, -0.52, //
    -0.50, -0.47, -0.44, -0.41, -0.39, -0.36, -0.33, -0.31, -0.28, -0.25, //
    -0.23, -0.20, -0.18, -0.15, -0.13, -0.10, -0.08, -0.05, -0.03, 0.00, //
    0.03, 0.05, 0.08, 0.10, 0.13, 0.15, 0.18, 0.20, 0.23, 0.25, //
    0.28, 0.31, 0.33, 0.36, 0.39, 0.41, 0.44, 0.47, 0.50, 0.52, //
    0.55, 0.58, 0.61, 0.64, 0.67, 0.71, 0.74, 0.77, 0.81, 0.84, //
    0.88, 0.92, 0.95, 0.99, 1.04, 1.08, 1.13, 1.18, 1.23, 1.28, //
    1.34, 1.41, 1.48, 1.55, 1.64, 1.75, 1.88, 2.05, 2.33, 3.09,
];

/// Returns the z-score at an integer percentile (1..=100).
pub fn z_score(percentile: u8) -> Option<f64> {
    match percentile {
        1..=100 => Some(Z_TABLE[usize::from(percentile) - 1]),
        _ => None,
    }
}

/// Maps a standardized deviation to the share of the population fatigued by it.
///
/// Picks the smallest percentile whose z-score is at least `deviation`,
/// capped at [`MAX_FATIGUED_PERCENTILE`]. Deviations beyond the table
/// (including NaN) report the cap.
pub fn fatigued_percentile(deviation: f64) -> Percentage {
    let percentile = Z_TABLE
        .iter()
        .position(|z| *z >= deviation)
        .map(|index| (index + 1) as u8)
        .unwrap_or(MAX_FATIGUED_PERCENTILE);

    Percentage::new(percentile.min(MAX_FATIGUED_PERCENTILE))
}
