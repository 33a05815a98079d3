use crate::model::{AlignedRow, Commodity, CorrelationResult};

/// Number of most recent paired observations considered.
pub const CORRELATION_WINDOW: usize = 30;
/// Below this many pairs the coefficient is reported as `0`.
pub const MIN_CORRELATION_POINTS: usize = 5;

/// Trailing Pearson correlation between two commodities.
///
/// Only rows carrying both values count; of those, the last
/// [`CORRELATION_WINDOW`] are used. Insufficient data or a constant series
/// yields `0`.
pub fn correlate(rows: &[AlignedRow], a: Commodity, b: Commodity) -> f64 {
    let pairs: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|row| Some((row.get(a)?, row.get(b)?)))
        .collect();

    let recent = &pairs[pairs.len().saturating_sub(CORRELATION_WINDOW)..];
    if recent.len() < MIN_CORRELATION_POINTS {
        return 0.0;
    }
    pearson(recent)
}

fn pearson(pairs: &[(f64, f64)]) -> f64 {
    let n = pairs.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2, mut sum_y2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
        sum_y2 += y * y;
    }

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (numerator / denominator).clamp(-1.0, 1.0)
}

/// The three pairs shown on the dashboard.
pub fn correlate_all(rows: &[AlignedRow]) -> CorrelationResult {
    CorrelationResult {
        copper_oil: correlate(rows, Commodity::Copper, Commodity::Oil),
        zinc_oil: correlate(rows, Commodity::Zinc, Commodity::Oil),
        copper_zinc: correlate(rows, Commodity::Copper, Commodity::Zinc),
    }
}
