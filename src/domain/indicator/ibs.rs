//! IBS (Internal Bar Strength) indicator.
//!
//! IBS[i] = (C[i] - L[i]) / (H[i] - L[i])
//! Undefined when H[i] == L[i].

use crate::domain::bar::Bar;

/// IBS of a single bar, `None` for a zero-range bar.
pub fn ibs(bar: &Bar) -> Option<f64> {
    let range = bar.range();
    if range <= 0.0 {
        return None;
    }
    Some((bar.close - bar.low) / range)
}

pub fn calculate_ibs(bars: &[Bar]) -> Vec<Option<f64>> {
    bars.iter().map(ibs).collect()
}
