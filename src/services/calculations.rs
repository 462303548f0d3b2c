// src/services/calculations.rs
//! Small numeric helpers shared by the valuation formulas.

/// Converts a percentage such as `12.5` to a fraction (`0.125`).
pub fn percent(value: f64) -> f64 {
    value / 100.0
}

/// Present-value factor for a cash flow `year` periods out.
pub fn discount_factor(rate: f64, year: u32) -> f64 {
    1.0 / (1.0 + rate).powi(year as i32)
}

/// Value after compounding `periods` times at `rate`.
pub fn compound(start_value: f64, rate: f64, periods: u32) -> f64 {
    start_value * (1.0 + rate).powi(periods as i32)
}

pub fn calculate_average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Rounds half away from zero to `decimals` places. Works on the scaled
/// binary value, so it can differ from `toFixed` near decimal halves:
/// `round_to(1.45, 1)` is 1.5 where `(1.45).toFixed(1)` gives "1.4".
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
