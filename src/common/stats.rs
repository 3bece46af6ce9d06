//! Descriptive statistics over `f64` samples.
//!
//! Median and quantiles follow the linear-interpolation convention, so the
//! median of an even-sized sample is the mean of its two middle values.

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(sum(values) / values.len() as f64)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().min_by(|a, b| a.total_cmp(b))
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().max_by(|a, b| a.total_cmp(b))
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile `q` in `[0, 1]` with linear interpolation between closest ranks.
pub fn quantile(
    values: &[f64],
    q: f64,
) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

pub fn round_to(
    value: f64,
    decimals: i32,
) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
