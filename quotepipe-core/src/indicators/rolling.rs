//! Trailing rolling-window statistics.

/// Trailing mean over up to `window` most recent values, including the
/// current one.
///
/// Defined from the first element: the window shrinks at the start of the
/// series instead of null-padding. The window slice is re-summed at every
/// position; windows here are small (7/30) and recomputation avoids
/// running-sum drift.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "rolling window must be >= 1");
    let mut result = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let slice = &values[start..=i];
        let sum: f64 = slice.iter().sum();
        result.push(sum / slice.len() as f64);
    }
    result
}

/// Trailing sample standard deviation (n−1 denominator) over the defined
/// values in the `window` most recent observations.
///
/// Undefined observations (`None`) are excluded from the window count.
/// `None` until at least two defined observations exist in the window.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    assert!(window >= 1, "rolling window must be >= 1");
    let mut result = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let defined: Vec<f64> = values[start..=i].iter().filter_map(|v| *v).collect();
        if defined.len() < 2 {
            result.push(None);
            continue;
        }
        let n = defined.len() as f64;
        let mean = defined.iter().sum::<f64>() / n;
        let var = defined.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        result.push(Some(var.sqrt()));
    }
    result
}
