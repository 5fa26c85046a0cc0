//! Percent change against the immediately preceding observation.

/// Row-over-row percent change: `(v[i] / v[i-1] - 1) * 100`.
///
/// The first element has no predecessor and is `None`. Division follows
/// IEEE semantics: a zero predecessor yields infinity (or NaN for 0/0),
/// matching the behavior of a plain ratio.
pub fn percent_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    for (i, &v) in values.iter().enumerate() {
        if i == 0 {
            result.push(None);
        } else {
            result.push(Some((v / values[i - 1] - 1.0) * 100.0));
        }
    }
    result
}
