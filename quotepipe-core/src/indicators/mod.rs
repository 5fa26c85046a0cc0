//! Rolling indicator kernels.
//!
//! Pure per-series functions operating on date-ordered slices. The indicator
//! engine applies them independently to each security group; they never see
//! rows from more than one security.
//!
//! All trailing windows use the shrinking-window policy: a window at the
//! start of a series uses however many observations exist rather than
//! emitting nulls until the window fills.

pub mod change;
pub mod rolling;

pub use change::percent_change;
pub use rolling::{rolling_mean, rolling_std};

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-9;

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "expected {expected}, got {actual}"
    );
}
