use serde::{Deserialize, Serialize};

/// One entry of an iterative method's convergence history.
///
/// Records are appended in iteration order and never modified afterwards.
/// `value` is the approximant after the iteration: a scalar for root finders,
/// an owned copy of the full iterate for the linear solvers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord<T> {
    pub iteration: usize,
    pub value: T,
    pub error: f64,
}

impl<T> IterationRecord<T> {
    pub fn new(iteration: usize, value: T, error: f64) -> Self {
        Self {
            iteration,
            value,
            error,
        }
    }
}

/// Infinity norm of the componentwise difference of two equal-length vectors.
/// A NaN component poisons the result so it can never pass a tolerance test.
pub(crate) fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, |acc, d| if d > acc || d.is_nan() { d } else { acc })
}
