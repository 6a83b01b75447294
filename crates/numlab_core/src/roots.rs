//! Scalar root finding: bisection and Newton-Raphson.
//!
//! Exhausting the iteration cap is not an error here: the last iterate is
//! returned with `converged == false` so the caller can still plot the
//! history. Use [`RootResult::into_converged`] to turn that into a failure.

use crate::error::{invalid_input, NumericError, Result};
use crate::records::IterationRecord;
use crate::settings::IterationSettings;
use crate::traits::RealFunction;
use serde::{Deserialize, Serialize};

/// Smallest |f'(x)| Newton's method will divide by.
pub const MIN_DERIVATIVE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootResult {
    pub root: f64,
    pub iterations: usize,
    pub converged: bool,
    pub history: Vec<IterationRecord<f64>>,
}

impl RootResult {
    /// Last recorded error estimate, or zero when no iteration ran.
    pub fn error(&self) -> f64 {
        self.history.last().map_or(0.0, |r| r.error)
    }

    pub fn into_converged(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(NumericError::NotConverged {
                iterations: self.iterations,
                value: self.root,
                error: self.error(),
            })
        }
    }
}

/// Bracketing root search on [a, b].
///
/// Requires a strict sign change, f(a)·f(b) < 0. The error recorded for each
/// iteration is the half-width of the bracket that produced the midpoint.
pub fn bisection(
    f: &impl RealFunction,
    a: f64,
    b: f64,
    tol: f64,
    max_iter: usize,
) -> Result<RootResult> {
    if !a.is_finite() || !b.is_finite() {
        invalid_input!("Interval bounds must be finite (got [{}, {}]).", a, b);
    }
    IterationSettings::new(tol, max_iter).validate()?;

    let mut lo = a;
    let mut hi = b;
    let mut f_lo = f.eval(lo);
    let f_hi = f.eval(hi);
    if !(f_lo * f_hi < 0.0) {
        return Err(NumericError::PreconditionViolation(format!(
            "f(a) and f(b) must have opposite signs (f({}) = {}, f({}) = {}).",
            a, f_lo, b, f_hi
        )));
    }

    let mut history = Vec::new();
    let mut midpoint = 0.5 * (lo + hi);

    for iteration in 1..=max_iter {
        midpoint = 0.5 * (lo + hi);
        let half_width = 0.5 * (hi - lo).abs();
        let f_mid = f.eval(midpoint);
        history.push(IterationRecord::new(iteration, midpoint, half_width));
        log::debug!(
            "bisection iter {}: c = {}, f(c) = {}, half-width = {}",
            iteration,
            midpoint,
            f_mid,
            half_width
        );

        if f_mid.abs() < f64::EPSILON || half_width < tol {
            return Ok(RootResult {
                root: midpoint,
                iterations: iteration,
                converged: true,
                history,
            });
        }

        if f_lo * f_mid < 0.0 {
            hi = midpoint;
        } else {
            lo = midpoint;
            f_lo = f_mid;
        }
    }

    log::warn!(
        "bisection did not converge in {} iterations (last midpoint {})",
        max_iter,
        midpoint
    );
    Ok(RootResult {
        root: midpoint,
        iterations: max_iter,
        converged: false,
        history,
    })
}

/// Newton-Raphson iteration x ← x − f(x)/f'(x) from `x0`.
///
/// The recorded error is the step length |x_new − x|.
pub fn newton_method(
    f: &impl RealFunction,
    f_prime: &impl RealFunction,
    x0: f64,
    tol: f64,
    max_iter: usize,
) -> Result<RootResult> {
    if !x0.is_finite() {
        invalid_input!("Initial guess must be finite (got {}).", x0);
    }
    IterationSettings::new(tol, max_iter).validate()?;

    let mut x = x0;
    let mut history = Vec::new();

    for iteration in 1..=max_iter {
        let derivative = f_prime.eval(x);
        if derivative.abs() < MIN_DERIVATIVE {
            return Err(NumericError::DerivativeTooSmall { x, derivative });
        }

        let next = x - f.eval(x) / derivative;
        let step = (next - x).abs();
        history.push(IterationRecord::new(iteration, next, step));
        log::debug!("newton iter {}: x = {}, |dx| = {}", iteration, next, step);

        if step < tol {
            return Ok(RootResult {
                root: next,
                iterations: iteration,
                converged: true,
                history,
            });
        }
        x = next;
    }

    log::warn!(
        "newton_method did not converge in {} iterations (last iterate {})",
        max_iter,
        x
    );
    Ok(RootResult {
        root: x,
        iterations: max_iter,
        converged: false,
        history,
    })
}

#[cfg(test)]
mod tests {
    use super::{bisection, newton_method};
    use crate::error::NumericError;

    fn quadratic(x: f64) -> f64 {
        x * x - 4.0
    }

    fn quadratic_prime(x: f64) -> f64 {
        2.0 * x
    }

    #[test]
    fn bisection_finds_positive_root_of_quadratic() {
        let result = bisection(&quadratic, 0.0, 3.0, 1e-5, 100).expect("bisection should run");
        assert!(result.converged);
        assert!((result.root - 2.0).abs() < 1e-5, "root = {}", result.root);
        assert_eq!(result.history.len(), result.iterations);
        assert!(result
            .history
            .iter()
            .enumerate()
            .all(|(i, r)| r.iteration == i + 1));
    }

    #[test]
    fn bisection_requires_sign_change() {
        let err = bisection(&quadratic, 3.0, 5.0, 1e-5, 100).unwrap_err();
        assert!(matches!(err, NumericError::PreconditionViolation(_)), "{err:?}");
    }

    #[test]
    fn bisection_stops_immediately_on_exact_root() {
        // Midpoint of [0, 4] is the root itself.
        let result = bisection(&quadratic, 0.0, 4.0, 1e-12, 50).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.root, 2.0);
    }

    #[test]
    fn bisection_reports_exhausted_budget() {
        let result = bisection(&quadratic, 0.0, 3.0, 1e-12, 5).unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations, 5);
        assert_eq!(result.root, result.history[4].value);
        assert!(matches!(
            result.into_converged(),
            Err(NumericError::NotConverged { iterations: 5, .. })
        ));
    }

    #[test]
    fn bisection_rejects_invalid_stopping_rule() {
        assert!(matches!(
            bisection(&quadratic, 0.0, 3.0, 0.0, 10),
            Err(NumericError::InvalidInput(_))
        ));
        assert!(matches!(
            bisection(&quadratic, 0.0, 3.0, 1e-6, 0),
            Err(NumericError::InvalidInput(_))
        ));
    }

    #[test]
    fn newton_converges_quadratically_to_two() {
        let result = newton_method(&quadratic, &quadratic_prime, 1.0, 1e-10, 50).unwrap();
        assert!(result.converged);
        assert!((result.root - 2.0).abs() < 1e-10);
        assert!(result.iterations <= 7, "took {} iterations", result.iterations);
        assert!(result.into_converged().is_ok());
    }

    #[test]
    fn newton_fails_on_flat_derivative() {
        let err = newton_method(&quadratic, &quadratic_prime, 0.0, 1e-10, 50).unwrap_err();
        assert!(matches!(
            err,
            NumericError::DerivativeTooSmall { x, .. } if x == 0.0
        ));
    }

    #[test]
    fn newton_reports_exhausted_budget() {
        let result = newton_method(&quadratic, &quadratic_prime, 100.0, 1e-14, 3).unwrap();
        assert!(!result.converged);
        assert_eq!(result.history.len(), 3);
        assert_eq!(result.root, result.history[2].value);
    }

    #[test]
    fn repeated_runs_have_identical_histories() {
        let first = newton_method(&f64::cos, &|x: f64| -x.sin(), 1.0, 1e-12, 30).unwrap();
        let second = newton_method(&f64::cos, &|x: f64| -x.sin(), 1.0, 1e-12, 30).unwrap();
        assert_eq!(first, second);
    }
}
