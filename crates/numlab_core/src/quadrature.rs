//! Definite integrals by the composite trapezoid rule with panel doubling and
//! by Romberg extrapolation, plus the sampling helpers the integration view
//! plots with.
//!
//! Both integrators rely on the halving recurrence
//!
//! ```text
//! T(2n) = T(n) / 2 + h_new * Σ f(a + (2k - 1) h_new),  k = 1..n
//! ```
//!
//! so each refinement only evaluates f at the newly introduced midpoints.

use crate::error::{invalid_input, NumericError, Result};
use crate::interpolation::Sample;
use crate::settings::IterationSettings;
use crate::traits::RealFunction;
use serde::{Deserialize, Serialize};

/// Progress report for one panel-doubling step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrapezoidIteration {
    pub iteration: usize,
    pub panels: usize,
    pub value: f64,
    pub error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrapezoidResult {
    pub value: f64,
    pub error: f64,
    pub iterations: usize,
    pub panels: usize,
    pub history: Vec<TrapezoidIteration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RombergResult {
    pub value: f64,
    /// |R[i][j] - R[i-1][j-1]| for the returned entry.
    pub error: f64,
    pub converged: bool,
    /// Row i holds i + 1 entries, except possibly the last row on early exit.
    pub table: Vec<Vec<f64>>,
}

impl RombergResult {
    /// Number of trapezoid refinements (rows) that were computed.
    pub fn rows(&self) -> usize {
        self.table.len()
    }

    pub fn into_converged(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(NumericError::NotConverged {
                iterations: self.table.len().saturating_sub(1),
                value: self.value,
                error: self.error,
            })
        }
    }
}

/// Most panel doublings either rule will attempt; 2^MAX_REFINEMENTS panels
/// is the largest count a `usize` holds.
pub const MAX_REFINEMENTS: usize = usize::BITS as usize - 1;

fn validate_refinements(name: &str, count: usize) -> Result<()> {
    if count > MAX_REFINEMENTS {
        invalid_input!(
            "{} must be at most {} (got {}).",
            name,
            MAX_REFINEMENTS,
            count
        );
    }
    Ok(())
}

fn validate_interval(a: f64, b: f64) -> Result<()> {
    if !a.is_finite() || !b.is_finite() {
        invalid_input!("Integration bounds must be finite (got [{}, {}]).", a, b);
    }
    if a >= b {
        invalid_input!("Lower bound must be less than upper bound (got [{}, {}]).", a, b);
    }
    Ok(())
}

fn validate_tolerance(tol: f64) -> Result<()> {
    if !(tol.is_finite() && tol > 0.0) {
        invalid_input!("Tolerance must be positive (got {}).", tol);
    }
    Ok(())
}

/// Single-panel trapezoid (b - a) (f(a) + f(b)) / 2.
fn single_panel(f: &impl RealFunction, a: f64, b: f64) -> f64 {
    0.5 * (b - a) * (f.eval(a) + f.eval(b))
}

/// Refines a composite trapezoid estimate from `panels` to `2 * panels` panels.
fn refine(f: &impl RealFunction, a: f64, b: f64, previous: f64, panels: usize) -> f64 {
    let h = (b - a) / (2 * panels) as f64;
    let odd_sum: f64 = (1..=panels)
        .map(|k| f.eval(a + (2 * k - 1) as f64 * h))
        .sum();
    0.5 * previous + h * odd_sum
}

/// Composite trapezoid rule, doubling the panel count until successive
/// estimates differ by less than `tol`.
///
/// `on_iteration` is called once per doubling, in order, before this
/// function returns. Exhausting `max_iter` doublings is a hard failure that
/// carries the last estimate.
pub fn adaptive_composite_trapezoid(
    f: &impl RealFunction,
    a: f64,
    b: f64,
    tol: f64,
    max_iter: usize,
    mut on_iteration: impl FnMut(&TrapezoidIteration),
) -> Result<TrapezoidResult> {
    validate_interval(a, b)?;
    IterationSettings::new(tol, max_iter).validate()?;
    validate_refinements("max_iter", max_iter)?;

    let mut panels = 1usize;
    let mut value = single_panel(f, a, b);
    let mut error = f64::INFINITY;
    let mut history = Vec::new();

    for iteration in 1..=max_iter {
        let next = refine(f, a, b, value, panels);
        panels *= 2;
        error = (next - value).abs();
        value = next;

        let report = TrapezoidIteration {
            iteration,
            panels,
            value,
            error,
        };
        log::debug!(
            "trapezoid iter {}: n = {}, T = {}, err = {}",
            iteration,
            panels,
            value,
            error
        );
        on_iteration(&report);
        history.push(report);

        if error < tol {
            return Ok(TrapezoidResult {
                value,
                error,
                iterations: iteration,
                panels,
                history,
            });
        }
    }

    log::warn!(
        "adaptive trapezoid did not converge in {} doublings (err = {})",
        max_iter,
        error
    );
    Err(NumericError::NotConverged {
        iterations: max_iter,
        value,
        error,
    })
}

/// Romberg integration returning the extrapolation table.
///
/// Column 0 of row i is the trapezoid estimate with 2^i panels; column j
/// applies Richardson extrapolation
/// `R[i][j] = R[i][j-1] + (R[i][j-1] - R[i-1][j-1]) / (4^j - 1)`.
/// The first entry with |R[i][j] - R[i-1][j-1]| < tol ends the computation,
/// possibly in the middle of a row. Without such an entry R[n_max][n_max] is
/// returned with `converged == false`.
pub fn romberg_integration_with_table(
    f: &impl RealFunction,
    a: f64,
    b: f64,
    n_max: usize,
    tol: f64,
) -> Result<RombergResult> {
    validate_interval(a, b)?;
    if n_max < 1 {
        invalid_input!("n_max must be at least 1 (got {}).", n_max);
    }
    validate_refinements("n_max", n_max)?;
    validate_tolerance(tol)?;

    let mut table: Vec<Vec<f64>> = Vec::with_capacity(n_max + 1);
    table.push(vec![single_panel(f, a, b)]);
    let mut error = f64::INFINITY;

    for i in 1..=n_max {
        let prev = &table[i - 1];
        let mut row = Vec::with_capacity(i + 1);
        row.push(refine(f, a, b, prev[0], 1 << (i - 1)));

        let mut factor = 1.0;
        for j in 1..=i {
            factor *= 4.0;
            let extrapolated = row[j - 1] + (row[j - 1] - prev[j - 1]) / (factor - 1.0);
            error = (extrapolated - prev[j - 1]).abs();
            row.push(extrapolated);

            if error < tol {
                log::debug!(
                    "romberg converged at R[{}][{}] = {} (err = {})",
                    i,
                    j,
                    extrapolated,
                    error
                );
                table.push(row);
                return Ok(RombergResult {
                    value: extrapolated,
                    error,
                    converged: true,
                    table,
                });
            }
        }
        log::debug!("romberg row {}: diagonal = {}, err = {}", i, row[i], error);
        table.push(row);
    }

    let value = table[n_max][n_max];
    log::warn!(
        "romberg did not reach tolerance in {} rows; returning R[{}][{}] = {}",
        n_max,
        n_max,
        n_max,
        value
    );
    Ok(RombergResult {
        value,
        error,
        converged: false,
        table,
    })
}

/// Axis bounds for plotting f over an interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FunctionRange {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Fraction of each axis span added as padding on both sides.
const PADDING: f64 = 0.1;

/// `samples + 1` evenly spaced abscissas over [a, b]; a single point when the
/// interval is degenerate.
fn grid(a: f64, b: f64, samples: usize) -> impl Iterator<Item = f64> {
    let samples = if a == b { 0 } else { samples.max(1) };
    let step = if samples == 0 { 0.0 } else { (b - a) / samples as f64 };
    (0..=samples).map(move |k| if k == samples { b } else { a + k as f64 * step })
}

fn finite_samples<'a>(
    f: &'a impl RealFunction,
    a: f64,
    b: f64,
    samples: usize,
) -> impl Iterator<Item = Sample> + 'a {
    grid(a, b, samples)
        .map(move |x| Sample::new(x, f.eval(x)))
        .filter(|s| s.x.is_finite() && s.y.is_finite())
}

/// Samples f over [a, b] and returns padded axis bounds.
///
/// The y-range always contains 0 so the shaded area under the curve stays
/// visible. Non-finite samples are skipped; with none left the range falls
/// back to [-1, 1]. Never fails.
pub fn calculate_function_range(
    f: &impl RealFunction,
    a: f64,
    b: f64,
    samples: usize,
) -> FunctionRange {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let x_span = hi - lo;
    let x_pad = if x_span > 0.0 { x_span * PADDING } else { 1.0 };

    let mut y_min = 0.0f64;
    let mut y_max = 0.0f64;
    let mut any = false;
    if lo.is_finite() && hi.is_finite() {
        for sample in finite_samples(f, lo, hi, samples) {
            y_min = y_min.min(sample.y);
            y_max = y_max.max(sample.y);
            any = true;
        }
    }
    if !any {
        y_min = -1.0;
        y_max = 1.0;
    }

    let y_span = y_max - y_min;
    let y_pad = if y_span > 0.0 { y_span * PADDING } else { 1.0 };

    FunctionRange {
        x_min: lo - x_pad,
        x_max: hi + x_pad,
        y_min: y_min - y_pad,
        y_max: y_max + y_pad,
    }
}

/// Points of the curve y = f(x) over [x_min, x_max], skipping non-finite values.
pub fn generate_function_curve_data(
    f: &impl RealFunction,
    x_min: f64,
    x_max: f64,
    samples: usize,
) -> Vec<Sample> {
    if !x_min.is_finite() || !x_max.is_finite() || x_min > x_max {
        return Vec::new();
    }
    finite_samples(f, x_min, x_max, samples).collect()
}

/// Closed polygon outlining the area between f and the x-axis over [a, b]:
/// (a, 0), the curve samples, then (b, 0).
pub fn generate_integral_area_data(
    f: &impl RealFunction,
    a: f64,
    b: f64,
    samples: usize,
) -> Vec<Sample> {
    if !a.is_finite() || !b.is_finite() || a > b {
        return Vec::new();
    }
    let mut polygon = Vec::with_capacity(samples + 3);
    polygon.push(Sample::new(a, 0.0));
    polygon.extend(finite_samples(f, a, b, samples));
    polygon.push(Sample::new(b, 0.0));
    polygon
}
