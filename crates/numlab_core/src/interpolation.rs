//! Polynomial interpolation through a set of samples and straight-line least squares.
//!
//! Both interpolation forms evaluate the same unique polynomial of degree n-1
//! through n nodes; Newton's form pays an O(n²) table build once and then
//! evaluates in O(n), Lagrange's form is O(n²) per query.

use crate::error::{invalid_input, Result};
use serde::{Deserialize, Serialize};

/// An (x, y) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

fn validate_nodes(xs: &[f64], ys: &[f64]) -> Result<()> {
    if xs.len() != ys.len() {
        invalid_input!(
            "Node count mismatch: {} x-values but {} y-values.",
            xs.len(),
            ys.len()
        );
    }
    if xs.is_empty() {
        invalid_input!("At least one node is required.");
    }
    for (i, xi) in xs.iter().enumerate() {
        if !xi.is_finite() {
            invalid_input!("Node x[{}] is not finite.", i);
        }
        if let Some(j) = xs[i + 1..].iter().position(|xj| xj == xi) {
            invalid_input!(
                "Duplicate node x = {} at indices {} and {}.",
                xi,
                i,
                i + 1 + j
            );
        }
    }
    Ok(())
}

/// Evaluates the interpolating polynomial at `x` using the Lagrange basis sum.
pub fn lagrange_interpolation(xs: &[f64], ys: &[f64], x: f64) -> Result<f64> {
    validate_nodes(xs, ys)?;

    let mut sum = 0.0;
    for (i, (&xi, &yi)) in xs.iter().zip(ys).enumerate() {
        let mut basis = 1.0;
        for (j, &xj) in xs.iter().enumerate() {
            if j != i {
                basis *= (x - xj) / (xi - xj);
            }
        }
        sum += yi * basis;
    }
    Ok(sum)
}

/// Builds the divided-difference table.
///
/// `table[k]` holds the k-th order differences f[x_i, ..., x_{i+k}] for
/// i in 0..n-k, so the table is triangular with `table[0] == ys`.
pub fn divided_differences(xs: &[f64], ys: &[f64]) -> Result<Vec<Vec<f64>>> {
    validate_nodes(xs, ys)?;

    let n = xs.len();
    let mut table: Vec<Vec<f64>> = Vec::with_capacity(n);
    table.push(ys.to_vec());
    for order in 1..n {
        let prev = &table[order - 1];
        let column: Vec<f64> = (0..n - order)
            .map(|i| (prev[i + 1] - prev[i]) / (xs[i + order] - xs[i]))
            .collect();
        table.push(column);
    }
    Ok(table)
}

/// Coefficients c_k of the Newton form, i.e. the top edge of the divided-difference table.
pub fn newton_coefficients(xs: &[f64], ys: &[f64]) -> Result<Vec<f64>> {
    Ok(divided_differences(xs, ys)?
        .into_iter()
        .map(|column| column[0])
        .collect())
}

/// Evaluates Σ c_k · Π_{i<k} (x - xs[i]) by nested multiplication.
pub fn newton_interpolation(xs: &[f64], ys: &[f64], x: f64) -> Result<f64> {
    let coeffs = newton_coefficients(xs, ys)?;
    let n = coeffs.len();
    let mut value = coeffs[n - 1];
    for k in (0..n - 1).rev() {
        value = value * (x - xs[k]) + coeffs[k];
    }
    Ok(value)
}

/// Least-squares line y = intercept + slope * x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
    pub residual_sum_of_squares: f64,
    pub r_squared: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares through the closed-form normal equations.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Result<LinearFit> {
    if xs.len() != ys.len() {
        invalid_input!(
            "Sample count mismatch: {} x-values but {} y-values.",
            xs.len(),
            ys.len()
        );
    }
    if xs.is_empty() {
        invalid_input!("At least one sample is required.");
    }
    // Rounding can leave n·Σx² − (Σx)² slightly off zero for repeated x.
    if xs.iter().all(|&x| x == xs[0]) {
        invalid_input!("Singular normal equations: all x-values are identical.");
    }

    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xx: f64 = xs.iter().map(|x| x * x).sum();
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom == 0.0 || !denom.is_finite() {
        invalid_input!("Singular normal equations: all x-values are identical.");
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let mut residual_sum_of_squares = 0.0;
    let mut total_sum_of_squares = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let r = y - (intercept + slope * x);
        residual_sum_of_squares += r * r;
        total_sum_of_squares += (y - mean_y) * (y - mean_y);
    }
    let r_squared = if total_sum_of_squares > 0.0 {
        1.0 - residual_sum_of_squares / total_sum_of_squares
    } else {
        1.0
    };

    Ok(LinearFit {
        intercept,
        slope,
        residual_sum_of_squares,
        r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NumericError;

    fn assert_invalid<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
        match result {
            Err(NumericError::InvalidInput(message)) => assert!(
                message.contains(needle),
                "expected error to contain \"{needle}\", got \"{message}\""
            ),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn lagrange_and_newton_agree_between_and_at_nodes() {
        let xs = [-1.5, -0.2, 0.7, 1.1, 2.4, 3.0];
        let ys: Vec<f64> = xs.iter().map(|x: &f64| x.sin() + 0.3 * x * x).collect();

        for (&xi, &yi) in xs.iter().zip(&ys) {
            let l = lagrange_interpolation(&xs, &ys, xi).unwrap();
            let n = newton_interpolation(&xs, &ys, xi).unwrap();
            assert!((l - yi).abs() < 1e-12, "lagrange {l} vs {yi}");
            assert!((n - yi).abs() < 1e-12, "newton {n} vs {yi}");
        }

        for q in [-2.0, -0.9, 0.0, 0.33, 1.8, 2.75, 3.5] {
            let l = lagrange_interpolation(&xs, &ys, q).unwrap();
            let n = newton_interpolation(&xs, &ys, q).unwrap();
            assert!((l - n).abs() < 1e-9, "at {q}: lagrange {l}, newton {n}");
        }
    }

    #[test]
    fn reproduces_polynomials_of_matching_degree() {
        // Three nodes determine a quadratic exactly.
        let xs = [0.0, 1.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x * x - x + 4.0).collect();
        let value = newton_interpolation(&xs, &ys, 2.0).unwrap();
        assert!((value - 10.0).abs() < 1e-12);
        let value = lagrange_interpolation(&xs, &ys, -1.0).unwrap();
        assert!((value - 7.0).abs() < 1e-12);
    }

    #[test]
    fn single_node_is_a_constant() {
        assert_eq!(lagrange_interpolation(&[2.0], &[5.0], 10.0).unwrap(), 5.0);
        assert_eq!(newton_interpolation(&[2.0], &[5.0], -3.0).unwrap(), 5.0);
    }

    #[test]
    fn divided_difference_table_is_triangular() {
        let xs = [1.0, 2.0, 4.0, 7.0];
        let ys = [1.0, 4.0, 16.0, 49.0];
        let table = divided_differences(&xs, &ys).unwrap();
        let lengths: Vec<usize> = table.iter().map(Vec::len).collect();
        assert_eq!(lengths, vec![4, 3, 2, 1]);
        // x² has constant second differences and vanishing third.
        assert!(table[2].iter().all(|c| (c - 1.0).abs() < 1e-12));
        assert!(table[3][0].abs() < 1e-12);

        let coeffs = newton_coefficients(&xs, &ys).unwrap();
        assert_eq!(coeffs[0], 1.0);
        assert!((coeffs[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn interpolation_rejects_bad_nodes() {
        assert_invalid(lagrange_interpolation(&[0.0, 1.0], &[1.0], 0.5), "mismatch");
        assert_invalid(newton_interpolation(&[], &[], 0.5), "At least one node");
        assert_invalid(
            lagrange_interpolation(&[0.0, 1.0, 0.0], &[1.0, 2.0, 3.0], 0.5),
            "Duplicate node",
        );
        assert_invalid(
            newton_interpolation(&[0.0, 1.0, 1.0], &[1.0, 2.0, 3.0], 0.5),
            "Duplicate node",
        );
    }

    #[test]
    fn linear_fit_recovers_exact_line() {
        let xs = [-2.0, 0.0, 1.0, 3.5, 10.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        let fit = linear_fit(&xs, &ys).unwrap();
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!(fit.residual_sum_of_squares < 1e-20);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!((fit.predict(4.0) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn linear_fit_of_noisy_points_minimises_residuals() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 2.0, 2.0, 4.0];
        let fit = linear_fit(&xs, &ys).unwrap();
        assert!((fit.slope - 0.9).abs() < 1e-12);
        assert!((fit.intercept - 0.9).abs() < 1e-12);
        assert!(fit.r_squared < 1.0 && fit.r_squared > 0.0);
    }

    #[test]
    fn linear_fit_rejects_degenerate_inputs() {
        assert_invalid(linear_fit(&[1.0, 2.0], &[1.0]), "mismatch");
        assert_invalid(linear_fit(&[], &[]), "At least one sample");
        assert_invalid(linear_fit(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), "identical");
    }

    #[test]
    fn linear_fit_rejects_repeated_inexact_x_values() {
        let ys: Vec<f64> = (0..7).map(f64::from).collect();
        assert_invalid(linear_fit(&[0.1; 7], &ys), "identical");
        assert_invalid(linear_fit(&[0.7; 5], &ys[..5]), "identical");
    }
}
