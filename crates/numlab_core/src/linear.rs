//! Stationary iterative solvers for A x = b (Jacobi, Gauss-Seidel) and the
//! diagnostics used to judge them.
//!
//! Matrices are square, row-major `&[Vec<f64>]`. Both iterations stop when
//! the infinity norm of the change between successive iterates drops below
//! the tolerance; running out of iterations still returns the last iterate
//! with `converged == false`.

use crate::error::{invalid_input, NumericError, Result};
use crate::records::{max_abs_diff, IterationRecord};
use crate::settings::IterationSettings;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Smallest |a_ii| the iterations will divide by.
pub const MIN_PIVOT: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSolveResult {
    pub solution: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
    pub history: Vec<IterationRecord<Vec<f64>>>,
}

impl LinearSolveResult {
    /// Infinity-norm step of the final iteration.
    pub fn error(&self) -> f64 {
        self.history.last().map_or(0.0, |r| r.error)
    }

    pub fn into_converged(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(NumericError::NotConverged {
                iterations: self.iterations,
                value: self.solution.iter().fold(0.0, |m: f64, v| m.max(v.abs())),
                error: self.error(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    Jacobi,
    GaussSeidel,
}

fn validate_system(a: &[Vec<f64>], b: &[f64]) -> Result<usize> {
    let n = a.len();
    if n == 0 {
        invalid_input!("Matrix must have at least one row.");
    }
    if let Some((i, row)) = a.iter().enumerate().find(|(_, row)| row.len() != n) {
        invalid_input!(
            "Matrix must be square: row {} has {} entries, expected {}.",
            i,
            row.len(),
            n
        );
    }
    if b.len() != n {
        invalid_input!(
            "Right-hand side dimension mismatch. Expected {}, got {}.",
            n,
            b.len()
        );
    }
    Ok(n)
}

fn iterate(
    sweep: Sweep,
    a: &[Vec<f64>],
    b: &[f64],
    x0: &[f64],
    tol: f64,
    max_iter: usize,
) -> Result<LinearSolveResult> {
    let n = validate_system(a, b)?;
    if x0.len() != n {
        invalid_input!(
            "Initial guess dimension mismatch. Expected {}, got {}.",
            n,
            x0.len()
        );
    }
    IterationSettings::new(tol, max_iter).validate()?;

    let mut previous = x0.to_vec();
    let mut history = Vec::new();

    for iteration in 1..=max_iter {
        // Jacobi reads only `previous`; Gauss-Seidel reads `current`, which
        // holds updated entries for j < i and stale ones for j > i.
        let mut current = previous.clone();
        for i in 0..n {
            let pivot = a[i][i];
            if pivot.abs() < MIN_PIVOT {
                return Err(NumericError::SingularPivot { row: i, pivot });
            }
            let source = match sweep {
                Sweep::Jacobi => &previous,
                Sweep::GaussSeidel => &current,
            };
            let off_diagonal: f64 = a[i]
                .iter()
                .zip(source.iter())
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, (aij, xj))| aij * xj)
                .sum();
            current[i] = (b[i] - off_diagonal) / pivot;
        }

        let error = max_abs_diff(&current, &previous);
        log::debug!("{:?} iter {}: |dx|_inf = {}", sweep, iteration, error);
        history.push(IterationRecord::new(iteration, current.clone(), error));
        previous = current;

        if error < tol {
            return Ok(LinearSolveResult {
                solution: previous,
                iterations: iteration,
                converged: true,
                history,
            });
        }
    }

    log::warn!(
        "{:?} did not converge in {} iterations (|dx|_inf = {})",
        sweep,
        max_iter,
        history.last().map_or(f64::NAN, |r| r.error)
    );
    Ok(LinearSolveResult {
        solution: previous,
        iterations: max_iter,
        converged: false,
        history,
    })
}

/// Jacobi iteration: every component of x^(k) is computed from x^(k-1).
pub fn jacobi(
    a: &[Vec<f64>],
    b: &[f64],
    x0: &[f64],
    tol: f64,
    max_iter: usize,
) -> Result<LinearSolveResult> {
    iterate(Sweep::Jacobi, a, b, x0, tol, max_iter)
}

/// Gauss-Seidel iteration: components updated earlier in the sweep are used immediately.
pub fn gauss_seidel(
    a: &[Vec<f64>],
    b: &[f64],
    x0: &[f64],
    tol: f64,
    max_iter: usize,
) -> Result<LinearSolveResult> {
    iterate(Sweep::GaussSeidel, a, b, x0, tol, max_iter)
}

/// Strict row diagonal dominance, |a_ii| > Σ_{j≠i} |a_ij| for every row.
pub fn is_diagonally_dominant(a: &[Vec<f64>]) -> bool {
    a.iter().enumerate().all(|(i, row)| {
        let off: f64 = row
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, v)| v.abs())
            .sum();
        row.get(i).map_or(false, |d| d.abs() > off)
    })
}

/// Infinity norm of b - A x.
pub fn residual_norm(a: &[Vec<f64>], x: &[f64], b: &[f64]) -> Result<f64> {
    let n = validate_system(a, b)?;
    if x.len() != n {
        invalid_input!("Solution dimension mismatch. Expected {}, got {}.", n, x.len());
    }
    Ok(a.iter()
        .zip(b)
        .map(|(row, bi)| {
            let ax: f64 = row.iter().zip(x).map(|(aij, xj)| aij * xj).sum();
            (bi - ax).abs()
        })
        .fold(0.0, f64::max))
}

/// Direct LU solve, used as a reference for the iterative answers.
pub fn solve_direct(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = validate_system(a, b)?;
    let flat: Vec<f64> = a.iter().flatten().copied().collect();
    let matrix = DMatrix::from_row_slice(n, n, &flat);
    let rhs = DVector::from_column_slice(b);
    let lu = matrix.lu();
    let u = lu.u();
    if let Some(step) = (0..n).find(|&i| u[(i, i)].abs() < MIN_PIVOT) {
        // Map the elimination step back to the caller's row numbering.
        let mut order = DVector::from_iterator(n, 0..n);
        lu.p().permute_rows(&mut order);
        return Err(NumericError::SingularPivot {
            row: order[step],
            pivot: u[(step, step)],
        });
    }
    lu.solve(&rhs)
        .map(|v| v.iter().cloned().collect())
        .ok_or(NumericError::SingularPivot { row: 0, pivot: 0.0 })
}
