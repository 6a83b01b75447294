//! Linear-system bindings. Matrices cross the boundary as arrays of rows.

use crate::shared::{core_error, from_js, settings_or_default, to_js};
use numlab_core::linear::{
    gauss_seidel as core_gauss_seidel, is_diagonally_dominant as core_is_dominant,
    jacobi as core_jacobi, residual_norm as core_residual_norm, solve_direct as core_solve_direct,
    LinearSolveResult,
};
use numlab_core::{IterationSettings, Result as CoreResult};
use wasm_bindgen::prelude::*;

type IterativeSolver = fn(&[Vec<f64>], &[f64], &[f64], f64, usize) -> CoreResult<LinearSolveResult>;

fn run_iterative(
    name: &str,
    solver: IterativeSolver,
    matrix: JsValue,
    b: Vec<f64>,
    x0: Option<Vec<f64>>,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    let a: Vec<Vec<f64>> = from_js(matrix, "matrix")?;
    let IterationSettings {
        tolerance,
        max_iterations,
    } = settings_or_default(settings)?;
    let x0 = x0.unwrap_or_else(|| vec![0.0; b.len()]);
    let result = solver(&a, &b, &x0, tolerance, max_iterations).map_err(|e| core_error(name, e))?;
    to_js(&result)
}

/// Returns `{ solution, iterations, converged, history }`. `x0` defaults to zeros.
#[wasm_bindgen]
pub fn jacobi(
    matrix: JsValue,
    b: Vec<f64>,
    x0: Option<Vec<f64>>,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    run_iterative("Jacobi", core_jacobi, matrix, b, x0, settings)
}

#[wasm_bindgen]
pub fn gauss_seidel(
    matrix: JsValue,
    b: Vec<f64>,
    x0: Option<Vec<f64>>,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    run_iterative("Gauss-Seidel", core_gauss_seidel, matrix, b, x0, settings)
}

#[wasm_bindgen]
pub fn is_diagonally_dominant(matrix: JsValue) -> Result<bool, JsValue> {
    let a: Vec<Vec<f64>> = from_js(matrix, "matrix")?;
    Ok(core_is_dominant(&a))
}

/// Infinity norm of b - A x.
#[wasm_bindgen]
pub fn residual_norm(matrix: JsValue, x: Vec<f64>, b: Vec<f64>) -> Result<f64, JsValue> {
    let a: Vec<Vec<f64>> = from_js(matrix, "matrix")?;
    core_residual_norm(&a, &x, &b).map_err(|e| core_error("Residual", e))
}

/// LU reference solution, for comparing against the iterative methods.
#[wasm_bindgen]
pub fn solve_direct(matrix: JsValue, b: Vec<f64>) -> Result<Vec<f64>, JsValue> {
    let a: Vec<Vec<f64>> = from_js(matrix, "matrix")?;
    core_solve_direct(&a, &b).map_err(|e| core_error("Direct solve", e))
}
