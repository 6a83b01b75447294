//! Interpolation and least-squares bindings.

use crate::shared::{core_error, to_js};
use numlab_core::interpolation::{
    divided_differences as core_divided_differences, lagrange_interpolation as core_lagrange,
    linear_fit as core_linear_fit, newton_interpolation as core_newton,
};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn lagrange_interpolation(xs: Vec<f64>, ys: Vec<f64>, x: f64) -> Result<f64, JsValue> {
    core_lagrange(&xs, &ys, x).map_err(|e| core_error("Lagrange interpolation", e))
}

#[wasm_bindgen]
pub fn newton_interpolation(xs: Vec<f64>, ys: Vec<f64>, x: f64) -> Result<f64, JsValue> {
    core_newton(&xs, &ys, x).map_err(|e| core_error("Newton interpolation", e))
}

/// Evaluates both interpolating forms on `[x_min, x_max]` for plotting.
/// Returns `{ xs, lagrange, newton }`.
#[wasm_bindgen]
pub fn interpolation_curve(
    xs: Vec<f64>,
    ys: Vec<f64>,
    x_min: f64,
    x_max: f64,
    samples: u32,
) -> Result<JsValue, JsValue> {
    #[derive(serde::Serialize)]
    struct Curve {
        xs: Vec<f64>,
        lagrange: Vec<f64>,
        newton: Vec<f64>,
    }

    let samples = samples.max(1) as usize;
    let step = (x_max - x_min) / samples as f64;
    let mut curve = Curve {
        xs: Vec::with_capacity(samples + 1),
        lagrange: Vec::with_capacity(samples + 1),
        newton: Vec::with_capacity(samples + 1),
    };
    for k in 0..=samples {
        let x = x_min + k as f64 * step;
        curve.xs.push(x);
        curve
            .lagrange
            .push(core_lagrange(&xs, &ys, x).map_err(|e| core_error("Lagrange interpolation", e))?);
        curve
            .newton
            .push(core_newton(&xs, &ys, x).map_err(|e| core_error("Newton interpolation", e))?);
    }
    to_js(&curve)
}

#[wasm_bindgen]
pub fn divided_differences(xs: Vec<f64>, ys: Vec<f64>) -> Result<JsValue, JsValue> {
    let table =
        core_divided_differences(&xs, &ys).map_err(|e| core_error("Divided differences", e))?;
    to_js(&table)
}

/// Returns `{ intercept, slope, residual_sum_of_squares, r_squared }`.
#[wasm_bindgen]
pub fn linear_fit(xs: Vec<f64>, ys: Vec<f64>) -> Result<JsValue, JsValue> {
    let fit = core_linear_fit(&xs, &ys).map_err(|e| core_error("Linear fit", e))?;
    to_js(&fit)
}
