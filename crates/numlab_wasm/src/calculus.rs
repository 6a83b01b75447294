//! Root finding, ODE, and quadrature bindings. Every function takes the
//! formula as a string and compiles it once per call.

use crate::shared::{
    compile_bivariate, compile_univariate, core_error, parse_method, settings_or_default, to_js,
};
use numlab_core::quadrature::{
    adaptive_composite_trapezoid as core_trapezoid,
    calculate_function_range as core_function_range,
    generate_function_curve_data as core_curve_data,
    generate_integral_area_data as core_area_data,
    romberg_integration_with_table as core_romberg, TrapezoidIteration,
};
use numlab_core::roots::{bisection as core_bisection, newton_method as core_newton};
use numlab_core::solvers::{improved_euler, runge_kutta4, OdeMethod};
use wasm_bindgen::prelude::*;

/// Bisection on `[a, b]`. `settings` is `{ tolerance, max_iterations }` or undefined.
/// Returns `{ root, iterations, converged, history }`.
#[wasm_bindgen]
pub fn bisection(expression: &str, a: f64, b: f64, settings: JsValue) -> Result<JsValue, JsValue> {
    let f = compile_univariate(expression)?;
    let settings = settings_or_default(settings)?;
    let result = core_bisection(
        &|x: f64| f.eval_x(x),
        a,
        b,
        settings.tolerance,
        settings.max_iterations,
    )
    .map_err(|e| core_error("Bisection", e))?;
    to_js(&result)
}

#[wasm_bindgen]
pub fn newton_method(
    expression: &str,
    derivative: &str,
    x0: f64,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    let f = compile_univariate(expression)?;
    let f_prime = compile_univariate(derivative)?;
    let settings = settings_or_default(settings)?;
    let result = core_newton(
        &|x: f64| f.eval_x(x),
        &|x: f64| f_prime.eval_x(x),
        x0,
        settings.tolerance,
        settings.max_iterations,
    )
    .map_err(|e| core_error("Newton's method", e))?;
    to_js(&result)
}

/// Integrates dy/dx = f(x, y) with `method` = "improved_euler" or "rk4".
/// Returns `{ xs, ys }`.
#[wasm_bindgen]
pub fn solve_ode(
    expression: &str,
    method: &str,
    x0: f64,
    y0: f64,
    xn: f64,
    h: f64,
) -> Result<JsValue, JsValue> {
    let f = compile_bivariate(expression)?;
    let method = parse_method(method).map_err(|e| JsValue::from_str(&e))?;
    let rhs = |x: f64, y: f64| f.eval_xy(x, y);
    let trajectory = match method {
        OdeMethod::ImprovedEuler => improved_euler(rhs, x0, y0, xn, h),
        OdeMethod::RungeKutta4 => runge_kutta4(rhs, x0, y0, xn, h),
    }
    .map_err(|e| core_error("ODE integration", e))?;
    to_js(&trajectory)
}

/// Adaptive composite trapezoid. `on_iteration`, when given, receives
/// `{ iteration, panels, value, error }` once per doubling.
#[wasm_bindgen]
pub fn adaptive_trapezoid(
    expression: &str,
    a: f64,
    b: f64,
    tolerance: f64,
    max_iterations: u32,
    on_iteration: Option<js_sys::Function>,
) -> Result<JsValue, JsValue> {
    let f = compile_univariate(expression)?;
    let mut callback_error: Option<JsValue> = None;

    let result = core_trapezoid(
        &|x: f64| f.eval_x(x),
        a,
        b,
        tolerance,
        max_iterations as usize,
        |report: &TrapezoidIteration| {
            let (Some(callback), None) = (&on_iteration, &callback_error) else {
                return;
            };
            let outcome = serde_wasm_bindgen::to_value(report)
                .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
                .and_then(|payload| callback.call1(&JsValue::NULL, &payload));
            if let Err(err) = outcome {
                callback_error = Some(err);
            }
        },
    );

    if let Some(err) = callback_error {
        return Err(err);
    }
    let result = result.map_err(|e| core_error("Adaptive trapezoid", e))?;
    to_js(&result)
}

/// Romberg integration. Returns `{ value, error, converged, table }`.
#[wasm_bindgen]
pub fn romberg(
    expression: &str,
    a: f64,
    b: f64,
    n_max: u32,
    tolerance: f64,
) -> Result<JsValue, JsValue> {
    let f = compile_univariate(expression)?;
    let result = core_romberg(&|x: f64| f.eval_x(x), a, b, n_max as usize, tolerance)
        .map_err(|e| core_error("Romberg integration", e))?;
    to_js(&result)
}

/// Padded axis bounds `{ x_min, x_max, y_min, y_max }` for plotting f on `[a, b]`.
#[wasm_bindgen]
pub fn function_range(expression: &str, a: f64, b: f64, samples: u32) -> Result<JsValue, JsValue> {
    let f = compile_univariate(expression)?;
    to_js(&core_function_range(&|x: f64| f.eval_x(x), a, b, samples as usize))
}

/// Curve points `[{ x, y }]` with non-finite samples removed.
#[wasm_bindgen]
pub fn function_curve(
    expression: &str,
    x_min: f64,
    x_max: f64,
    samples: u32,
) -> Result<JsValue, JsValue> {
    let f = compile_univariate(expression)?;
    to_js(&core_curve_data(&|x: f64| f.eval_x(x), x_min, x_max, samples as usize))
}

/// Polygon `[{ x, y }]` outlining the integral's area on `[a, b]`.
#[wasm_bindgen]
pub fn integral_area(expression: &str, a: f64, b: f64, samples: u32) -> Result<JsValue, JsValue> {
    let f = compile_univariate(expression)?;
    to_js(&core_area_data(&|x: f64| f.eval_x(x), a, b, samples as usize))
}
