//! WebAssembly bridge for `numlab_core`. Functions are passed in as formula
//! strings and compiled by [`expression`] before reaching the core routines.

use wasm_bindgen::prelude::*;

pub mod calculus;
pub mod expression;
pub mod fit;
pub mod linear;
mod shared;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Compiles `source` over the variables `x` (and `y` when `bivariate`) and
/// reports the first parse error, so callers can validate input as it is typed.
#[wasm_bindgen]
pub fn check_expression(source: &str, bivariate: bool) -> Result<(), JsValue> {
    if bivariate {
        shared::compile_bivariate(source).map(|_| ())
    } else {
        shared::compile_univariate(source).map(|_| ())
    }
}

#[wasm_bindgen]
pub fn evaluate_expression(source: &str, x: f64) -> Result<f64, JsValue> {
    Ok(shared::compile_univariate(source)?.eval_x(x))
}
