//! Conversions shared by the binding modules.

use crate::expression::Expression;
use numlab_core::solvers::OdeMethod;
use numlab_core::{IterationSettings, NumericError};
use serde::{de::DeserializeOwned, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

pub(crate) fn from_js<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

pub(crate) fn core_error(operation: &str, err: NumericError) -> JsValue {
    JsValue::from_str(&format!("{} failed: {}", operation, err))
}

pub(crate) fn compile_univariate(source: &str) -> Result<Expression, JsValue> {
    Expression::univariate(source).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}

pub(crate) fn compile_bivariate(source: &str) -> Result<Expression, JsValue> {
    Expression::bivariate(source).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}

/// Decodes an optional `{ tolerance, max_iterations }` object; `undefined`
/// or `null` selects the defaults.
pub(crate) fn settings_or_default(settings: JsValue) -> Result<IterationSettings, JsValue> {
    if settings.is_undefined() || settings.is_null() {
        return Ok(IterationSettings::default());
    }
    from_js(settings, "settings")
}

pub(crate) fn parse_method(name: &str) -> Result<OdeMethod, String> {
    match name {
        "improved_euler" | "heun" => Ok(OdeMethod::ImprovedEuler),
        "rk4" | "runge_kutta4" => Ok(OdeMethod::RungeKutta4),
        _ => Err(format!("Unknown ODE method: {}", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_method;
    use numlab_core::solvers::OdeMethod;

    #[test]
    fn method_names_map_to_steppers() {
        assert_eq!(parse_method("rk4"), Ok(OdeMethod::RungeKutta4));
        assert_eq!(parse_method("heun"), Ok(OdeMethod::ImprovedEuler));
        assert_eq!(parse_method("improved_euler"), Ok(OdeMethod::ImprovedEuler));
        assert!(parse_method("tsit5").unwrap_err().contains("tsit5"));
    }
}
