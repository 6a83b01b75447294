use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars by the ODE steppers.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A real function of one variable, f(x).
///
/// Implemented for every `Fn(f64) -> f64`, so closures, function pointers and
/// trait objects can all be passed where the algorithms expect a function.
pub trait RealFunction {
    fn eval(&self, x: f64) -> f64;
}

impl<F> RealFunction for F
where
    F: Fn(f64) -> f64,
{
    fn eval(&self, x: f64) -> f64 {
        self(x)
    }
}

/// Right-hand side of a scalar initial-value problem, dy/dx = f(x, y).
pub trait OdeFunction {
    fn eval(&self, x: f64, y: f64) -> f64;
}

impl<F> OdeFunction for F
where
    F: Fn(f64, f64) -> f64,
{
    fn eval(&self, x: f64, y: f64) -> f64 {
        self(x, y)
    }
}

/// A system of first-order ODEs, dy/dx = f(x, y) with vector-valued y.
pub trait OdeSystem<T: Scalar> {
    /// Returns the number of state components.
    fn dimension(&self) -> usize;

    /// Evaluates the right-hand side.
    /// x: independent variable
    /// y: current state
    /// out: buffer to write dy/dx
    fn apply(&self, x: T, y: &[T], out: &mut [T]);
}

/// A trait for solvers that can step a system forward.
pub trait Steppable<T: Scalar> {
    /// Performs one step of size h.
    /// x: independent variable (updated after step)
    /// state: current state (updated after step)
    /// h: step size
    fn step(&mut self, system: &impl OdeSystem<T>, x: &mut T, state: &mut [T], h: T);
}

/// Adapts a scalar `OdeFunction` into a one-dimensional `OdeSystem<f64>`.
pub struct ScalarOde<F> {
    pub f: F,
}

impl<F: OdeFunction> OdeSystem<f64> for ScalarOde<F> {
    fn dimension(&self) -> usize {
        1
    }

    fn apply(&self, x: f64, y: &[f64], out: &mut [f64]) {
        out[0] = self.f.eval(x, y[0]);
    }
}
