//! Fixed-step initial-value solvers.
//!
//! The steppers work on vector systems through [`OdeSystem`]; the scalar
//! drivers [`improved_euler`] and [`runge_kutta4`] wrap a two-argument
//! function in a one-dimensional system.

use crate::error::{invalid_input, Result};
use crate::traits::{OdeFunction, OdeSystem, Scalar, ScalarOde, Steppable};
use serde::{Deserialize, Serialize};

/// Improved Euler (Heun) predictor-corrector.
pub struct Heun<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    predictor: Vec<T>,
}

impl<T: Scalar> Heun<T> {
    pub fn new(dim: usize) -> Self {
        let z = T::zero();
        Self {
            k1: vec![z; dim],
            k2: vec![z; dim],
            predictor: vec![z; dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for Heun<T> {
    fn step(&mut self, system: &impl OdeSystem<T>, x: &mut T, state: &mut [T], h: T) {
        let half = T::one() / (T::one() + T::one());
        let x0 = *x;

        // k1 = f(x, y); predictor y_p = y + h*k1
        system.apply(x0, state, &mut self.k1);
        for i in 0..state.len() {
            self.predictor[i] = state[i] + h * self.k1[i];
        }

        // k2 = f(x + h, y_p)
        system.apply(x0 + h, &self.predictor, &mut self.k2);

        // y_next = y + h/2 * (k1 + k2)
        for i in 0..state.len() {
            state[i] = state[i] + h * half * (self.k1[i] + self.k2[i]);
        }

        *x = x0 + h;
    }
}

/// Classic Runge-Kutta 4th Order Solver
pub struct RK4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> RK4<T> {
    pub fn new(dim: usize) -> Self {
        let z = T::zero();
        Self {
            k1: vec![z; dim],
            k2: vec![z; dim],
            k3: vec![z; dim],
            k4: vec![z; dim],
            tmp: vec![z; dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for RK4<T> {
    fn step(&mut self, system: &impl OdeSystem<T>, x: &mut T, state: &mut [T], h: T) {
        let two = T::one() + T::one();
        let half = T::one() / two;
        let sixth = T::one() / (two + two + two);

        let x0 = *x;

        // k1 = f(x, y)
        system.apply(x0, state, &mut self.k1);

        // k2 = f(x + h/2, y + h*k1/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + h * self.k1[i] * half;
        }
        system.apply(x0 + h * half, &self.tmp, &mut self.k2);

        // k3 = f(x + h/2, y + h*k2/2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + h * self.k2[i] * half;
        }
        system.apply(x0 + h * half, &self.tmp, &mut self.k3);

        // k4 = f(x + h, y + h*k3)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + h * self.k3[i];
        }
        system.apply(x0 + h, &self.tmp, &mut self.k4);

        // y_next = y + h/6 * (k1 + 2k2 + 2k3 + k4)
        for i in 0..state.len() {
            state[i] = state[i]
                + h * sixth * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]);
        }

        *x = x0 + h;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OdeMethod {
    ImprovedEuler,
    #[serde(rename = "rk4")]
    RungeKutta4,
}

impl OdeMethod {
    fn build(self, dim: usize) -> InternalStepper {
        match self {
            OdeMethod::ImprovedEuler => InternalStepper::Heun(Heun::new(dim)),
            OdeMethod::RungeKutta4 => InternalStepper::Rk4(RK4::new(dim)),
        }
    }
}

enum InternalStepper {
    Heun(Heun<f64>),
    Rk4(RK4<f64>),
}

impl InternalStepper {
    fn step(&mut self, system: &impl OdeSystem<f64>, x: &mut f64, state: &mut [f64], h: f64) {
        match self {
            InternalStepper::Heun(s) => s.step(system, x, state, h),
            InternalStepper::Rk4(s) => s.step(system, x, state, h),
        }
    }
}

/// Sampled solution of a scalar problem: the initial point plus one point per step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Trajectory {
    /// Final (x, y) pair.
    pub fn last(&self) -> (f64, f64) {
        let n = self.xs.len() - 1;
        (self.xs[n], self.ys[n])
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemTrajectory {
    pub xs: Vec<f64>,
    pub states: Vec<Vec<f64>>,
}

/// Largest number of steps a single integration will take.
pub const MAX_STEPS: usize = 10_000_000;

fn validate_span(x0: f64, xn: f64, h: f64) -> Result<usize> {
    if !x0.is_finite() || !xn.is_finite() || !h.is_finite() {
        invalid_input!("x0, xn and h must be finite.");
    }
    if h <= 0.0 {
        invalid_input!("Step size h must be positive (got {}).", h);
    }
    if xn <= x0 {
        invalid_input!("xn must be greater than x0 (got x0 = {}, xn = {}).", x0, xn);
    }
    // A remainder within rounding of zero does not earn an extra sliver step.
    let steps = ((xn - x0) / h - 1e-9).ceil().max(1.0);
    if steps > MAX_STEPS as f64 {
        invalid_input!(
            "Step size h = {} needs {} steps to reach xn; at most {} are allowed.",
            h,
            steps,
            MAX_STEPS
        );
    }
    Ok(steps as usize)
}

/// Integrates a vector system from (x0, y0) to xn with fixed step h.
///
/// Grid points are x0 + k·h; the last step is shortened so the final point
/// lands exactly on xn.
pub fn integrate_system(
    system: &impl OdeSystem<f64>,
    method: OdeMethod,
    x0: f64,
    y0: &[f64],
    xn: f64,
    h: f64,
) -> Result<SystemTrajectory> {
    let dim = system.dimension();
    if dim == 0 {
        invalid_input!("System has zero dimension.");
    }
    if y0.len() != dim {
        invalid_input!(
            "Initial state dimension mismatch. Expected {}, got {}.",
            dim,
            y0.len()
        );
    }
    if y0.iter().any(|v| !v.is_finite()) {
        invalid_input!("Initial state must be finite.");
    }
    let steps = validate_span(x0, xn, h)?;

    let mut stepper = method.build(dim);
    let mut xs = Vec::with_capacity(steps + 1);
    let mut states = Vec::with_capacity(steps + 1);
    let mut state = y0.to_vec();
    let mut x = x0;
    xs.push(x);
    states.push(state.clone());

    for k in 1..=steps {
        let target = if k == steps { xn } else { x0 + k as f64 * h };
        let step = target - x;
        stepper.step(system, &mut x, &mut state, step);
        x = target;
        xs.push(x);
        states.push(state.clone());
    }

    log::debug!(
        "{:?}: {} steps from x = {} to x = {}",
        method,
        steps,
        x0,
        xn
    );
    Ok(SystemTrajectory { xs, states })
}

fn integrate_scalar(
    f: impl OdeFunction,
    method: OdeMethod,
    x0: f64,
    y0: f64,
    xn: f64,
    h: f64,
) -> Result<Trajectory> {
    if !y0.is_finite() {
        invalid_input!("y0 must be finite (got {}).", y0);
    }
    let system = ScalarOde { f };
    let solution = integrate_system(&system, method, x0, &[y0], xn, h)?;
    Ok(Trajectory {
        xs: solution.xs,
        ys: solution.states.into_iter().map(|s| s[0]).collect(),
    })
}

/// Heun's method for dy/dx = f(x, y), y(x0) = y0, on [x0, xn].
pub fn improved_euler(f: impl OdeFunction, x0: f64, y0: f64, xn: f64, h: f64) -> Result<Trajectory> {
    integrate_scalar(f, OdeMethod::ImprovedEuler, x0, y0, xn, h)
}

/// Classical RK4 for dy/dx = f(x, y), y(x0) = y0, on [x0, xn].
pub fn runge_kutta4(f: impl OdeFunction, x0: f64, y0: f64, xn: f64, h: f64) -> Result<Trajectory> {
    integrate_scalar(f, OdeMethod::RungeKutta4, x0, y0, xn, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NumericError;

    struct Oscillator;

    impl OdeSystem<f64> for Oscillator {
        fn dimension(&self) -> usize {
            2
        }

        fn apply(&self, _x: f64, y: &[f64], out: &mut [f64]) {
            out[0] = y[1];
            out[1] = -y[0];
        }
    }

    fn growth(_x: f64, y: f64) -> f64 {
        y
    }

    #[test]
    fn rk4_is_far_more_accurate_than_improved_euler() {
        let exact = std::f64::consts::E;
        let heun = improved_euler(growth, 0.0, 1.0, 1.0, 0.01).unwrap();
        let rk4 = runge_kutta4(growth, 0.0, 1.0, 1.0, 0.01).unwrap();

        assert_eq!(heun.len(), 101);
        assert_eq!(rk4.len(), 101);

        let (x_end, heun_y) = heun.last();
        assert_eq!(x_end, 1.0);
        let heun_err = (heun_y - exact).abs();
        let rk4_err = (rk4.last().1 - exact).abs();

        assert!(heun_err < 1e-4, "heun error {heun_err}");
        assert!(rk4_err < 1e-9, "rk4 error {rk4_err}");
        assert!(rk4_err * 1e3 < heun_err);
    }

    #[test]
    fn error_orders_match_method_orders() {
        let exact = std::f64::consts::E;
        let heun_err = |h: f64| (improved_euler(growth, 0.0, 1.0, 1.0, h).unwrap().last().1 - exact).abs();
        let rk4_err = |h: f64| (runge_kutta4(growth, 0.0, 1.0, 1.0, h).unwrap().last().1 - exact).abs();

        let heun_ratio = heun_err(0.1) / heun_err(0.05);
        let rk4_ratio = rk4_err(0.1) / rk4_err(0.05);
        assert!((heun_ratio - 4.0).abs() < 0.5, "heun ratio {heun_ratio}");
        assert!((rk4_ratio - 16.0).abs() < 2.0, "rk4 ratio {rk4_ratio}");
    }

    #[test]
    fn final_step_is_clamped_to_xn() {
        let trajectory = runge_kutta4(|_x: f64, _y: f64| 1.0, 0.0, 0.0, 1.0, 0.3).unwrap();
        assert_eq!(trajectory.xs.len(), 5);
        assert!((trajectory.xs[3] - 0.9).abs() < 1e-15);
        assert_eq!(trajectory.xs[4], 1.0);
        // y' = 1 is integrated exactly, so y tracks x through the short last step.
        assert!((trajectory.ys[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn exact_multiple_of_step_adds_no_sliver() {
        let trajectory = improved_euler(growth, 0.0, 1.0, 1.0, 0.1).unwrap();
        assert_eq!(trajectory.len(), 11);
        let widths: Vec<f64> = trajectory.xs.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(widths.iter().all(|w| (w - 0.1).abs() < 1e-12));
    }

    #[test]
    fn rejects_bad_spans() {
        for (x0, xn, h) in [(0.0, 1.0, 0.0), (0.0, 1.0, -0.1), (1.0, 1.0, 0.1), (2.0, 1.0, 0.1)] {
            let err = runge_kutta4(growth, x0, 1.0, xn, h).unwrap_err();
            assert!(matches!(err, NumericError::InvalidInput(_)), "{err:?}");
            let err = improved_euler(growth, x0, 1.0, xn, h).unwrap_err();
            assert!(matches!(err, NumericError::InvalidInput(_)), "{err:?}");
        }
    }

    #[test]
    fn step_counts_beyond_cap_are_rejected() {
        for h in [1e-300, 1e-320, 1.0 / (MAX_STEPS as f64 * 2.0)] {
            let err = improved_euler(|_x: f64, y: f64| y, 0.0, 1.0, 1.0, h).unwrap_err();
            assert!(matches!(err, NumericError::InvalidInput(_)), "{err:?}");
        }
    }

    #[test]
    fn integrates_vector_system() {
        let solution = integrate_system(
            &Oscillator,
            OdeMethod::RungeKutta4,
            0.0,
            &[1.0, 0.0],
            std::f64::consts::PI,
            0.01,
        )
        .unwrap();
        let last = solution.states.last().unwrap();
        assert!((last[0] + 1.0).abs() < 1e-8, "cos(pi) ≈ {}", last[0]);
        assert!(last[1].abs() < 1e-8, "-sin(pi) ≈ {}", last[1]);
        assert_eq!(solution.xs.len(), solution.states.len());

        let err = integrate_system(&Oscillator, OdeMethod::ImprovedEuler, 0.0, &[1.0], 1.0, 0.1)
            .unwrap_err();
        assert!(matches!(err, NumericError::InvalidInput(m) if m.contains("dimension mismatch")));
    }

    #[test]
    fn heun_step_matches_hand_computation() {
        // y' = x + y from (0, 1), h = 0.1:
        // k1 = 1, y_p = 1.1, k2 = 0.1 + 1.1 = 1.2, y1 = 1 + 0.05 * 2.2 = 1.11
        let trajectory = improved_euler(|x: f64, y: f64| x + y, 0.0, 1.0, 0.1, 0.1).unwrap();
        assert_eq!(trajectory.len(), 2);
        assert!((trajectory.ys[1] - 1.11).abs() < 1e-14);
    }

    #[test]
    fn method_selects_matching_stepper() {
        assert!(OdeMethod::RungeKutta4.build(1).is_rk4());
        assert!(!OdeMethod::ImprovedEuler.build(1).is_rk4());
    }

    impl InternalStepper {
        fn is_rk4(&self) -> bool {
            matches!(self, InternalStepper::Rk4(_))
        }
    }
}
