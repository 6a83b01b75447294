pub mod error;
pub mod interpolation;
pub mod linear;
pub mod quadrature;
pub mod records;
pub mod roots;
pub mod settings;
pub mod solvers;
/// The `numlab_core` crate is the computational engine behind the numlab teaching tool.
/// Every algorithm is a stateless function over plain numbers and caller-supplied callables;
/// expression parsing and rendering live outside this crate.
///
/// Key components:
/// - **Traits**: `RealFunction` / `OdeFunction` (callables), `OdeSystem` and `Steppable` (ODE steppers).
/// - **Interpolation**: Lagrange and Newton forms, divided differences, least-squares lines.
/// - **Roots**: bisection and Newton-Raphson with iteration histories.
/// - **Solvers**: improved Euler (Heun) and RK4.
/// - **Quadrature**: adaptive composite trapezoid, Romberg table, plot sampling helpers.
/// - **Linear**: Jacobi and Gauss-Seidel with a direct reference solve.
pub mod traits;

pub use error::{NumericError, Result};
pub use records::IterationRecord;
pub use settings::IterationSettings;
