//! Error taxonomy shared by every algorithm in the crate.

use thiserror::Error;

/// Failure raised by a numerical routine.
///
/// Every failure is local to the call that produced it; nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericError {
    /// Malformed arguments: mismatched lengths, degenerate interval, non-positive tolerance.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A domain precondition did not hold before iterating.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// Diagonal entry too close to zero to divide by.
    #[error("singular pivot at row {row} (|a_ii| = {pivot:e})")]
    SingularPivot { row: usize, pivot: f64 },

    /// Newton step would divide by a vanishing derivative.
    #[error("derivative too small at x = {x} (f'(x) = {derivative:e})")]
    DerivativeTooSmall { x: f64, derivative: f64 },

    /// Iteration budget exhausted before the tolerance was met.
    #[error("failed to converge in {iterations} iterations (value = {value}, error = {error:e})")]
    NotConverged {
        iterations: usize,
        value: f64,
        error: f64,
    },
}

pub type Result<T> = std::result::Result<T, NumericError>;

/// Shorthand for `Err(NumericError::InvalidInput(..))` with `format!` arguments.
macro_rules! invalid_input {
    ($($arg:tt)*) => {
        return Err($crate::error::NumericError::InvalidInput(format!($($arg)*)))
    };
}

pub(crate) use invalid_input;

#[cfg(test)]
mod tests {
    use super::NumericError;

    #[test]
    fn messages_name_the_failure() {
        let err = NumericError::SingularPivot { row: 2, pivot: 0.0 };
        assert!(err.to_string().contains("row 2"));

        let err = NumericError::NotConverged {
            iterations: 5,
            value: 1.5,
            error: 0.25,
        };
        let message = err.to_string();
        assert!(message.contains("5 iterations"), "{message}");
        assert!(message.contains("1.5"), "{message}");
    }
}
