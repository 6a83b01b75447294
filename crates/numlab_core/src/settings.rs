use crate::error::{invalid_input, Result};
use serde::{Deserialize, Serialize};

/// Stopping rule shared by the iterative methods.
/// Missing fields take their `Default` values when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IterationSettings {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for IterationSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

impl IterationSettings {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            invalid_input!("tolerance must be positive (got {}).", self.tolerance);
        }
        if self.max_iterations == 0 {
            invalid_input!("max_iterations must be greater than zero.");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::IterationSettings;
    use crate::error::NumericError;
    use serde::de::value::{Error as ValueError, MapDeserializer};
    use serde::Deserialize;

    #[test]
    fn default_settings_are_valid() {
        assert!(IterationSettings::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_tolerance_and_zero_cap() {
        for tolerance in [0.0, -1e-3, f64::NAN] {
            let err = IterationSettings::new(tolerance, 10).validate().unwrap_err();
            assert!(matches!(err, NumericError::InvalidInput(_)));
        }
        let err = IterationSettings::new(1e-6, 0).validate().unwrap_err();
        assert!(matches!(err, NumericError::InvalidInput(m) if m.contains("max_iterations")));
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let tolerance_only: MapDeserializer<_, ValueError> =
            MapDeserializer::new(vec![("tolerance", 1e-8)].into_iter());
        let settings = IterationSettings::deserialize(tolerance_only).unwrap();
        assert_eq!(settings, IterationSettings::new(1e-8, 100));

        let cap_only: MapDeserializer<_, ValueError> =
            MapDeserializer::new(vec![("max_iterations", 250u64)].into_iter());
        let settings = IterationSettings::deserialize(cap_only).unwrap();
        assert_eq!(settings, IterationSettings::new(1e-6, 250));
    }
}
