use crate::error::GeneratorError;

/// A running total that only goes up.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MonotonicCounter {
    value: f64,
}

impl MonotonicCounter {
    /// Add a strictly positive delta, returning the new total.
    pub fn increment(&mut self, delta: f64) -> Result<f64, GeneratorError> {
        Self::check_delta(delta)?;
        self.value += delta;
        Ok(self.value)
    }

    /// Current total
    pub fn value(&self) -> f64 {
        self.value
    }

    pub(crate) fn check_delta(delta: f64) -> Result<(), GeneratorError> {
        if delta.is_nan() || delta <= 0.0 {
            return Err(GeneratorError::invalid_argument(format!(
                "counter delta must be > 0, got {delta}"
            )));
        }
        Ok(())
    }
}
