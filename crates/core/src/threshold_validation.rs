//! Shared threshold validation helpers.
//!
//! Provides range-checking functions used when loading threshold
//! configuration.

use crate::error::CoreError;

/// Validate that a value falls within `[0.0, 100.0]`.
///
/// Returns a `CoreError::Validation` naming the field if out of range
/// (NaN is rejected as well).
pub fn validate_percent_range(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0.0 and 100.0, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_boundary_values() {
        assert!(validate_percent_range(0.0, "test").is_ok());
        assert!(validate_percent_range(55.5, "test").is_ok());
        assert!(validate_percent_range(100.0, "test").is_ok());
    }

    #[test]
    fn rejects_below_zero() {
        assert!(validate_percent_range(-0.01, "test").is_err());
    }

    #[test]
    fn rejects_above_hundred() {
        assert!(validate_percent_range(100.01, "test").is_err());
    }

    #[test]
    fn rejects_nan() {
        let err = validate_percent_range(f64::NAN, "max_cpu_percent").unwrap_err();
        assert!(err.to_string().contains("max_cpu_percent"));
    }
}
