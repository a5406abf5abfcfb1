//! Raw input range validation
//!
//! Inputs are checked against their physical ranges before any model is
//! invoked. Every violated rule is collected and reported, not just the
//! first one.

use crate::error::{Result, SolpropError};

/// Valid concentration range, % by mass (inclusive)
pub const CONCENTRATION_RANGE: (f64, f64) = (0.0, 100.0);
/// Valid temperature range, °C (inclusive)
pub const TEMPERATURE_RANGE: (f64, f64) = (-50.0, 500.0);
/// Maximum valid density, kg/m³ (exclusive lower bound at 0)
pub const DENSITY_MAX: f64 = 5000.0;

/// Validate whichever raw inputs are present.
///
/// Returns `Err(OutOfRange)` carrying one message per violated rule.
pub fn validate_inputs(
    x1: Option<f64>,
    x2: Option<f64>,
    x3: Option<f64>,
    x4: Option<f64>,
) -> Result<()> {
    let mut violations = Vec::new();

    if let Some(c) = x1 {
        if !(CONCENTRATION_RANGE.0..=CONCENTRATION_RANGE.1).contains(&c) {
            violations.push(format!("concentration {c} is outside 0-100%"));
        }
    }
    if let Some(t) = x2 {
        if !(TEMPERATURE_RANGE.0..=TEMPERATURE_RANGE.1).contains(&t) {
            violations.push(format!("temperature {t} °C is outside -50 to 500 °C"));
        }
    }
    if let Some(p) = x3 {
        if p <= 0.0 {
            violations.push(format!("pressure {p} must be positive"));
        }
    }
    if let Some(d) = x4 {
        if d <= 0.0 || d > DENSITY_MAX {
            violations.push(format!("density {d} kg/m³ is outside (0, 5000]"));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(SolpropError::OutOfRange(violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_accepted() {
        assert!(validate_inputs(Some(0.0), None, None, None).is_ok());
        assert!(validate_inputs(Some(100.0), None, None, None).is_ok());
        assert!(validate_inputs(None, Some(-50.0), None, None).is_ok());
        assert!(validate_inputs(None, Some(500.0), None, None).is_ok());
        assert!(validate_inputs(None, None, None, Some(5000.0)).is_ok());
    }

    #[test]
    fn test_concentration_rejected_with_range_message() {
        for bad in [-0.001, 100.001] {
            let err = validate_inputs(Some(bad), None, None, None).unwrap_err();
            match err {
                SolpropError::OutOfRange(violations) => {
                    assert_eq!(violations.len(), 1);
                    assert!(violations[0].contains("0-100%"), "{}", violations[0]);
                }
                other => panic!("expected OutOfRange, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_nonpositive_pressure_rejected() {
        assert!(validate_inputs(None, None, Some(0.0), None).is_err());
        assert!(validate_inputs(None, None, Some(-1.0), None).is_err());
        assert!(validate_inputs(None, None, Some(0.5), None).is_ok());
    }

    #[test]
    fn test_all_violations_collected() {
        let err = validate_inputs(Some(150.0), Some(900.0), Some(-2.0), Some(6000.0)).unwrap_err();
        match err {
            SolpropError::OutOfRange(violations) => assert_eq!(violations.len(), 4),
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_absent_inputs_ignored() {
        assert!(validate_inputs(None, None, None, None).is_ok());
    }
}
