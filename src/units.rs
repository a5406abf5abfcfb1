//! Pressure and vapor-pressure unit conversion
//!
//! Models consume pressure in bar absolute and emit vapor pressure in mmHg;
//! everything else is display-side conversion. Unknown unit tokens pass
//! through unchanged rather than failing, so an unrecognized selection
//! degrades to the canonical unit instead of blocking a prediction.

/// Pressure input conversion factors to bar absolute
const PRESSURE_TO_BAR: [(&str, f64); 4] = [
    ("bar.A", 1.0),
    ("kPa.A", 0.01),
    ("MPa.A", 10.0),
    ("kg/cm2.A", 0.980665),
];

/// Vapor pressure conversion factors from the canonical mmHg
const VAPOR_FROM_MMHG: [(&str, f64); 6] = [
    ("mmHg", 1.0),
    ("kPa", 0.133322),
    ("bar", 0.00133322),
    ("atm", 0.00131579),
    ("psi", 0.0193368),
    ("torr", 1.0),
];

/// Supported pressure input unit tokens, in display order
pub const PRESSURE_UNITS: [&str; 4] = ["bar.A", "kPa.A", "MPa.A", "kg/cm2.A"];

/// Supported vapor pressure display unit tokens, in display order
pub const VAPOR_PRESSURE_UNITS: [&str; 6] = ["mmHg", "kPa", "bar", "atm", "psi", "torr"];

/// Convert a pressure input to bar absolute. Unknown units pass through.
pub fn convert_pressure(value: f64, unit: &str) -> f64 {
    let factor = PRESSURE_TO_BAR
        .iter()
        .find(|(token, _)| *token == unit)
        .map(|(_, f)| *f)
        .unwrap_or(1.0);
    value * factor
}

/// Conversion factor from canonical mmHg to the target unit.
/// Unknown units map to 1.0 (identity).
pub fn vapor_pressure_factor(target_unit: &str) -> f64 {
    VAPOR_FROM_MMHG
        .iter()
        .find(|(token, _)| *token == target_unit)
        .map(|(_, f)| *f)
        .unwrap_or(1.0)
}

/// Convert a vapor pressure from canonical mmHg to the target unit
pub fn convert_vapor_pressure(value_mmhg: f64, target_unit: &str) -> f64 {
    value_mmhg * vapor_pressure_factor(target_unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressure_factors() {
        assert_eq!(convert_pressure(1.0, "bar.A"), 1.0);
        assert!((convert_pressure(100.0, "kPa.A") - 1.0).abs() < 1e-12);
        assert!((convert_pressure(0.1, "MPa.A") - 1.0).abs() < 1e-12);
        assert!((convert_pressure(1.0, "kg/cm2.A") - 0.980665).abs() < 1e-12);
    }

    #[test]
    fn test_pressure_round_trip() {
        // Convert v in unit u to bar, then express that bar value back in u
        for unit in ["kPa.A", "MPa.A", "kg/cm2.A"] {
            let v = 3.7;
            let bar = convert_pressure(v, unit);
            let factor = convert_pressure(1.0, unit);
            assert!(
                (bar / factor - v).abs() < 1e-12,
                "round trip failed for {unit}"
            );
        }
    }

    #[test]
    fn test_vapor_pressure_factors() {
        assert_eq!(convert_vapor_pressure(760.0, "mmHg"), 760.0);
        assert_eq!(convert_vapor_pressure(760.0, "torr"), 760.0);
        assert!((convert_vapor_pressure(760.0, "kPa") - 101.32472).abs() < 1e-6);
        assert!((convert_vapor_pressure(760.0, "atm") - 1.0000004).abs() < 1e-6);
        assert!((convert_vapor_pressure(1.0, "psi") - 0.0193368).abs() < 1e-12);
    }

    #[test]
    fn test_vapor_pressure_linear_invertible() {
        for unit in VAPOR_PRESSURE_UNITS {
            let x = 123.456;
            let converted = convert_vapor_pressure(x, unit);
            assert!(
                (converted / vapor_pressure_factor(unit) - x).abs() < 1e-9,
                "inversion failed for {unit}"
            );
        }
    }

    #[test]
    fn test_unknown_unit_passes_through() {
        assert_eq!(convert_pressure(5.0, "furlong"), 5.0);
        assert_eq!(convert_vapor_pressure(5.0, "furlong"), 5.0);
    }
}
