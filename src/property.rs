//! Property keys and input routing
//!
//! Every trainable property is identified by a [`PropertyKey`]: the solution
//! type (when the dataset stem carries one) plus the property kind. The
//! routing table maps each key to the raw input columns its model consumes
//! and to whether the advanced feature expansion applies.

use crate::error::{Result, SolpropError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Solution type of an industrial dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SolutionType {
    NaOH,
    NaCl,
    HCl,
}

impl SolutionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolutionType::NaOH => "NaOH",
            SolutionType::NaCl => "NaCl",
            SolutionType::HCl => "HCl",
        }
    }
}

impl FromStr for SolutionType {
    type Err = SolpropError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NaOH" => Ok(SolutionType::NaOH),
            "NaCl" => Ok(SolutionType::NaCl),
            "HCl" => Ok(SolutionType::HCl),
            other => Err(SolpropError::KeyParse(format!(
                "unknown solution type: {other}"
            ))),
        }
    }
}

impl fmt::Display for SolutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of physical property a model predicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PropertyKind {
    Density,
    Viscosity,
    VaporPressure,
    Enthalpy,
    ThermalConductivity,
    BubblePoint,
    Concentration,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Density => "density",
            PropertyKind::Viscosity => "viscosity",
            PropertyKind::VaporPressure => "vapor_pressure",
            PropertyKind::Enthalpy => "enthalpy",
            PropertyKind::ThermalConductivity => "thermal_conductivity",
            PropertyKind::BubblePoint => "bubblepoint",
            PropertyKind::Concentration => "concentration",
        }
    }

    /// Fixed display unit for the predicted value, if the kind has one.
    ///
    /// Vapor pressure reports its canonical unit here; the dispatcher
    /// converts to the requested display unit afterwards.
    pub fn display_unit(&self) -> Option<&'static str> {
        match self {
            PropertyKind::Density => Some("kg/m³"),
            PropertyKind::Viscosity => Some("cP"),
            PropertyKind::VaporPressure => Some("mmHg"),
            PropertyKind::Enthalpy => Some("kcal/kg"),
            PropertyKind::BubblePoint => Some("°C"),
            PropertyKind::ThermalConductivity => None,
            PropertyKind::Concentration => None,
        }
    }
}

impl FromStr for PropertyKind {
    type Err = SolpropError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "density" => Ok(PropertyKind::Density),
            "viscosity" => Ok(PropertyKind::Viscosity),
            "vapor_pressure" => Ok(PropertyKind::VaporPressure),
            "enthalpy" => Ok(PropertyKind::Enthalpy),
            "thermal_conductivity" => Ok(PropertyKind::ThermalConductivity),
            "bubblepoint" => Ok(PropertyKind::BubblePoint),
            "concentration" => Ok(PropertyKind::Concentration),
            other => Err(SolpropError::KeyParse(format!(
                "unknown property kind: {other}"
            ))),
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of one trainable property model.
///
/// Parsed from the dataset file stem: `NaOH_density`, `HCl_vapor_pressure`,
/// or a bare kind such as `viscosity` for the legacy unprefixed datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PropertyKey {
    pub solution: Option<SolutionType>,
    pub kind: PropertyKind,
}

impl PropertyKey {
    pub fn new(solution: Option<SolutionType>, kind: PropertyKind) -> Self {
        Self { solution, kind }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.solution {
            Some(solution) => write!(f, "{}_{}", solution, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl FromStr for PropertyKey {
    type Err = SolpropError;

    fn from_str(stem: &str) -> Result<Self> {
        if let Some((prefix, rest)) = stem.split_once('_') {
            if let Ok(solution) = prefix.parse::<SolutionType>() {
                let kind = rest.parse::<PropertyKind>()?;
                return Ok(PropertyKey::new(Some(solution), kind));
            }
        }
        let kind = stem.parse::<PropertyKind>()?;
        Ok(PropertyKey::new(None, kind))
    }
}

impl From<PropertyKey> for String {
    fn from(key: PropertyKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PropertyKey {
    type Error = SolpropError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// One of the four raw measured inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawFeature {
    /// X1, mass concentration in %
    Concentration,
    /// X2, temperature in °C
    Temperature,
    /// X3, absolute pressure in bar
    Pressure,
    /// X4, density in kg/m³
    Density,
}

impl RawFeature {
    /// Dataset column name
    pub fn column(&self) -> &'static str {
        match self {
            RawFeature::Concentration => "X1",
            RawFeature::Temperature => "X2",
            RawFeature::Pressure => "X3",
            RawFeature::Density => "X4",
        }
    }

    /// Human-readable label used in diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            RawFeature::Concentration => "concentration",
            RawFeature::Temperature => "temperature",
            RawFeature::Pressure => "pressure",
            RawFeature::Density => "density",
        }
    }
}

/// Input requirements of one property model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routing {
    /// Raw input columns, in dataset order
    pub columns: &'static [RawFeature],
    /// Whether the advanced feature expansion applies
    pub engineered: bool,
}

impl Routing {
    /// Dataset column names for the raw inputs
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.column().to_string()).collect()
    }
}

/// Determine the raw input columns and feature-expansion flag for a key.
///
/// The single source of truth for both training-time column selection and
/// inference-time input requirements; the two must never diverge.
pub fn route(key: &PropertyKey) -> Routing {
    use PropertyKind::*;
    use RawFeature as F;

    match key.kind {
        BubblePoint => Routing {
            columns: &[F::Concentration, F::Pressure],
            engineered: false,
        },
        Concentration => Routing {
            columns: &[F::Temperature, F::Density],
            engineered: false,
        },
        VaporPressure if key.solution == Some(SolutionType::HCl) => Routing {
            columns: &[F::Concentration, F::Temperature],
            engineered: true,
        },
        Density | Viscosity | VaporPressure | Enthalpy | ThermalConductivity => Routing {
            columns: &[F::Concentration, F::Temperature],
            engineered: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse_with_solution() {
        let key: PropertyKey = "NaOH_density".parse().unwrap();
        assert_eq!(key.solution, Some(SolutionType::NaOH));
        assert_eq!(key.kind, PropertyKind::Density);
        assert_eq!(key.to_string(), "NaOH_density");
    }

    #[test]
    fn test_key_parse_bare_kind() {
        let key: PropertyKey = "viscosity".parse().unwrap();
        assert_eq!(key.solution, None);
        assert_eq!(key.kind, PropertyKind::Viscosity);
        assert_eq!(key.to_string(), "viscosity");
    }

    #[test]
    fn test_key_parse_multiword_kind() {
        let key: PropertyKey = "HCl_vapor_pressure".parse().unwrap();
        assert_eq!(key.solution, Some(SolutionType::HCl));
        assert_eq!(key.kind, PropertyKind::VaporPressure);

        let bare: PropertyKey = "vapor_pressure".parse().unwrap();
        assert_eq!(bare.solution, None);
        assert_eq!(bare.kind, PropertyKind::VaporPressure);
    }

    #[test]
    fn test_key_parse_rejects_unknown() {
        assert!("NaOH_magnetism".parse::<PropertyKey>().is_err());
        assert!("".parse::<PropertyKey>().is_err());
    }

    #[test]
    fn test_route_bubblepoint() {
        let key: PropertyKey = "NaOH_bubblepoint".parse().unwrap();
        let routing = route(&key);
        assert_eq!(routing.column_names(), vec!["X1", "X3"]);
        assert!(!routing.engineered);
    }

    #[test]
    fn test_route_concentration() {
        let key: PropertyKey = "NaCl_concentration".parse().unwrap();
        let routing = route(&key);
        assert_eq!(routing.column_names(), vec!["X2", "X4"]);
        assert!(!routing.engineered);
    }

    #[test]
    fn test_route_hcl_vapor_pressure_engineered() {
        let key: PropertyKey = "HCl_vapor_pressure".parse().unwrap();
        let routing = route(&key);
        assert_eq!(routing.column_names(), vec!["X1", "X2"]);
        assert!(routing.engineered);
    }

    #[test]
    fn test_route_non_hcl_vapor_pressure_plain() {
        let key: PropertyKey = "NaOH_vapor_pressure".parse().unwrap();
        let routing = route(&key);
        assert_eq!(routing.column_names(), vec!["X1", "X2"]);
        assert!(!routing.engineered);
    }

    #[test]
    fn test_route_default() {
        for stem in ["NaOH_density", "NaCl_enthalpy", "viscosity"] {
            let key: PropertyKey = stem.parse().unwrap();
            let routing = route(&key);
            assert_eq!(routing.column_names(), vec!["X1", "X2"]);
            assert!(!routing.engineered);
        }
    }
}
