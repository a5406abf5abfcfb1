//! Inference dispatch
//!
//! Reconstructs the feature vector a property model was fitted on from the
//! raw request inputs, invokes the registered pipeline and converts units.
//! The registry is never mutated; a request either yields a value, a
//! per-property skip, or a validation error raised before any model runs.

use crate::error::{Result, SolpropError};
use crate::features::{engineer, FeatureVector};
use crate::property::{route, PropertyKey, PropertyKind, RawFeature, SolutionType};
use crate::registry::ModelRegistry;
use crate::units::{convert_pressure, convert_vapor_pressure};
use crate::validate::validate_inputs;
use serde::{Deserialize, Serialize};

/// Raw user inputs plus display-unit selections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// X1, concentration in %
    pub x1: Option<f64>,
    /// X2, temperature in °C
    pub x2: Option<f64>,
    /// X3, pressure in `pressure_unit`
    pub x3: Option<f64>,
    /// X4, density in kg/m³
    pub x4: Option<f64>,
    /// Unit of the supplied pressure input
    pub pressure_unit: String,
    /// Display unit for vapor-pressure results
    pub vapor_pressure_unit: String,
}

impl Default for PredictionRequest {
    fn default() -> Self {
        Self {
            x1: None,
            x2: None,
            x3: None,
            x4: None,
            pressure_unit: "bar.A".to_string(),
            vapor_pressure_unit: "mmHg".to_string(),
        }
    }
}

impl PredictionRequest {
    fn get(&self, feature: RawFeature) -> Option<f64> {
        match feature {
            RawFeature::Concentration => self.x1,
            RawFeature::Temperature => self.x2,
            RawFeature::Pressure => self.x3,
            RawFeature::Density => self.x4,
        }
    }
}

/// A successful property estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub key: PropertyKey,
    /// Model output in the canonical unit (mmHg for vapor pressure)
    pub raw: f64,
    /// Value converted to the display unit
    pub value: f64,
    /// Display unit, empty when the kind has none
    pub unit: String,
}

/// Outcome of dispatching one property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Prediction {
    Value(PredictionResult),
    Skipped { key: PropertyKey, reason: String },
}

fn contract_matches(produced: &[&'static str], recorded: &[String]) -> bool {
    produced.len() == recorded.len()
        && produced
            .iter()
            .zip(recorded.iter())
            .all(|(a, b)| *a == b.as_str())
}

/// Predict one property from raw inputs.
///
/// Missing required inputs yield a `Skipped` naming the input; out-of-range
/// inputs are rejected before the model is invoked.
pub fn predict(
    registry: &ModelRegistry,
    key: &PropertyKey,
    request: &PredictionRequest,
) -> Result<Prediction> {
    let entry = registry
        .get(key)
        .ok_or_else(|| SolpropError::ModelNotFound(key.to_string()))?;

    let routing = route(key);

    for feature in routing.columns {
        if request.get(*feature).is_none() {
            return Ok(Prediction::Skipped {
                key: *key,
                reason: format!("{} input required", feature.label()),
            });
        }
    }

    validate_inputs(request.x1, request.x2, request.x3, request.x4)?;

    let fv: FeatureVector = if routing.engineered {
        // Routed engineered columns are always (X1, X2)
        engineer(request.x1.unwrap(), request.x2.unwrap())
    } else {
        let values: Vec<f64> = routing
            .columns
            .iter()
            .map(|feature| {
                let value = request.get(*feature).unwrap();
                match feature {
                    RawFeature::Pressure => convert_pressure(value, &request.pressure_unit),
                    _ => value,
                }
            })
            .collect();
        FeatureVector::raw(routing.columns, values)
    };

    if !contract_matches(fv.names(), &entry.features) {
        return Err(SolpropError::ValidationError(format!(
            "feature contract mismatch for {key}: model recorded {:?}, engine produced {:?}",
            entry.features,
            fv.names()
        )));
    }

    let raw = entry.pipeline.predict_one(fv.values())?;

    let result = if key.kind == PropertyKind::VaporPressure {
        let unit = request.vapor_pressure_unit.clone();
        PredictionResult {
            key: *key,
            raw,
            value: convert_vapor_pressure(raw, &unit),
            unit,
        }
    } else {
        PredictionResult {
            key: *key,
            raw,
            value: raw,
            unit: key.kind.display_unit().unwrap_or("").to_string(),
        }
    };

    Ok(Prediction::Value(result))
}

/// Predict every registered property of one solution type.
///
/// Per-property skips are collected alongside values; a validation failure
/// aborts the whole batch with no partial predictions.
pub fn predict_all(
    registry: &ModelRegistry,
    solution: SolutionType,
    request: &PredictionRequest,
) -> Result<Vec<Prediction>> {
    registry
        .entries_for_solution(solution)
        .into_iter()
        .map(|entry| predict(registry, &entry.key, request))
        .collect()
}
