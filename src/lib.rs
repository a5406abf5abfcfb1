//! solprop - Property prediction for industrial NaOH, NaCl and HCl solutions
//!
//! One independently trained regression model per physicochemical property
//! (density, viscosity, vapor pressure, enthalpy, thermal conductivity,
//! bubble-point temperature, concentration), driven by a small set of
//! measured inputs.
//!
//! # Modules
//!
//! ## Core engine
//! - [`property`] - Property keys and input routing
//! - [`features`] - Physics-informed feature expansion
//! - [`model`] - Regression pipelines (polynomial ridge, forest, network)
//! - [`train`] - Training orchestration
//! - [`registry`] - Persisted model registry
//! - [`inference`] - Inference dispatch
//!
//! ## Supporting
//! - [`units`] - Pressure and vapor-pressure unit conversion
//! - [`validate`] - Raw input range validation
//! - [`data`] - Dataset loading
//! - [`summary`] - Exported model summaries
//! - [`cli`] - Command-line interface

pub mod error;

pub mod data;
pub mod features;
pub mod inference;
pub mod model;
pub mod property;
pub mod registry;
pub mod summary;
pub mod train;
pub mod units;
pub mod validate;

pub mod cli;

pub use error::{Result, SolpropError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Result, SolpropError};

    pub use crate::property::{route, PropertyKey, PropertyKind, RawFeature, SolutionType};

    pub use crate::features::{engineer, engineer_matrix, FeatureVector};

    pub use crate::model::{
        PipelineSpec, PipelineVariant, PropertyPipeline, RegressionMetrics,
    };

    pub use crate::train::{pipeline_spec, train_all, FitReport, TrainingSummary};

    pub use crate::registry::{load_registry, ModelEntry, ModelRegistry};

    pub use crate::inference::{
        predict, predict_all, Prediction, PredictionRequest, PredictionResult,
    };

    pub use crate::units::{convert_pressure, convert_vapor_pressure};

    pub use crate::validate::validate_inputs;

    pub use crate::summary::{summarize, ModelSummary};
}
