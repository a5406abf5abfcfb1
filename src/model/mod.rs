//! Regression pipelines
//!
//! A [`PropertyPipeline`] is the fitted unit stored in the registry: an
//! imputation/scaling/expansion front end, one of three regressor variants,
//! and an optional log-target wrapper (fit on ln(y), predict exp(ŷ), which
//! also guarantees strictly positive outputs).

mod forest;
mod imputer;
mod linear;
pub mod metrics;
mod mlp;
mod polynomial;
mod scaler;
mod tree;

pub use forest::RandomForestRegressor;
pub use imputer::MedianImputer;
pub use linear::{RidgeCv, RidgeRegression};
pub use metrics::RegressionMetrics;
pub use mlp::{MlpConfig, MlpRegressor};
pub use polynomial::PolynomialFeatures;
pub use scaler::StandardScaler;
pub use tree::RegressionTree;

use crate::error::{Result, SolpropError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Regressor variant of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineVariant {
    /// Standardize → polynomial expansion → cross-validated ridge
    Polynomial { degree: usize },
    /// Bagged regression trees
    Forest,
    /// Standardize → feedforward network
    Neural,
}

/// Pipeline construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub variant: PipelineVariant,
    pub log_target: bool,
}

impl PipelineSpec {
    pub fn polynomial(degree: usize) -> Self {
        Self {
            variant: PipelineVariant::Polynomial { degree },
            log_target: false,
        }
    }

    pub fn forest() -> Self {
        Self {
            variant: PipelineVariant::Forest,
            log_target: false,
        }
    }

    pub fn neural() -> Self {
        Self {
            variant: PipelineVariant::Neural,
            log_target: false,
        }
    }

    pub fn with_log_target(mut self, log_target: bool) -> Self {
        self.log_target = log_target;
        self
    }
}

/// The fitted regressor inside a pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Regressor {
    Ridge(RidgeCv),
    Forest(RandomForestRegressor),
    Neural(MlpRegressor),
}

/// One trainable/fitted regression pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyPipeline {
    pub(crate) spec: PipelineSpec,
    pub(crate) imputer: MedianImputer,
    pub(crate) scaler: Option<StandardScaler>,
    pub(crate) poly: Option<PolynomialFeatures>,
    pub(crate) regressor: Regressor,
    pub(crate) is_fitted: bool,
}

impl PropertyPipeline {
    /// Assemble an unfitted pipeline for the given spec
    pub fn build(spec: PipelineSpec) -> Self {
        let (scaler, poly, regressor) = match spec.variant {
            PipelineVariant::Polynomial { degree } => (
                Some(StandardScaler::new()),
                Some(PolynomialFeatures::new(degree)),
                Regressor::Ridge(RidgeCv::default()),
            ),
            PipelineVariant::Forest => (None, None, Regressor::Forest(RandomForestRegressor::default())),
            PipelineVariant::Neural => (
                Some(StandardScaler::new()),
                None,
                Regressor::Neural(MlpRegressor::new(MlpConfig::default())),
            ),
        };

        Self {
            spec,
            imputer: MedianImputer::new(),
            scaler,
            poly,
            regressor,
            is_fitted: false,
        }
    }

    pub fn spec(&self) -> &PipelineSpec {
        &self.spec
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let y_fit = if self.spec.log_target {
            if y.iter().any(|&v| v <= 0.0) {
                return Err(SolpropError::TrainingError(
                    "log-target requires strictly positive targets".to_string(),
                ));
            }
            y.mapv(f64::ln)
        } else {
            y.clone()
        };

        let mut xt = self.imputer.fit_transform(x)?;
        if let Some(scaler) = self.scaler.as_mut() {
            xt = scaler.fit_transform(&xt)?;
        }
        if let Some(poly) = &self.poly {
            xt = poly.transform(&xt)?;
        }

        match &mut self.regressor {
            Regressor::Ridge(m) => {
                m.fit(&xt, &y_fit)?;
            }
            Regressor::Forest(m) => {
                m.fit(&xt, &y_fit)?;
            }
            Regressor::Neural(m) => m.fit(&xt, &y_fit)?,
        }

        self.is_fitted = true;
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let mut xt = self.imputer.transform(x)?;
        if let Some(scaler) = &self.scaler {
            xt = scaler.transform(&xt)?;
        }
        if let Some(poly) = &self.poly {
            xt = poly.transform(&xt)?;
        }
        Ok(xt)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(SolpropError::ModelNotFitted);
        }

        let xt = self.transform(x)?;
        let raw = match &self.regressor {
            Regressor::Ridge(m) => m.predict(&xt)?,
            Regressor::Forest(m) => m.predict(&xt)?,
            Regressor::Neural(m) => m.predict(&xt)?,
        };

        Ok(if self.spec.log_target {
            raw.mapv(f64::exp)
        } else {
            raw
        })
    }

    /// Predict a single sample
    pub fn predict_one(&self, row: &[f64]) -> Result<f64> {
        let x = Array2::from_shape_vec((1, row.len()), row.to_vec())
            .map_err(|e| SolpropError::ShapeError {
                expected: "one feature row".to_string(),
                actual: e.to_string(),
            })?;
        Ok(self.predict(&x)?[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn quadratic_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| (i as f64) * 0.5 + j as f64 * 2.0);
        let y = Array1::from_shape_fn(40, |i| {
            let a = x[[i, 0]];
            let b = x[[i, 1]];
            1.0 + 2.0 * a + 0.3 * a * b + 0.05 * b * b
        });
        (x, y)
    }

    #[test]
    fn test_polynomial_pipeline_fits_quadratic() {
        let (x, y) = quadratic_data();
        let mut pipe = PropertyPipeline::build(PipelineSpec::polynomial(2));
        pipe.fit(&x, &y).unwrap();

        let pred = pipe.predict(&x).unwrap();
        let m = RegressionMetrics::compute(&y, &pred);
        assert!(m.r2 > 0.99, "R² = {}", m.r2);
    }

    #[test]
    fn test_log_target_predictions_positive() {
        // Targets spanning orders of magnitude, strictly positive
        let x = Array2::from_shape_fn((30, 2), |(i, j)| i as f64 + j as f64);
        let y = Array1::from_shape_fn(30, |i| (0.2 * i as f64).exp());

        let mut pipe = PropertyPipeline::build(PipelineSpec::polynomial(3).with_log_target(true));
        pipe.fit(&x, &y).unwrap();

        // Extrapolated probe stays positive through the exp inverse
        let probe = array![[100.0, -40.0], [0.0, 0.0], [-5.0, 2.0]];
        let pred = pipe.predict(&probe).unwrap();
        for v in pred.iter() {
            assert!(*v > 0.0, "log-target prediction {v} must be positive");
        }
    }

    #[test]
    fn test_log_target_rejects_nonpositive_targets() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 0.0, 3.0];
        let mut pipe = PropertyPipeline::build(PipelineSpec::polynomial(2).with_log_target(true));
        assert!(pipe.fit(&x, &y).is_err());
    }

    #[test]
    fn test_forest_pipeline() {
        let x = Array2::from_shape_fn((50, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(50, |i| if i < 25 { 1.0 } else { 3.0 });

        let mut pipe = PropertyPipeline::build(PipelineSpec::forest());
        pipe.fit(&x, &y).unwrap();

        let pred = pipe.predict(&array![[5.0], [45.0]]).unwrap();
        assert!((pred[0] - 1.0).abs() < 0.5);
        assert!((pred[1] - 3.0).abs() < 0.5);
    }

    #[test]
    fn test_pipeline_imputes_missing_inputs() {
        let (x, y) = quadratic_data();
        let mut pipe = PropertyPipeline::build(PipelineSpec::polynomial(2));
        pipe.fit(&x, &y).unwrap();

        let probe = array![[f64::NAN, 4.0]];
        let pred = pipe.predict(&probe).unwrap();
        assert!(pred[0].is_finite());
    }

    #[test]
    fn test_unfitted_pipeline_errors() {
        let pipe = PropertyPipeline::build(PipelineSpec::polynomial(3));
        assert!(pipe.predict(&array![[1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_predict_one_matches_batch() {
        let (x, y) = quadratic_data();
        let mut pipe = PropertyPipeline::build(PipelineSpec::polynomial(2));
        pipe.fit(&x, &y).unwrap();

        let batch = pipe.predict(&array![[3.0, 6.0]]).unwrap();
        let single = pipe.predict_one(&[3.0, 6.0]).unwrap();
        assert_eq!(batch[0].to_bits(), single.to_bits());
    }
}
