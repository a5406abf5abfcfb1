//! Exported model summaries
//!
//! A stable, serializable view of a fitted pipeline (coefficients, degree,
//! architecture) for reporting. Rendering works against this surface only,
//! never against pipeline internals.

use crate::model::{PipelineVariant, Regressor};
use crate::registry::ModelEntry;
use serde::{Deserialize, Serialize};

/// Reportable description of one fitted model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelSummary {
    /// Ridge over polynomial terms. Coefficients apply to standardized
    /// inputs; `terms` are the post-expansion column names.
    Polynomial {
        degree: usize,
        alpha: Option<f64>,
        intercept: Option<f64>,
        coefficients: Vec<f64>,
        terms: Vec<String>,
        log_target: bool,
    },
    Forest {
        n_trees: usize,
        log_target: bool,
    },
    Neural {
        layer_sizes: Vec<usize>,
        log_target: bool,
    },
}

/// Build the summary for a registry entry
pub fn summarize(entry: &ModelEntry) -> ModelSummary {
    let pipeline = &entry.pipeline;
    let log_target = pipeline.spec.log_target;

    match (&pipeline.spec.variant, &pipeline.regressor) {
        (PipelineVariant::Polynomial { degree }, Regressor::Ridge(ridge)) => {
            let terms = pipeline
                .poly
                .as_ref()
                .map(|poly| poly.feature_names(&entry.features))
                .unwrap_or_default();
            ModelSummary::Polynomial {
                degree: *degree,
                alpha: ridge.best_alpha,
                intercept: ridge.intercept(),
                coefficients: ridge
                    .coefficients()
                    .map(|c| c.to_vec())
                    .unwrap_or_default(),
                terms,
                log_target,
            }
        }
        (PipelineVariant::Forest, Regressor::Forest(forest)) => ModelSummary::Forest {
            n_trees: forest.n_trees(),
            log_target,
        },
        (PipelineVariant::Neural, Regressor::Neural(mlp)) => ModelSummary::Neural {
            layer_sizes: mlp.layer_sizes(),
            log_target,
        },
        // A deserialized artifact could in principle disagree with itself;
        // fall back to the variant description
        (PipelineVariant::Polynomial { degree }, _) => ModelSummary::Polynomial {
            degree: *degree,
            alpha: None,
            intercept: None,
            coefficients: Vec::new(),
            terms: Vec::new(),
            log_target,
        },
        (PipelineVariant::Forest, _) => ModelSummary::Forest {
            n_trees: 0,
            log_target,
        },
        (PipelineVariant::Neural, _) => ModelSummary::Neural {
            layer_sizes: Vec::new(),
            log_target,
        },
    }
}

impl ModelSummary {
    /// One-line description of the model
    pub fn describe(&self) -> String {
        match self {
            ModelSummary::Polynomial {
                degree,
                alpha,
                log_target,
                ..
            } => {
                let alpha = alpha
                    .map(|a| format!("{a:.0e}"))
                    .unwrap_or_else(|| "?".to_string());
                let target = if *log_target { ", log target" } else { "" };
                format!("polynomial ridge (degree {degree}, alpha {alpha}{target})")
            }
            ModelSummary::Forest {
                n_trees,
                log_target,
            } => {
                let target = if *log_target { ", log target" } else { "" };
                format!("random forest ({n_trees} trees{target})")
            }
            ModelSummary::Neural {
                layer_sizes,
                log_target,
            } => {
                let arch = layer_sizes
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join("-");
                let target = if *log_target { ", log target" } else { "" };
                format!("neural network ({arch}{target})")
            }
        }
    }

    /// Algebraic rendering for the polynomial variant, over standardized
    /// inputs. None for other variants.
    pub fn formula(&self) -> Option<String> {
        let ModelSummary::Polynomial {
            intercept,
            coefficients,
            terms,
            log_target,
            ..
        } = self
        else {
            return None;
        };
        if coefficients.is_empty() || coefficients.len() != terms.len() {
            return None;
        }

        let lhs = if *log_target { "ln(y)" } else { "y" };
        let mut parts = vec![format!("{:.6}", intercept.unwrap_or(0.0))];
        for (coef, term) in coefficients.iter().zip(terms.iter()) {
            let sign = if *coef >= 0.0 { "+" } else { "-" };
            parts.push(format!("{sign} {:.6}*{term}", coef.abs()));
        }
        Some(format!("{lhs} = {}", parts.join(" ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PipelineSpec, PropertyPipeline};
    use crate::registry::ModelEntry;
    use ndarray::{Array1, Array2};

    fn poly_entry() -> ModelEntry {
        let x = Array2::from_shape_fn((30, 2), |(i, j)| (i as f64) * 0.3 + j as f64);
        let y = Array1::from_shape_fn(30, |i| 2.0 * x[[i, 0]] + x[[i, 1]] + 1.0);
        let mut pipeline = PropertyPipeline::build(PipelineSpec::polynomial(2));
        pipeline.fit(&x, &y).unwrap();
        ModelEntry {
            key: "NaOH_density".parse().unwrap(),
            pipeline,
            features: vec!["X1".to_string(), "X2".to_string()],
        }
    }

    #[test]
    fn test_polynomial_summary_exposes_terms() {
        let entry = poly_entry();
        let summary = summarize(&entry);

        match &summary {
            ModelSummary::Polynomial {
                degree,
                coefficients,
                terms,
                ..
            } => {
                assert_eq!(*degree, 2);
                assert_eq!(terms.len(), 5);
                assert_eq!(coefficients.len(), 5);
                assert_eq!(terms[0], "X1");
                assert_eq!(terms[3], "X1*X2");
            }
            other => panic!("expected polynomial summary, got {other:?}"),
        }

        let formula = summary.formula().unwrap();
        assert!(formula.starts_with("y = "));
        assert!(formula.contains("X1*X2"));
    }

    #[test]
    fn test_describe_variants() {
        let entry = poly_entry();
        let desc = summarize(&entry).describe();
        assert!(desc.contains("degree 2"), "{desc}");
    }
}
