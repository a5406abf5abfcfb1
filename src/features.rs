//! Physics-informed feature expansion
//!
//! HCl vapor pressure follows a Clausius-Clapeyron-type curve that a plain
//! polynomial in (X1, X2) fits poorly. The expansion below exposes the
//! relevant nonlinearities (inverse/log/sqrt absolute temperature and their
//! concentration interactions) as explicit columns. The column order is the
//! model contract: training records it and inference must reproduce it
//! bit-for-bit.

use crate::property::{RawFeature, Routing};
use ndarray::Array2;

/// Column names produced by [`engineer`], in output order
pub const ENGINEERED_COLUMNS: [&str; 15] = [
    "X1",
    "X2",
    "inv_T",
    "log_T",
    "sqrt_T",
    "log_X1",
    "sqrt_X1",
    "X1_squared",
    "X1_inv_T",
    "X1_log_T",
    "X1_sqrt_T",
    "X1_X2",
    "X1_X2_inv_T",
    "exp_inv_T",
    "X1_exp_inv_T",
];

/// An ordered feature-name/value mapping fed to a model
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Vec<&'static str>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Build a plain vector from routed raw inputs (no expansion)
    pub fn raw(columns: &[RawFeature], values: Vec<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self {
            names: columns.iter().map(|c| c.column()).collect(),
            values,
        }
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Expand raw concentration and temperature into the 15-column vector.
///
/// Pure and deterministic. With `T_K = x2 + 273.15`, the derived terms are
/// numerically undefined for `x1 < 0` (sqrt) or `T_K <= 0`; callers are
/// expected to have validated ranges beforehand.
pub fn engineer(x1: f64, x2: f64) -> FeatureVector {
    let t_k = x2 + 273.15;
    let inv_t = 1.0 / t_k;
    let log_t = t_k.ln();
    let sqrt_t = t_k.sqrt();
    let exp_inv_t = inv_t.exp();

    let values = vec![
        x1,
        x2,
        inv_t,
        log_t,
        sqrt_t,
        (x1 + 1.0).ln(),
        x1.sqrt(),
        x1 * x1,
        x1 * inv_t,
        x1 * log_t,
        x1 * sqrt_t,
        x1 * x2,
        x1 * x2 * inv_t,
        exp_inv_t,
        x1 * exp_inv_t,
    ];

    FeatureVector {
        names: ENGINEERED_COLUMNS.to_vec(),
        values,
    }
}

/// Row-wise expansion of a two-column (X1, X2) matrix.
///
/// Shares the scalar kernel so training and inference cannot diverge.
pub fn engineer_matrix(x: &Array2<f64>) -> (Vec<&'static str>, Array2<f64>) {
    let n = x.nrows();
    let mut out = Array2::zeros((n, ENGINEERED_COLUMNS.len()));
    for i in 0..n {
        let fv = engineer(x[[i, 0]], x[[i, 1]]);
        for (j, &v) in fv.values().iter().enumerate() {
            out[[i, j]] = v;
        }
    }
    (ENGINEERED_COLUMNS.to_vec(), out)
}

/// Feature names a freshly trained model for this routing would record
pub fn expected_columns(routing: &Routing) -> Vec<String> {
    if routing.engineered {
        ENGINEERED_COLUMNS.iter().map(|s| s.to_string()).collect()
    } else {
        routing.column_names()
    }
}
