//! Median imputation of missing values

use crate::error::{Result, SolpropError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Check if a value is missing (NaN)
#[inline]
pub fn is_missing(v: f64) -> bool {
    v.is_nan()
}

/// Per-column median imputer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedianImputer {
    medians: Option<Array1<f64>>,
}

impl Default for MedianImputer {
    fn default() -> Self {
        Self::new()
    }
}

impl MedianImputer {
    pub fn new() -> Self {
        Self { medians: None }
    }

    /// Compute the per-column medians over non-missing values
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        let n_cols = x.ncols();
        let mut medians = Array1::zeros(n_cols);

        for j in 0..n_cols {
            let mut values: Vec<f64> = x
                .column(j)
                .iter()
                .copied()
                .filter(|v| !is_missing(*v))
                .collect();
            // All-missing column imputes to 0
            medians[j] = if values.is_empty() {
                0.0
            } else {
                values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                }
            };
        }

        self.medians = Some(medians);
        Ok(())
    }

    /// Replace missing values with the fitted medians
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let medians = self.medians.as_ref().ok_or(SolpropError::ModelNotFitted)?;

        if x.ncols() != medians.len() {
            return Err(SolpropError::ShapeError {
                expected: format!("{} columns", medians.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut out = x.clone();
        for j in 0..out.ncols() {
            let median = medians[j];
            for v in out.column_mut(j).iter_mut() {
                if is_missing(*v) {
                    *v = median;
                }
            }
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_median_fills_nan() {
        let x = array![[1.0, 10.0], [f64::NAN, 20.0], [3.0, f64::NAN], [5.0, 40.0]];
        let mut imputer = MedianImputer::new();
        let out = imputer.fit_transform(&x).unwrap();

        assert_eq!(out[[1, 0]], 3.0); // median of 1, 3, 5
        assert_eq!(out[[2, 1]], 20.0); // median of 10, 20, 40
        assert_eq!(out[[0, 0]], 1.0);
    }

    #[test]
    fn test_even_count_median() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let mut imputer = MedianImputer::new();
        imputer.fit(&x).unwrap();

        let probe = array![[f64::NAN]];
        let out = imputer.transform(&probe).unwrap();
        assert_eq!(out[[0, 0]], 2.5);
    }

    #[test]
    fn test_unfitted_errors() {
        let imputer = MedianImputer::new();
        assert!(imputer.transform(&array![[1.0]]).is_err());
    }
}
