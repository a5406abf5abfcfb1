//! Feature standardization

use crate::error::{Result, SolpropError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Z-score standardization: (x - mean) / std, per column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            mean: None,
            scale: None,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(SolpropError::DataError(
                "cannot fit scaler on empty data".to_string(),
            ));
        }

        let mean = x.mean_axis(Axis(0)).unwrap();
        // Constant columns keep scale 1 so they pass through centered
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s == 0.0 { 1.0 } else { s });

        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(())
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (mean, scale) = match (&self.mean, &self.scale) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(SolpropError::ModelNotFitted),
        };

        if x.ncols() != mean.len() {
            return Err(SolpropError::ShapeError {
                expected: format!("{} columns", mean.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let centered = x - &mean.clone().insert_axis(Axis(0));
        Ok(&centered / &scale.clone().insert_axis(Axis(0)))
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
    fn test_standardizes_columns() {
        let x = array![[1.0, 100.0], [2.0, 200.0], [3.0, 300.0], [4.0, 400.0], [5.0, 500.0]];
        let mut scaler = StandardScaler::new();
        let out = scaler.fit_transform(&x).unwrap();

        for j in 0..2 {
            let mean: f64 = out.column(j).mean().unwrap();
            let std: f64 = out.column(j).std(0.0);
            assert!(mean.abs() < 1e-10);
            assert!((std - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_constant_column_passes_through() {
        let x = array![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0]];
        let mut scaler = StandardScaler::new();
        let out = scaler.fit_transform(&x).unwrap();
        for i in 0..3 {
            assert_eq!(out[[i, 1]], 0.0);
        }
    }

    #[test]
    fn test_transform_uses_fit_statistics() {
        let train = array![[0.0], [10.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(&train).unwrap();

        let out = scaler.transform(&array![[5.0]]).unwrap();
        assert!(out[[0, 0]].abs() < 1e-10); // 5 is the training mean
    }
}
