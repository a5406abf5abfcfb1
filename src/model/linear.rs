//! Ridge regression with cross-validated regularization selection

use crate::error::{Result, SolpropError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Cholesky factorization of a symmetric positive-definite matrix.
/// Returns None if the matrix is not positive definite.
fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Solve L L^T x = b given the Cholesky factor L
fn cholesky_substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = b.len();

    // Forward: L y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward: L^T x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }
    x
}

/// Solve A x = b via Cholesky, retrying once with a small diagonal bump
/// when A is numerically not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    for attempt in 0..2 {
        let m = if attempt == 0 {
            a.clone()
        } else {
            let bump = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
            let mut m = a.clone();
            for k in 0..n {
                m[[k, k]] += bump;
            }
            m
        };
        if let Some(l) = cholesky_factor(&m) {
            return Some(cholesky_substitute(&l, b));
        }
    }
    None
}

/// Solve A x = b by Gaussian elimination with partial pivoting (fallback)
fn gaussian_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // Augmented system [A | b]
    let mut aug = Array2::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        let mut pivot_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[pivot_row, col]].abs() {
                pivot_row = row;
            }
        }
        if aug[[pivot_row, col]].abs() < 1e-12 {
            return None;
        }
        if pivot_row != col {
            for j in 0..=n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[pivot_row, j]];
                aug[[pivot_row, j]] = tmp;
            }
        }
        for row in col + 1..n {
            let factor = aug[[row, col]] / aug[[col, col]];
            for j in col..=n {
                aug[[row, j]] -= factor * aug[[col, j]];
            }
        }
    }

    // Back substitution
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = aug[[i, n]];
        for j in (i + 1)..n {
            sum -= aug[[i, j]] * x[j];
        }
        x[i] = sum / aug[[i, i]];
    }
    Some(x)
}

/// L2-regularized linear regression via centered normal equations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: Option<f64>,
    /// L2 regularization strength
    pub alpha: f64,
    pub is_fitted: bool,
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            alpha,
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples != y.len() {
            return Err(SolpropError::ShapeError {
                expected: format!("y length = {n_samples}"),
                actual: format!("y length = {}", y.len()),
            });
        }

        let x_mean = x.mean_axis(Axis(0)).unwrap();
        let y_mean = y.mean().unwrap_or(0.0);
        let x_c = x - &x_mean.clone().insert_axis(Axis(0));
        let y_c = y - y_mean;

        let mut xtx = x_c.t().dot(&x_c);
        for i in 0..n_features {
            xtx[[i, i]] += self.alpha;
        }
        let xty = x_c.t().dot(&y_c);

        let coefficients = cholesky_solve(&xtx, &xty)
            .or_else(|| gaussian_solve(&xtx, &xty))
            .ok_or_else(|| {
                SolpropError::ComputationError("singular normal equations".to_string())
            })?;

        self.intercept = Some(y_mean - coefficients.dot(&x_mean));
        self.coefficients = Some(coefficients);
        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(SolpropError::ModelNotFitted);
        }
        Ok(x.dot(self.coefficients.as_ref().unwrap()) + self.intercept.unwrap_or(0.0))
    }

    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let p = self.predict(x)?;
        let ym = y.mean().unwrap_or(0.0);
        let ss_res = (&p - y).mapv(|v| v * v).sum();
        let ss_tot = y.mapv(|v| (v - ym).powi(2)).sum();
        Ok(if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot })
    }
}

/// Ridge regression with internal k-fold selection of the regularization
/// strength over a log-spaced grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeCv {
    pub alphas: Vec<f64>,
    pub cv_folds: usize,
    pub best_alpha: Option<f64>,
    inner: RidgeRegression,
    pub is_fitted: bool,
}

impl Default for RidgeCv {
    fn default() -> Self {
        Self::new(Self::log_grid(), 5)
    }
}

impl RidgeCv {
    pub fn new(alphas: Vec<f64>, cv_folds: usize) -> Self {
        Self {
            alphas,
            cv_folds,
            best_alpha: None,
            inner: RidgeRegression::new(1.0),
            is_fitted: false,
        }
    }

    /// 13 log-spaced candidates from 1e-6 to 1e6
    pub fn log_grid() -> Vec<f64> {
        (-6..=6).map(|e| 10f64.powi(e)).collect()
    }

    /// Contiguous fold boundaries, sized base + remainder
    fn fold_ranges(n_samples: usize, n_folds: usize) -> Vec<(usize, usize)> {
        let base = n_samples / n_folds;
        let remainder = n_samples % n_folds;
        let mut ranges = Vec::with_capacity(n_folds);
        let mut start = 0;
        for i in 0..n_folds {
            let size = if i < remainder { base + 1 } else { base };
            ranges.push((start, start + size));
            start += size;
        }
        ranges
    }

    fn gather(x: &Array2<f64>, y: &Array1<f64>, rows: &[usize]) -> (Array2<f64>, Array1<f64>) {
        let xg = x.select(Axis(0), rows);
        let yg = Array1::from_vec(rows.iter().map(|&i| y[i]).collect());
        (xg, yg)
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();

        // Too few rows for a split: skip the search, use the grid midpoint
        let best_alpha = if n_samples < self.cv_folds.max(2) {
            self.alphas
                .get(self.alphas.len() / 2)
                .copied()
                .unwrap_or(1.0)
        } else {
            self.search_alpha(x, y)?
        };

        self.inner = RidgeRegression::new(best_alpha);
        self.inner.fit(x, y)?;
        self.best_alpha = Some(best_alpha);
        self.is_fitted = true;
        Ok(self)
    }

    fn search_alpha(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let n_samples = x.nrows();
        let ranges = Self::fold_ranges(n_samples, self.cv_folds);

        let mut best = (f64::INFINITY, self.alphas[0]);
        for &alpha in &self.alphas {
            let mut total_mse = 0.0;
            let mut n_folds_used = 0;

            for &(lo, hi) in &ranges {
                let test_rows: Vec<usize> = (lo..hi).collect();
                let train_rows: Vec<usize> = (0..n_samples).filter(|i| *i < lo || *i >= hi).collect();
                if test_rows.is_empty() || train_rows.is_empty() {
                    continue;
                }

                let (x_tr, y_tr) = Self::gather(x, y, &train_rows);
                let (x_te, y_te) = Self::gather(x, y, &test_rows);

                let mut model = RidgeRegression::new(alpha);
                if model.fit(&x_tr, &y_tr).is_err() {
                    continue;
                }
                let pred = model.predict(&x_te)?;
                let mse = (&pred - &y_te).mapv(|v| v * v).mean().unwrap_or(f64::INFINITY);
                total_mse += mse;
                n_folds_used += 1;
            }

            if n_folds_used == 0 {
                continue;
            }
            let mean_mse = total_mse / n_folds_used as f64;
            if mean_mse < best.0 {
                best = (mean_mse, alpha);
            }
        }
        Ok(best.1)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(SolpropError::ModelNotFitted);
        }
        self.inner.predict(x)
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.inner.coefficients.as_ref()
    }

    pub fn intercept(&self) -> Option<f64> {
        self.inner.intercept
    }
}
