//! Polynomial feature expansion
//!
//! Generates every monomial of total degree 1..=degree over the input
//! columns (no bias term), so a degree-3 expansion of (a, b) yields
//! a, b, a², ab, b², a³, a²b, ab², b³.

use crate::error::{Result, SolpropError};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Stateless polynomial feature generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolynomialFeatures {
    pub degree: usize,
}

impl PolynomialFeatures {
    pub fn new(degree: usize) -> Self {
        Self {
            degree: degree.max(1),
        }
    }

    /// All monomials as sorted index multisets, ascending by total degree
    fn monomials(&self, n_features: usize) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        for degree in 1..=self.degree {
            let mut current = Vec::with_capacity(degree);
            Self::combinations(0, n_features, degree, &mut current, &mut out);
        }
        out
    }

    fn combinations(
        start: usize,
        n_features: usize,
        remaining: usize,
        current: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
    ) {
        if remaining == 0 {
            out.push(current.clone());
            return;
        }
        for idx in start..n_features {
            current.push(idx);
            Self::combinations(idx, n_features, remaining - 1, current, out);
            current.pop();
        }
    }

    /// Number of output columns for the given input width
    pub fn n_output_features(&self, n_features: usize) -> usize {
        self.monomials(n_features).len()
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_features == 0 {
            return Err(SolpropError::DataError(
                "cannot expand zero-column input".to_string(),
            ));
        }

        let monomials = self.monomials(n_features);
        let mut out = Array2::zeros((n_samples, monomials.len()));

        for i in 0..n_samples {
            for (j, monomial) in monomials.iter().enumerate() {
                out[[i, j]] = monomial.iter().map(|&idx| x[[i, idx]]).product();
            }
        }
        Ok(out)
    }

    /// Human-readable names of the expanded columns
    pub fn feature_names(&self, input_names: &[String]) -> Vec<String> {
        self.monomials(input_names.len())
            .iter()
            .map(|monomial| {
                let mut parts: Vec<String> = Vec::new();
                let mut k = 0;
                while k < monomial.len() {
                    let idx = monomial[k];
                    let power = monomial[k..].iter().take_while(|&&m| m == idx).count();
                    if power == 1 {
                        parts.push(input_names[idx].clone());
                    } else {
                        parts.push(format!("{}^{}", input_names[idx], power));
                    }
                    k += power;
                }
                parts.join("*")
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_degree_two_bivariate() {
        let poly = PolynomialFeatures::new(2);
        let x = array![[2.0, 3.0]];
        let out = poly.transform(&x).unwrap();
        // a, b, a², ab, b²
        assert_eq!(out.ncols(), 5);
        assert_eq!(out.row(0).to_vec(), vec![2.0, 3.0, 4.0, 6.0, 9.0]);
    }

    #[test]
    fn test_degree_three_count() {
        let poly = PolynomialFeatures::new(3);
        // 2 + 3 + 4 monomials
        assert_eq!(poly.n_output_features(2), 9);
        let x = array![[2.0, 3.0]];
        let out = poly.transform(&x).unwrap();
        assert_eq!(
            out.row(0).to_vec(),
            vec![2.0, 3.0, 4.0, 6.0, 9.0, 8.0, 12.0, 18.0, 27.0]
        );
    }

    #[test]
    fn test_degree_one_is_identity() {
        let poly = PolynomialFeatures::new(1);
        let x = array![[2.0, 3.0], [4.0, 5.0]];
        let out = poly.transform(&x).unwrap();
        assert_eq!(out, x);
    }

    #[test]
    fn test_feature_names() {
        let poly = PolynomialFeatures::new(3);
        let names = poly.feature_names(&["X1".to_string(), "X2".to_string()]);
        assert_eq!(
            names,
            vec!["X1", "X2", "X1^2", "X1*X2", "X2^2", "X1^3", "X1^2*X2", "X1*X2^2", "X2^3"]
        );
    }
}
