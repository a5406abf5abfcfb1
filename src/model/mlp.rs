//! Feedforward neural network regressor
//!
//! Minibatch SGD with momentum, ReLU hidden layers and a linear output.
//! The learning rate decays on validation plateau; training stops early
//! once the rate bottoms out on a held-out tail split.

use crate::error::{Result, SolpropError};
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Hidden layer widths
    pub hidden_layers: Vec<usize>,
    /// Initial learning rate
    pub learning_rate: f64,
    /// Maximum training epochs
    pub max_epochs: usize,
    /// Minibatch size
    pub batch_size: usize,
    /// L2 regularization strength
    pub alpha: f64,
    /// Seed for weight init and batch shuffling
    pub random_state: u64,
    /// Epochs without improvement before decaying the learning rate
    pub n_iter_no_change: usize,
    /// Fraction of rows held out for the early-stopping signal
    pub validation_split: f64,
    /// Momentum coefficient
    pub momentum: f64,
    /// Minimum loss improvement that counts as progress
    pub tol: f64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![200, 100, 50, 25],
            learning_rate: 1e-3,
            max_epochs: 2000,
            batch_size: 32,
            alpha: 1e-3,
            random_state: 42,
            n_iter_no_change: 10,
            validation_split: 0.1,
            momentum: 0.9,
            tol: 1e-4,
        }
    }
}

/// Multi-layer perceptron regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpRegressor {
    config: MlpConfig,
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
    n_features: usize,
    is_fitted: bool,
}

impl MlpRegressor {
    pub fn new(config: MlpConfig) -> Self {
        Self {
            config,
            weights: Vec::new(),
            biases: Vec::new(),
            n_features: 0,
            is_fitted: false,
        }
    }

    pub fn config(&self) -> &MlpConfig {
        &self.config
    }

    /// Layer widths including input and output
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![self.n_features];
        sizes.extend(&self.config.hidden_layers);
        sizes.push(1);
        sizes
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(SolpropError::ShapeError {
                expected: format!("y length = {n_samples}"),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(SolpropError::TrainingError(
                "cannot fit network on empty data".to_string(),
            ));
        }

        self.n_features = x.ncols();
        self.initialize_weights();

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);

        // Hold out the tail split for the early-stopping signal
        let val_size = (n_samples as f64 * self.config.validation_split) as usize;
        let train_size = n_samples - val_size;

        let x_train = x.slice(ndarray::s![..train_size, ..]).to_owned();
        let y_train = y.slice(ndarray::s![..train_size]).to_owned();
        let x_val = x.slice(ndarray::s![train_size.., ..]).to_owned();
        let y_val = y.slice(ndarray::s![train_size..]).to_owned();

        let mut velocities_w: Vec<Array2<f64>> = self
            .weights
            .iter()
            .map(|w| Array2::zeros(w.raw_dim()))
            .collect();
        let mut velocities_b: Vec<Array1<f64>> = self
            .biases
            .iter()
            .map(|b| Array1::zeros(b.len()))
            .collect();

        let mut lr = self.config.learning_rate;
        let mut best_loss = f64::INFINITY;
        let mut patience = 0usize;

        for _epoch in 0..self.config.max_epochs {
            let mut indices: Vec<usize> = (0..train_size).collect();
            indices.shuffle(&mut rng);

            for batch_start in (0..train_size).step_by(self.config.batch_size) {
                let batch_end = (batch_start + self.config.batch_size).min(train_size);
                let batch_indices = &indices[batch_start..batch_end];

                let x_batch = x_train.select(Axis(0), batch_indices);
                let y_batch: Array1<f64> =
                    batch_indices.iter().map(|&i| y_train[i]).collect();

                let (activations, z_values) = self.forward(&x_batch);
                let gradients = self.backward(&y_batch, &activations, &z_values);

                for (i, (grad_w, grad_b)) in gradients.into_iter().enumerate() {
                    velocities_w[i] = &velocities_w[i] * self.config.momentum - &grad_w * lr;
                    velocities_b[i] = &velocities_b[i] * self.config.momentum - &grad_b * lr;

                    self.weights[i] = &self.weights[i] + &velocities_w[i];
                    self.biases[i] = &self.biases[i] + &velocities_b[i];

                    // L2 weight decay
                    self.weights[i] = &self.weights[i] * (1.0 - self.config.alpha * lr);
                }
            }

            // Plateau detection on the validation split (training loss when
            // the dataset is too small to hold anything out)
            let loss = if val_size > 0 {
                self.mse(&y_val, &self.forward_predict(&x_val))
            } else {
                self.mse(&y_train, &self.forward_predict(&x_train))
            };

            if loss < best_loss - self.config.tol {
                best_loss = loss;
                patience = 0;
            } else {
                patience += 1;
                if patience >= self.config.n_iter_no_change {
                    if lr > 1e-6 {
                        lr /= 5.0;
                        patience = 0;
                    } else {
                        break;
                    }
                }
            }
        }

        self.is_fitted = true;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(SolpropError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(SolpropError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(self.forward_predict(x))
    }

    fn forward_predict(&self, x: &Array2<f64>) -> Array1<f64> {
        let (activations, _) = self.forward(x);
        activations.last().unwrap().column(0).to_owned()
    }

    fn initialize_weights(&mut self) {
        self.weights.clear();
        self.biases.clear();

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);
        let layer_sizes = self.layer_sizes();

        for i in 0..layer_sizes.len() - 1 {
            let n_in = layer_sizes[i];
            let n_out = layer_sizes[i + 1];

            // Xavier/Glorot initialization
            let scale = (2.0 / (n_in + n_out) as f64).sqrt();
            let weights: Vec<f64> = (0..n_in * n_out)
                .map(|_| rng.gen::<f64>() * 2.0 * scale - scale)
                .collect();

            self.weights
                .push(Array2::from_shape_vec((n_in, n_out), weights).unwrap());
            self.biases.push(Array1::zeros(n_out));
        }
    }

    fn forward(&self, x: &Array2<f64>) -> (Vec<Array2<f64>>, Vec<Array2<f64>>) {
        let mut activations = vec![x.clone()];
        let mut z_values = Vec::new();

        for (i, (w, b)) in self.weights.iter().zip(self.biases.iter()).enumerate() {
            let z = activations.last().unwrap().dot(w) + b;
            z_values.push(z.clone());

            let a = if i < self.weights.len() - 1 {
                z.mapv(relu)
            } else {
                z // linear output
            };
            activations.push(a);
        }

        (activations, z_values)
    }

    fn backward(
        &self,
        y: &Array1<f64>,
        activations: &[Array2<f64>],
        z_values: &[Array2<f64>],
    ) -> Vec<(Array2<f64>, Array1<f64>)> {
        let n = y.len() as f64;
        let mut gradients = Vec::new();

        // Output layer error (MSE gradient)
        let y_2d = y.clone().insert_axis(Axis(1));
        let output = activations.last().unwrap();
        let mut delta = (output - &y_2d) / n;

        for i in (0..self.weights.len()).rev() {
            let a_prev = &activations[i];
            let grad_w = a_prev.t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));
            gradients.push((grad_w, grad_b));

            if i > 0 {
                let z = &z_values[i - 1];
                delta = delta.dot(&self.weights[i].t()) * z.mapv(relu_derivative);
            }
        }

        gradients.reverse();
        gradients
    }

    fn mse(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum::<f64>()
            / y_true.len() as f64
    }
}

#[inline]
fn relu(v: f64) -> f64 {
    v.max(0.0)
}

#[inline]
fn relu_derivative(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else {
        0.0
    }
}
