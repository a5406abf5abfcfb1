//! Crate-wide error types

use thiserror::Error;

/// Errors produced by the property prediction engine
#[derive(Debug, Error)]
pub enum SolpropError {
    /// Data loading or extraction failure
    #[error("Data error: {0}")]
    DataError(String),

    /// Dataset does not have exactly one target column
    #[error("Schema error in {file}: expected exactly one target column, found columns {columns:?}")]
    SchemaError { file: String, columns: Vec<String> },

    /// Dataset stem could not be parsed into a property key
    #[error("Invalid property key: {0}")]
    KeyParse(String),

    /// Generic validation failure
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// One or more raw inputs outside their physical range
    #[error("Out-of-range input: {}", .0.join("; "))]
    OutOfRange(Vec<String>),

    /// Model used before fitting
    #[error("Model not fitted")]
    ModelNotFitted,

    /// No trained model registered for the requested property
    #[error("No model registered for property: {0}")]
    ModelNotFound(String),

    /// Training failure
    #[error("Training error: {0}")]
    TrainingError(String),

    /// Numerical computation failure
    #[error("Computation error: {0}")]
    ComputationError(String),

    /// Shape mismatch between arrays
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    /// Registry artifact serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, SolpropError>;
