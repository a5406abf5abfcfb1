//! Dataset loading and extraction
//!
//! One CSV file per property, column-labeled with inputs drawn from
//! {X1, X2, X3, X4} plus exactly one target column. The file stem is the
//! property key.

use crate::error::{Result, SolpropError};
use crate::property::Routing;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Raw inputs and target extracted from one property dataset
#[derive(Debug, Clone)]
pub struct PropertyDataset {
    /// Input matrix, columns in routing order
    pub x: Array2<f64>,
    /// Target vector
    pub y: Array1<f64>,
    /// Input column names, in matrix column order
    pub feature_columns: Vec<String>,
    /// Name of the single target column
    pub target_column: String,
}

/// Load a property CSV into a DataFrame
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| {
        SolpropError::DataError(format!("cannot open {}: {e}", path.display()))
    })?;

    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file);

    reader
        .finish()
        .map_err(|e| SolpropError::DataError(format!("cannot parse {}: {e}", path.display())))
}

/// Split a dataset into routed inputs and the single target column.
///
/// Every column not named by the routing is a target candidate; anything
/// other than exactly one candidate is a fatal schema error naming the file
/// and the columns found.
pub fn extract(df: &DataFrame, routing: &Routing, file_name: &str) -> Result<PropertyDataset> {
    let x_cols = routing.column_names();

    let y_cols: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .filter(|name| !x_cols.contains(name))
        .collect();

    if y_cols.len() != 1 {
        return Err(SolpropError::SchemaError {
            file: file_name.to_string(),
            columns: y_cols,
        });
    }
    let target_column = y_cols.into_iter().next().unwrap();

    let x = columns_to_array2(df, &x_cols)?;
    let y = column_to_array1(df, &target_column)?;

    Ok(PropertyDataset {
        x,
        y,
        feature_columns: x_cols,
        target_column,
    })
}

/// Extract named columns into a row-major `Array2<f64>`.
/// Nulls become NaN so the pipeline imputer can handle them.
pub fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let series = df.column(col_name).map_err(|_| {
                SolpropError::DataError(format!("column {col_name} not found"))
            })?;
            let series_f64 = series
                .cast(&DataType::Float64)
                .map_err(|e| SolpropError::DataError(e.to_string()))?;
            let values: Vec<f64> = series_f64
                .as_materialized_series()
                .f64()
                .map_err(|e| SolpropError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}

fn column_to_array1(df: &DataFrame, col_name: &str) -> Result<Array1<f64>> {
    let series = df
        .column(col_name)
        .map_err(|_| SolpropError::DataError(format!("column {col_name} not found")))?;
    let series_f64 = series
        .cast(&DataType::Float64)
        .map_err(|e| SolpropError::DataError(e.to_string()))?;
    let values: Vec<f64> = series_f64
        .as_materialized_series()
        .f64()
        .map_err(|e| SolpropError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(Array1::from_vec(values))
}
