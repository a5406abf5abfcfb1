//! Command-line interface
//!
//! Thin display layer over the engine: it parses arguments, formats
//! results and never re-implements feature construction or unit math.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use crate::inference::{predict_all, Prediction, PredictionRequest};
use crate::property::{PropertyKind, SolutionType};
use crate::registry::ModelRegistry;
use crate::summary::summarize;
use crate::train::train_all;
use crate::units::convert_vapor_pressure;

#[derive(Parser)]
#[command(name = "solprop")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Property prediction for industrial NaOH, NaCl and HCl solutions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train one model per dataset and persist the registry
    Train {
        /// Directory of property CSV files
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Output registry artifact
        #[arg(short, long, default_value = "models/registry.json")]
        output: PathBuf,
    },

    /// Predict all properties of a solution from raw inputs
    Predict {
        /// Registry artifact produced by `train`
        #[arg(short, long)]
        registry: PathBuf,

        /// Solution type (NaOH, NaCl, HCl)
        #[arg(short, long)]
        solution: String,

        /// Concentration in % (X1)
        #[arg(long)]
        concentration: Option<f64>,

        /// Temperature in °C (X2)
        #[arg(long)]
        temperature: Option<f64>,

        /// Pressure (X3), in --pressure-unit
        #[arg(long)]
        pressure: Option<f64>,

        /// Pressure input unit (bar.A, kPa.A, MPa.A, kg/cm2.A)
        #[arg(long, default_value = "bar.A")]
        pressure_unit: String,

        /// Density in kg/m³ (X4)
        #[arg(long)]
        density: Option<f64>,

        /// Display unit for vapor pressure (mmHg, kPa, bar, atm, psi, torr)
        #[arg(long, default_value = "mmHg")]
        vapor_unit: String,
    },

    /// Describe the models in a registry
    Info {
        /// Registry artifact
        #[arg(short, long)]
        registry: PathBuf,
    },
}

pub fn cmd_train(data_dir: &PathBuf, output: &PathBuf) -> anyhow::Result<()> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let summary = train_all(data_dir, output)?;

    println!();
    println!("  {}", "Training".white().bold());
    for report in &summary.reports {
        println!(
            "  {} {:24} RMSE: {:.4}  R²: {:.4}  ({} train / {} test)",
            "✓".green(),
            report.key.to_string(),
            report.metrics.rmse,
            report.metrics.r2,
            report.n_train,
            report.n_test,
        );
    }
    println!();
    println!(
        "  Saved {} models to {}",
        summary.registry.len(),
        output.display()
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_predict(
    registry_path: &PathBuf,
    solution: &str,
    concentration: Option<f64>,
    temperature: Option<f64>,
    pressure: Option<f64>,
    pressure_unit: &str,
    density: Option<f64>,
    vapor_unit: &str,
) -> anyhow::Result<()> {
    let solution: SolutionType = solution.parse()?;
    let registry = ModelRegistry::load(registry_path)?;

    let request = PredictionRequest {
        x1: concentration,
        x2: temperature,
        x3: pressure,
        x4: density,
        pressure_unit: pressure_unit.to_string(),
        vapor_pressure_unit: vapor_unit.to_string(),
    };

    let predictions = predict_all(&registry, solution, &request)?;
    if predictions.is_empty() {
        println!("  No models registered for {solution}");
        return Ok(());
    }

    println!();
    println!("  {} ({})", "Predictions".white().bold(), solution);
    for prediction in &predictions {
        match prediction {
            Prediction::Value(result) => {
                let label = result.key.to_string().replace('_', " ");
                println!("  {label:24} {:10.4} {}", result.value, result.unit);

                // Reference units alongside a non-canonical vapor pressure
                if result.key.kind == PropertyKind::VaporPressure && result.unit != "mmHg" {
                    let others = ["kPa", "bar", "atm", "psi"]
                        .into_iter()
                        .filter(|u| *u != result.unit)
                        .take(2);
                    for unit in others {
                        let value = convert_vapor_pressure(result.raw, unit);
                        println!("  {:24} ({value:10.4} {unit})", "");
                    }
                }
            }
            Prediction::Skipped { key, reason } => {
                let label = key.to_string().replace('_', " ");
                println!("  {label:24} {}", format!("skipped: {reason}").dimmed());
            }
        }
    }
    Ok(())
}

pub fn cmd_info(registry_path: &PathBuf) -> anyhow::Result<()> {
    let registry = ModelRegistry::load(registry_path)?;

    println!();
    println!("  {} ({} models)", "Registry".white().bold(), registry.len());
    for entry in registry.iter() {
        let summary = summarize(entry);
        println!(
            "  {:24} {}  [{} features]",
            entry.key.to_string(),
            summary.describe(),
            entry.features.len(),
        );
        if let Some(formula) = summary.formula() {
            println!("  {:24} {}", "", formula.dimmed());
        }
    }

    let mismatches = registry.audit_contracts();
    if !mismatches.is_empty() {
        println!();
        for m in mismatches {
            println!(
                "  {} {} stores {} features, current engineering produces {}",
                "!".yellow(),
                m.key,
                m.actual,
                m.expected
            );
        }
    }
    Ok(())
}
