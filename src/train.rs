//! Training orchestration
//!
//! One dataset per property: route the input columns, verify the schema,
//! apply feature engineering where routed, fit the pipeline variant the
//! policy selects, evaluate on a held-out split, and populate the registry.

use crate::data::{extract, load_csv};
use crate::error::Result;
use crate::features::engineer_matrix;
use crate::model::{PipelineSpec, PropertyPipeline, RegressionMetrics};
use crate::property::{route, PropertyKey, PropertyKind, SolutionType};
use crate::registry::{ModelEntry, ModelRegistry};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use tracing::{info, warn};

/// Seed for the train/test shuffle
pub const SPLIT_SEED: u64 = 42;
/// Held-out fraction for evaluation
pub const TEST_FRACTION: f64 = 0.2;

const DEFAULT_DEGREE: usize = 3;
const BUBBLEPOINT_DEGREE: usize = 2;
const NAOH_DENSITY_DEGREE: usize = 2;

/// Kinds fitted on ln(y)
fn uses_log_target(kind: PropertyKind) -> bool {
    matches!(kind, PropertyKind::Viscosity)
}

/// Pipeline selection policy.
///
/// HCl vapor pressure gets the network with a log target; bubble point and
/// NaOH density fit with a reduced polynomial degree; viscosity kinds fit
/// on ln(y); everything else is the default degree-3 polynomial ridge.
pub fn pipeline_spec(key: &PropertyKey) -> PipelineSpec {
    let log_target = uses_log_target(key.kind);

    match (key.solution, key.kind) {
        (Some(SolutionType::HCl), PropertyKind::VaporPressure) => {
            PipelineSpec::neural().with_log_target(true)
        }
        (_, PropertyKind::BubblePoint) => {
            PipelineSpec::polynomial(BUBBLEPOINT_DEGREE).with_log_target(log_target)
        }
        (Some(SolutionType::NaOH), PropertyKind::Density) => {
            PipelineSpec::polynomial(NAOH_DENSITY_DEGREE).with_log_target(log_target)
        }
        _ => PipelineSpec::polynomial(DEFAULT_DEGREE).with_log_target(log_target),
    }
}

/// Held-out evaluation of one freshly trained property model
#[derive(Debug, Clone)]
pub struct FitReport {
    pub key: PropertyKey,
    pub spec: PipelineSpec,
    pub metrics: RegressionMetrics,
    pub n_train: usize,
    pub n_test: usize,
}

/// Result of a full training run
#[derive(Debug)]
pub struct TrainingSummary {
    pub registry: ModelRegistry,
    pub reports: Vec<FitReport>,
}

/// Shuffled 80/20 split with a fixed seed
fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_fraction: f64,
    seed: u64,
) -> (Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>) {
    let n = x.nrows();
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_size = ((n as f64 * test_fraction).ceil() as usize).min(n.saturating_sub(1));
    let (test_idx, train_idx) = indices.split_at(test_size);

    let gather = |rows: &[usize]| -> (Array2<f64>, Array1<f64>) {
        (
            x.select(Axis(0), rows),
            Array1::from_vec(rows.iter().map(|&i| y[i]).collect()),
        )
    };

    let (x_train, y_train) = gather(train_idx);
    let (x_test, y_test) = gather(test_idx);
    (x_train, x_test, y_train, y_test)
}

/// Train one model per dataset in `dataset_dir` and persist the registry
/// to `registry_path`.
///
/// Datasets whose stem is not a recognizable property key are logged and
/// skipped; a schema violation inside a recognized dataset aborts the run.
pub fn train_all(dataset_dir: &Path, registry_path: &Path) -> Result<TrainingSummary> {
    let mut csv_paths: Vec<std::path::PathBuf> = std::fs::read_dir(dataset_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("csv"))
        .collect();
    csv_paths.sort();

    let mut registry = ModelRegistry::new();
    let mut reports = Vec::new();

    for path in &csv_paths {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let key: PropertyKey = match stem.parse() {
            Ok(key) => key,
            Err(_) => {
                warn!(file = file_name, "skipping dataset with unrecognized stem");
                continue;
            }
        };

        let df = load_csv(path)?;
        let routing = route(&key);
        let dataset = extract(&df, &routing, file_name)?;

        let (feature_columns, x): (Vec<String>, Array2<f64>) = if routing.engineered {
            let (names, expanded) = engineer_matrix(&dataset.x);
            (names.iter().map(|s| s.to_string()).collect(), expanded)
        } else {
            (dataset.feature_columns.clone(), dataset.x.clone())
        };

        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &dataset.y, TEST_FRACTION, SPLIT_SEED);

        let spec = pipeline_spec(&key);
        let mut pipeline = PropertyPipeline::build(spec);
        pipeline.fit(&x_train, &y_train)?;

        // Evaluate on the held-out split; reported, never enforced
        let metrics = if x_test.nrows() > 0 {
            let pred = pipeline.predict(&x_test)?;
            RegressionMetrics::compute(&y_test, &pred)
        } else {
            let pred = pipeline.predict(&x_train)?;
            RegressionMetrics::compute(&y_train, &pred)
        };

        info!(
            key = %key,
            rmse = metrics.rmse,
            r2 = metrics.r2,
            "fitted property model"
        );

        reports.push(FitReport {
            key,
            spec,
            metrics: metrics.clone(),
            n_train: x_train.nrows(),
            n_test: x_test.nrows(),
        });

        registry.insert(ModelEntry {
            key,
            pipeline,
            features: feature_columns,
        });
    }

    registry.save(registry_path)?;
    info!(
        models = registry.len(),
        path = %registry_path.display(),
        "saved registry"
    );

    Ok(TrainingSummary { registry, reports })
}
