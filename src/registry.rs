//! Model registry
//!
//! The registry is the sole persisted artifact: one JSON file mapping each
//! property key to its fitted pipeline and the exact feature-column list
//! recorded at fit time. It is built once by the trainer and read-only
//! thereafter.

use crate::error::{Result, SolpropError};
use crate::features::expected_columns;
use crate::model::PropertyPipeline;
use crate::property::{route, PropertyKey, SolutionType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// One trained model plus its feature contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub key: PropertyKey,
    pub pipeline: PropertyPipeline,
    /// Feature columns the pipeline was fitted on, in order. This list is
    /// the authoritative contract for what inference must supply.
    pub features: Vec<String>,
}

/// On-disk entry shape. Older artifacts stored the bare pipeline without a
/// feature list; those migrate to the default {X1, X2} contract at load.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Tagged {
        model: PropertyPipeline,
        features: Vec<String>,
    },
    Legacy(PropertyPipeline),
}

/// A registry entry whose stored feature list no longer matches what the
/// router and feature engineer would produce today
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractMismatch {
    pub key: PropertyKey,
    pub expected: usize,
    pub actual: usize,
}

/// Immutable collection of all trained property models
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: BTreeMap<String, ModelEntry>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register a trained entry. Only the training orchestrator builds
    /// registries; consumers treat them as read-only.
    pub fn insert(&mut self, entry: ModelEntry) {
        self.entries.insert(entry.key.to_string(), entry);
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&ModelEntry> {
        self.entries.get(&key.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in key order
    pub fn iter(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.values()
    }

    /// Entries belonging to one solution type, in key order
    pub fn entries_for_solution(&self, solution: SolutionType) -> Vec<&ModelEntry> {
        self.entries
            .values()
            .filter(|e| e.key.solution == Some(solution))
            .collect()
    }

    /// Persist the whole registry as one JSON artifact
    pub fn save(&self, path: &Path) -> Result<()> {
        let stored: BTreeMap<String, StoredEntry> = self
            .entries
            .iter()
            .map(|(stem, entry)| {
                (
                    stem.clone(),
                    StoredEntry::Tagged {
                        model: entry.pipeline.clone(),
                        features: entry.features.clone(),
                    },
                )
            })
            .collect();

        let json = serde_json::to_string_pretty(&stored)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a persisted registry, migrating legacy entries and auditing
    /// feature contracts. Missing or corrupt artifacts are fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SolpropError::DataError(format!(
                "cannot read registry {}: {e}",
                path.display()
            ))
        })?;
        let stored: BTreeMap<String, StoredEntry> = serde_json::from_str(&json)?;

        let mut registry = Self::new();
        for (stem, entry) in stored {
            let key: PropertyKey = stem.parse()?;
            let (pipeline, features) = match entry {
                StoredEntry::Tagged { model, features } => (model, features),
                StoredEntry::Legacy(model) => {
                    warn!(key = %key, "legacy registry entry without feature list, assuming [X1, X2]");
                    (model, vec!["X1".to_string(), "X2".to_string()])
                }
            };
            registry.insert(ModelEntry {
                key,
                pipeline,
                features,
            });
        }

        for mismatch in registry.audit_contracts() {
            warn!(
                key = %mismatch.key,
                expected = mismatch.expected,
                actual = mismatch.actual,
                "registry feature list does not match current feature engineering"
            );
        }

        Ok(registry)
    }

    /// Compare each entry's stored feature-list length against what the
    /// router plus feature engineer would currently produce for its key.
    pub fn audit_contracts(&self) -> Vec<ContractMismatch> {
        self.entries
            .values()
            .filter_map(|entry| {
                let expected = expected_columns(&route(&entry.key)).len();
                let actual = entry.features.len();
                (expected != actual).then_some(ContractMismatch {
                    key: entry.key,
                    expected,
                    actual,
                })
            })
            .collect()
    }
}

/// Deserialize a previously persisted registry into its immutable
/// in-memory form
pub fn load_registry(path: &Path) -> Result<ModelRegistry> {
    ModelRegistry::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PipelineSpec, PropertyPipeline};
    use ndarray::{Array1, Array2};
    use tempfile::tempdir;

    fn fitted_pipeline() -> PropertyPipeline {
        let x = Array2::from_shape_fn((20, 2), |(i, j)| (i + j) as f64);
        let y = Array1::from_shape_fn(20, |i| 3.0 * i as f64 + 1.0);
        let mut pipe = PropertyPipeline::build(PipelineSpec::polynomial(2));
        pipe.fit(&x, &y).unwrap();
        pipe
    }

    fn entry(stem: &str, features: &[&str]) -> ModelEntry {
        ModelEntry {
            key: stem.parse().unwrap(),
            pipeline: fitted_pipeline(),
            features: features.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let mut registry = ModelRegistry::new();
        registry.insert(entry("NaOH_density", &["X1", "X2"]));
        registry.insert(entry("viscosity", &["X1", "X2"]));
        registry.save(&path).unwrap();

        let loaded = ModelRegistry::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);

        let key: PropertyKey = "NaOH_density".parse().unwrap();
        let entry = loaded.get(&key).unwrap();
        assert_eq!(entry.features, vec!["X1", "X2"]);
        assert!(entry.pipeline.is_fitted());

        // Loaded pipeline predicts identically to the in-memory one
        let p = entry.pipeline.predict_one(&[3.0, 4.0]).unwrap();
        assert!(p.is_finite());
    }

    #[test]
    fn test_legacy_entry_migrates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");

        // Hand-write a legacy artifact: the value is the bare pipeline
        let pipeline = fitted_pipeline();
        let mut stored = BTreeMap::new();
        stored.insert("NaCl_density".to_string(), StoredEntry::Legacy(pipeline));
        std::fs::write(&path, serde_json::to_string_pretty(&stored).unwrap()).unwrap();

        let loaded = ModelRegistry::load(&path).unwrap();
        let key: PropertyKey = "NaCl_density".parse().unwrap();
        let entry = loaded.get(&key).unwrap();
        assert_eq!(entry.features, vec!["X1", "X2"]);
    }

    #[test]
    fn test_missing_artifact_is_fatal() {
        let dir = tempdir().unwrap();
        assert!(ModelRegistry::load(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_audit_flags_stale_contract() {
        let mut registry = ModelRegistry::new();
        // HCl vapor pressure should record 15 engineered columns
        registry.insert(entry("HCl_vapor_pressure", &["X1", "X2"]));
        let mismatches = registry.audit_contracts();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].expected, 15);
        assert_eq!(mismatches[0].actual, 2);
    }

    #[test]
    fn test_audit_passes_consistent_registry() {
        let mut registry = ModelRegistry::new();
        registry.insert(entry("NaOH_density", &["X1", "X2"]));
        registry.insert(entry("NaOH_bubblepoint", &["X1", "X3"]));
        assert!(registry.audit_contracts().is_empty());
    }

    #[test]
    fn test_entries_for_solution() {
        let mut registry = ModelRegistry::new();
        registry.insert(entry("NaOH_density", &["X1", "X2"]));
        registry.insert(entry("NaCl_density", &["X1", "X2"]));
        registry.insert(entry("viscosity", &["X1", "X2"]));

        let naoh = registry.entries_for_solution(SolutionType::NaOH);
        assert_eq!(naoh.len(), 1);
        assert_eq!(naoh[0].key.to_string(), "NaOH_density");
    }
}
