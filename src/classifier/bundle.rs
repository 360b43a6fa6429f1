//! Persisted model bundle
//!
//! The bundle file holds labels, the fitted forest and the ordered feature
//! names; the symptom-list file repeats the vocabulary on its own. A bundle
//! that exists but does not load into the expected shape is `ModelCorrupt`.

use super::dataset::TrainingDataset;
use super::forest::{ForestClassifier, RandomForest};
use crate::config::TrainingConfig;
use crate::error::ScreenerError;
use crate::vocabulary::Vocabulary;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

pub const BUNDLE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub labels: Vec<String>,
    pub features: Vec<String>,
    pub vocabulary_fingerprint: String,
    pub forest: RandomForest,
}

impl ModelBundle {
    /// Fit a new bundle from a training dataset
    pub fn train(dataset: &TrainingDataset, config: &TrainingConfig) -> Result<Self> {
        let vocabulary = Vocabulary::new(dataset.features.clone())
            .map_err(|e| ScreenerError::DataUnavailable(format!("invalid header: {}", e)))?;
        let (labels, encoded) = dataset.encode_labels();

        info!(
            rows = dataset.rows.len(),
            features = vocabulary.len(),
            classes = labels.len(),
            trees = config.n_trees,
            "Training symptom classifier"
        );

        let forest = RandomForest::fit(&dataset.rows, &encoded, labels.len(), config)?;

        Ok(Self {
            format_version: BUNDLE_FORMAT_VERSION,
            trained_at: Utc::now(),
            labels,
            features: dataset.features.clone(),
            vocabulary_fingerprint: vocabulary.fingerprint(),
            forest,
        })
    }

    /// Load and validate a bundle plus its symptom list
    pub fn load(bundle_path: &Path, symptom_list_path: &Path) -> Result<Self> {
        let bundle_bytes = fs::read(bundle_path).map_err(|e| {
            ScreenerError::ModelCorrupt(format!("cannot read {}: {}", bundle_path.display(), e))
        })?;
        let bundle: ModelBundle = serde_json::from_slice(&bundle_bytes).map_err(|e| {
            ScreenerError::ModelCorrupt(format!("{}: {}", bundle_path.display(), e))
        })?;

        let list_bytes = fs::read(symptom_list_path).map_err(|e| {
            ScreenerError::ModelCorrupt(format!(
                "cannot read {}: {}",
                symptom_list_path.display(),
                e
            ))
        })?;
        let symptom_list: Vec<String> = serde_json::from_slice(&list_bytes).map_err(|e| {
            ScreenerError::ModelCorrupt(format!("{}: {}", symptom_list_path.display(), e))
        })?;

        if symptom_list != bundle.features {
            return Err(ScreenerError::ModelCorrupt(
                "symptom list does not match the bundle's features".to_string(),
            ));
        }

        bundle.validate()?;
        Ok(bundle)
    }

    /// Write the bundle and the symptom list
    pub fn save(&self, bundle_path: &Path, symptom_list_path: &Path) -> Result<()> {
        fs::write(bundle_path, serde_json::to_vec(self)?)?;
        fs::write(symptom_list_path, serde_json::to_vec_pretty(&self.features)?)?;
        Ok(())
    }

    /// Check every shape the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if self.format_version != BUNDLE_FORMAT_VERSION {
            return Err(ScreenerError::ModelCorrupt(format!(
                "unsupported bundle format {}",
                self.format_version
            )));
        }

        let vocabulary = self.vocabulary()?;
        if vocabulary.fingerprint() != self.vocabulary_fingerprint {
            return Err(ScreenerError::ModelCorrupt(
                "vocabulary fingerprint mismatch".to_string(),
            ));
        }
        if self.forest.n_features() != vocabulary.len() {
            return Err(ScreenerError::ModelCorrupt(format!(
                "forest expects {} features, vocabulary has {}",
                self.forest.n_features(),
                vocabulary.len()
            )));
        }
        if self.forest.n_classes() != self.labels.len() {
            return Err(ScreenerError::ModelCorrupt(format!(
                "forest has {} classes, bundle lists {} labels",
                self.forest.n_classes(),
                self.labels.len()
            )));
        }

        self.forest.validate().map_err(ScreenerError::ModelCorrupt)
    }

    pub fn vocabulary(&self) -> Result<Vocabulary> {
        Vocabulary::new(self.features.clone()).map_err(|e| ScreenerError::ModelCorrupt(e.to_string()))
    }

    pub fn into_parts(self) -> Result<(Vocabulary, ForestClassifier)> {
        let vocabulary = self.vocabulary()?;
        let classifier = ForestClassifier::new(self.labels, self.forest)?;
        Ok((vocabulary, classifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
itching,skin_rash,chest_pain,vomiting,prognosis
1,1,0,0,Fungal infection
1,1,0,0,Fungal infection
0,0,1,1,Heart attack
0,0,1,1,Heart attack
";

    fn trained() -> ModelBundle {
        let dataset = TrainingDataset::parse(SAMPLE).unwrap();
        ModelBundle::train(&dataset, &TrainingConfig { n_trees: 5, seed: 7 }).unwrap()
    }

    #[test]
    fn test_train_records_shape() {
        let bundle = trained();
        assert_eq!(bundle.labels, vec!["Fungal infection", "Heart attack"]);
        assert_eq!(bundle.features.len(), 4);
        assert_eq!(bundle.forest.n_trees(), 5);
        assert!(bundle.validate().is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = dir.path().join("model.json");
        let list_path = dir.path().join("symptom_list.json");

        let bundle = trained();
        bundle.save(&bundle_path, &list_path).unwrap();

        let loaded = ModelBundle::load(&bundle_path, &list_path).unwrap();
        assert_eq!(loaded.labels, bundle.labels);
        assert_eq!(loaded.features, bundle.features);
        assert_eq!(loaded.forest, bundle.forest);
    }

    #[test]
    fn test_garbage_bundle_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = dir.path().join("model.json");
        let list_path = dir.path().join("symptom_list.json");
        fs::write(&bundle_path, b"not json").unwrap();
        fs::write(&list_path, b"[\"itching\"]").unwrap();

        let err = ModelBundle::load(&bundle_path, &list_path).unwrap_err();
        assert!(matches!(err, ScreenerError::ModelCorrupt(_)));
    }

    #[test]
    fn test_mismatched_symptom_list_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = dir.path().join("model.json");
        let list_path = dir.path().join("symptom_list.json");
        trained().save(&bundle_path, &list_path).unwrap();
        fs::write(&list_path, b"[\"skin_rash\", \"itching\"]").unwrap();

        let err = ModelBundle::load(&bundle_path, &list_path).unwrap_err();
        assert!(matches!(err, ScreenerError::ModelCorrupt(_)));
    }

    #[test]
    fn test_tampered_fingerprint_is_corrupt() {
        let mut bundle = trained();
        bundle.vocabulary_fingerprint = "0".repeat(64);
        assert!(matches!(
            bundle.validate(),
            Err(ScreenerError::ModelCorrupt(_))
        ));
    }
}
