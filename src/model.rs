//! Process-wide model state
//!
//! Vocabulary, compiled matcher and classifier, loaded once at startup and
//! shared read-only behind an `Arc`.

use crate::classifier::{ClassifierAdapter, ModelBundle, ProbabilisticClassifier, TrainingDataset};
use crate::config::{ModelPaths, TrainingConfig};
use crate::error::ScreenerError;
use crate::matcher::SymptomMatcher;
use crate::vocabulary::Vocabulary;
use crate::Result;
use tracing::{info, warn};

pub struct SymptomModel {
    vocabulary: Vocabulary,
    matcher: SymptomMatcher,
    classifier: ClassifierAdapter,
}

impl SymptomModel {
    pub fn new(
        vocabulary: Vocabulary,
        classifier: Box<dyn ProbabilisticClassifier>,
    ) -> Result<Self> {
        if classifier.n_features() != vocabulary.len() {
            return Err(ScreenerError::ModelCorrupt(format!(
                "classifier expects {} features, vocabulary has {}",
                classifier.n_features(),
                vocabulary.len()
            )));
        }

        let matcher = SymptomMatcher::new(&vocabulary)?;
        Ok(Self {
            vocabulary,
            matcher,
            classifier: ClassifierAdapter::new(classifier),
        })
    }

    pub fn from_bundle(bundle: ModelBundle) -> Result<Self> {
        let (vocabulary, classifier) = bundle.into_parts()?;
        Self::new(vocabulary, Box::new(classifier))
    }

    /// Load the persisted bundle, or train and persist one when it is absent
    pub fn load_or_train(paths: &ModelPaths, training: &TrainingConfig) -> Result<Self> {
        if paths.bundle.exists() && paths.symptom_list.exists() {
            info!(bundle = %paths.bundle.display(), "Loading persisted model bundle");
            let bundle = ModelBundle::load(&paths.bundle, &paths.symptom_list)?;
            return Self::from_bundle(bundle);
        }

        info!(
            dataset = %paths.training_data.display(),
            "No persisted model found, training from dataset"
        );
        let dataset = TrainingDataset::from_path(&paths.training_data)?;
        let bundle = ModelBundle::train(&dataset, training)?;

        if let Err(e) = bundle.save(&paths.bundle, &paths.symptom_list) {
            warn!(error = %e, "Failed to persist trained model; serving it anyway");
        }

        Self::from_bundle(bundle)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn matcher(&self) -> &SymptomMatcher {
        &self.matcher
    }

    pub fn classifier(&self) -> &ClassifierAdapter {
        &self.classifier
    }
}
