//! Classifier adapter
//!
//! The pipeline treats the classifier as an opaque component: a fixed-length
//! binary feature vector in, a probability distribution over labels out.
//! The adapter reduces that distribution to `(label, confidence)`.

pub mod bundle;
pub mod dataset;
pub mod forest;

use crate::error::ScreenerError;
use crate::Result;

pub use bundle::ModelBundle;
pub use dataset::TrainingDataset;
pub use forest::{ForestClassifier, RandomForest};

/// Multi-class classifier producing a probability per label
pub trait ProbabilisticClassifier: Send + Sync {
    /// Labels in the order probabilities are reported
    fn labels(&self) -> &[String];

    /// Expected feature-vector length
    fn n_features(&self) -> usize;

    fn predict_proba(&self, features: &[u8]) -> Vec<f64>;
}

/// Wraps a trained classifier and picks the most probable label
pub struct ClassifierAdapter {
    inner: Box<dyn ProbabilisticClassifier>,
}

impl ClassifierAdapter {
    pub fn new(inner: Box<dyn ProbabilisticClassifier>) -> Self {
        Self { inner }
    }

    pub fn labels(&self) -> &[String] {
        self.inner.labels()
    }

    pub fn n_features(&self) -> usize {
        self.inner.n_features()
    }

    /// Predict `(label, confidence)` where confidence is the maximum class
    /// probability. Equal maxima resolve to the first label in label order.
    pub fn predict(&self, features: &[u8]) -> Result<(String, f64)> {
        if features.len() != self.inner.n_features() {
            return Err(ScreenerError::InternalError(format!(
                "feature vector has {} entries, classifier expects {}",
                features.len(),
                self.inner.n_features()
            )));
        }

        let proba = self.inner.predict_proba(features);
        let labels = self.inner.labels();
        if proba.len() != labels.len() {
            return Err(ScreenerError::InternalError(format!(
                "classifier returned {} probabilities for {} labels",
                proba.len(),
                labels.len()
            )));
        }

        let mut best: Option<(usize, f64)> = None;
        for (idx, &p) in proba.iter().enumerate() {
            if p.is_nan() {
                continue;
            }
            match best {
                Some((_, best_p)) if p <= best_p => {}
                _ => best = Some((idx, p)),
            }
        }

        let (idx, confidence) = best.ok_or_else(|| {
            ScreenerError::InternalError("classifier returned no usable probability".to_string())
        })?;

        Ok((labels[idx].clone(), confidence.clamp(0.0, 1.0)))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ProbabilisticClassifier;

    /// Classifier returning a fixed distribution regardless of input
    pub struct FixedClassifier {
        pub labels: Vec<String>,
        pub proba: Vec<f64>,
        pub n_features: usize,
    }

    impl FixedClassifier {
        pub fn new(pairs: &[(&str, f64)], n_features: usize) -> Self {
            Self {
                labels: pairs.iter().map(|(l, _)| l.to_string()).collect(),
                proba: pairs.iter().map(|(_, p)| *p).collect(),
                n_features,
            }
        }
    }

    impl ProbabilisticClassifier for FixedClassifier {
        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn n_features(&self) -> usize {
            self.n_features
        }

        fn predict_proba(&self, _features: &[u8]) -> Vec<f64> {
            self.proba.clone()
        }
    }
}
