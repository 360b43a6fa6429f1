//! Prediction orchestrator
//!
//! TEXT → NORMALIZE → MATCH → CACHE? → VECTORIZE → CLASSIFY → POLICY → STORE
//!
//! Everything up to classification is pure; the cache is the only shared
//! mutable state.

use crate::cache::ResultCache;
use crate::error::ScreenerError;
use crate::model::SymptomModel;
use crate::models::{Language, LabelKind, PredictionResult};
use crate::normalizer::normalize_text;
use crate::policy;
use crate::vectorizer::vectorize;
use crate::vocabulary::SymptomSet;
use crate::Result;
use std::sync::Arc;
use tracing::debug;

pub struct PredictionOrchestrator {
    model: Arc<SymptomModel>,
    cache: Arc<ResultCache>,
}

impl PredictionOrchestrator {
    pub fn new(model: Arc<SymptomModel>, cache: Arc<ResultCache>) -> Self {
        Self { model, cache }
    }

    pub fn model(&self) -> &SymptomModel {
        &self.model
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Screen free text. The cache holds language-neutral results; sentinel
    /// labels are swapped for `language` on the way out.
    pub async fn predict(&self, text: &str, language: Language) -> Result<PredictionResult> {
        if text.trim().is_empty() {
            return Err(ScreenerError::EmptyInput);
        }

        let normalized = normalize_text(text);
        let matched = self.model.matcher().extract(&normalized);

        if matched.is_empty() {
            debug!("No vocabulary symptom recognized");
            return Ok(PredictionResult::unrecognized(language));
        }

        let key: SymptomSet = matched.iter().cloned().collect();
        if let Some(cached) = self.cache.get(&key).await {
            debug!(symptoms = key.len(), "Prediction cache hit");
            return Ok(cached.with_language(language));
        }

        let result = self.compute(&key, matched)?;
        self.cache.put(key, result.clone()).await;

        Ok(result.with_language(language))
    }

    fn compute(&self, key: &SymptomSet, matched: Vec<String>) -> Result<PredictionResult> {
        let features = vectorize(key, self.model.vocabulary());
        let (label, confidence) = self.model.classifier().predict(&features)?;

        let (predicted, kind) = if policy::is_uncertain(confidence) {
            (
                Language::English.uncertain_label().to_string(),
                LabelKind::Uncertain,
            )
        } else {
            (label, LabelKind::Predicted)
        };

        let recommendation = policy::recommend(confidence, &matched);

        debug!(
            label = %predicted,
            confidence,
            symptoms = matched.len(),
            "Prediction computed"
        );

        Ok(PredictionResult::new(
            predicted,
            kind,
            confidence,
            matched,
            recommendation.to_string(),
        ))
    }
}
