//! Symptom vocabulary and matched-symptom sets
//!
//! The vocabulary order defines feature-vector layout, so it is fixed once a
//! model is loaded.

use crate::error::ScreenerError;
use crate::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};

/// Ordered list of canonical symptom identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary, rejecting empty lists and duplicate identifiers
    pub fn new(terms: Vec<String>) -> Result<Self> {
        if terms.is_empty() {
            return Err(ScreenerError::InternalError(
                "vocabulary has no symptoms".to_string(),
            ));
        }

        let mut positions = HashMap::with_capacity(terms.len());
        for (idx, term) in terms.iter().enumerate() {
            if positions.insert(term.clone(), idx).is_some() {
                return Err(ScreenerError::InternalError(format!(
                    "duplicate symptom '{}' in vocabulary",
                    term
                )));
            }
        }

        Ok(Self { terms, positions })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn position(&self, symptom: &str) -> Option<usize> {
        self.positions.get(symptom).copied()
    }

    /// SHA-256 over the ordered terms; changes whenever order or content does
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (idx, term) in self.terms.iter().enumerate() {
            if idx > 0 {
                hasher.update(b"\n");
            }
            hasher.update(term.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Order-independent set of matched symptom identifiers. Used as the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymptomSet(BTreeSet<String>);

impl SymptomSet {
    pub fn contains(&self, symptom: &str) -> bool {
        self.0.contains(symptom)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
