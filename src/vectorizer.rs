//! Binary feature vectors aligned to vocabulary order

use crate::vocabulary::{SymptomSet, Vocabulary};

/// One 0/1 value per vocabulary position
pub type FeatureVector = Vec<u8>;

/// Map a symptom set to its feature vector. Identifiers outside the vocabulary are ignored.
pub fn vectorize(symptoms: &SymptomSet, vocabulary: &Vocabulary) -> FeatureVector {
    let mut vector = vec![0u8; vocabulary.len()];
    for symptom in symptoms.iter() {
        if let Some(idx) = vocabulary.position(symptom) {
            vector[idx] = 1;
        }
    }
    vector
}
