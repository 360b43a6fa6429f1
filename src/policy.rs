//! Confidence-based recommendation policy
//!
//! Rules are checked in order and the first match wins:
//! LOW CONFIDENCE → SERIOUS SYMPTOM → DEFAULT

use lazy_static::lazy_static;
use std::collections::HashSet;

/// Below this confidence the predicted label is replaced by the uncertain sentinel
pub const UNCERTAIN_LABEL_THRESHOLD: f64 = 0.35;

/// Below this confidence the advisory asks the user to monitor symptoms
pub const UNCLEAR_ADVISORY_THRESHOLD: f64 = 0.4;

pub const UNCLEAR_ADVISORY: &str =
    "Symptoms are unclear; please monitor your health and consult a healthcare professional if symptoms persist.";
pub const URGENT_ADVISORY: &str =
    "Your symptoms may indicate a serious condition. Please seek urgent medical attention.";
pub const CONSULT_ADVISORY: &str = "Consult a healthcare professional for a precise diagnosis.";

lazy_static! {
    static ref SERIOUS_SYMPTOMS: HashSet<&'static str> = [
        "chest_pain",
        "breathlessness",
        "severe_headache",
        "unconsciousness",
        "blurred_vision",
        "vomiting",
        "persistent_fever",
        "loss_of_consciousness",
    ]
    .into_iter()
    .collect();
}

pub fn is_serious(symptom: &str) -> bool {
    SERIOUS_SYMPTOMS.contains(symptom)
}

/// Pick the advisory for a prediction. Takes the raw classifier confidence.
pub fn recommend<S: AsRef<str>>(confidence: f64, symptoms: &[S]) -> &'static str {
    if confidence < UNCLEAR_ADVISORY_THRESHOLD {
        return UNCLEAR_ADVISORY;
    }
    if symptoms.iter().any(|s| is_serious(s.as_ref())) {
        return URGENT_ADVISORY;
    }
    CONSULT_ADVISORY
}

/// Whether the classifier label should be replaced by the uncertain sentinel
pub fn is_uncertain(confidence: f64) -> bool {
    confidence < UNCERTAIN_LABEL_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_confidence_wins_over_serious_symptom() {
        assert_eq!(recommend(0.2, &["chest_pain"]), UNCLEAR_ADVISORY);
        assert_eq!(recommend(0.39, &["vomiting", "cough"]), UNCLEAR_ADVISORY);
    }

    #[test]
    fn test_serious_symptom_gives_urgent_advisory() {
        assert_eq!(recommend(0.4, &["cough", "chest_pain"]), URGENT_ADVISORY);
        assert_eq!(recommend(0.95, &["breathlessness"]), URGENT_ADVISORY);
    }

    #[test]
    fn test_default_advisory() {
        assert_eq!(recommend(0.8, &["itching", "skin_rash"]), CONSULT_ADVISORY);
        assert_eq!(recommend(0.8, &[] as &[&str]), CONSULT_ADVISORY);
    }

    #[test]
    fn test_uncertainty_threshold_is_strict() {
        assert!(is_uncertain(0.30));
        assert!(is_uncertain(0.349));
        assert!(!is_uncertain(0.35));
    }
}
