//! Core data models for the symptom screener

use serde::{Deserialize, Serialize};

pub const DISCLAIMER: &str =
    "This is a preliminary screening tool only. It does not substitute professional medical advice.";

//
// ================= Language =================
//

/// Response language. Selects sentinel labels and user-facing messages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    /// Code understood by the translation service
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
        }
    }

    pub fn uncertain_label(&self) -> &'static str {
        match self {
            Language::English => "Uncertain",
            Language::Hindi => "अनिश्चित",
        }
    }

    pub fn unknown_label(&self) -> &'static str {
        match self {
            Language::English => "Unknown",
            Language::Hindi => "अज्ञात",
        }
    }

    pub fn unrecognized_recommendation(&self) -> &'static str {
        match self {
            Language::English => "Could not identify clear symptoms from input. Please provide specific symptoms or consult a healthcare professional.",
            Language::Hindi => "इनपुट से स्पष्ट लक्षणों की पहचान नहीं की जा सकी। कृपया विशिष्ट लक्षण प्रदान करें या स्वास्थ्य देखभाल पेशेवर से परामर्श लें।",
        }
    }

    pub fn missing_text_message(&self) -> &'static str {
        match self {
            Language::English => "Missing 'text' field in JSON input.",
            Language::Hindi => "इनपुट में 'text' फ़ील्ड गायब है।",
        }
    }

    pub fn empty_input_message(&self) -> &'static str {
        match self {
            Language::English => "Input text is empty.",
            Language::Hindi => "इनपुट खाली है।",
        }
    }

    pub fn internal_error_message(&self) -> &'static str {
        match self {
            Language::English => "Internal server error occurred processing your request.",
            Language::Hindi => "आपके अनुरोध को संसाधित करते समय आंतरिक सर्वर त्रुटि हुई।",
        }
    }

    /// Whether `text` is already written in this language's script
    pub fn is_native_script(&self, text: &str) -> bool {
        match self {
            Language::English => text.is_ascii(),
            Language::Hindi => text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c)),
        }
    }
}

//
// ================= Prediction =================
//

/// Where the predicted label came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelKind {
    /// Label produced by the classifier
    #[default]
    Predicted,
    /// Classifier confidence fell below the uncertainty threshold
    Uncertain,
    /// No vocabulary symptom was recognized
    Unknown,
}

/// A complete screening result. Cached by value and never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionResult {
    pub predicted_disease: String,
    pub confidence_score: f64,
    pub symptoms_matched: Vec<String>,
    pub recommendation: String,
    pub disclaimer: String,
    #[serde(skip)]
    pub label_kind: LabelKind,
}

impl PredictionResult {
    pub fn new(
        predicted_disease: String,
        label_kind: LabelKind,
        confidence: f64,
        symptoms_matched: Vec<String>,
        recommendation: String,
    ) -> Self {
        Self {
            predicted_disease,
            confidence_score: round_confidence(confidence),
            symptoms_matched,
            recommendation,
            disclaimer: DISCLAIMER.to_string(),
            label_kind,
        }
    }

    /// Fixed result for input where no symptom was recognized
    pub fn unrecognized(language: Language) -> Self {
        Self::new(
            language.unknown_label().to_string(),
            LabelKind::Unknown,
            0.0,
            Vec::new(),
            language.unrecognized_recommendation().to_string(),
        )
    }

    /// Replace sentinel labels with their equivalents in `language`
    pub fn with_language(mut self, language: Language) -> Self {
        match self.label_kind {
            LabelKind::Predicted => {}
            LabelKind::Uncertain => {
                self.predicted_disease = language.uncertain_label().to_string();
            }
            LabelKind::Unknown => {
                self.predicted_disease = language.unknown_label().to_string();
                self.recommendation = language.unrecognized_recommendation().to_string();
            }
        }
        self
    }
}

/// Round to three decimals, as reported to callers
pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 1000.0).round() / 1000.0
}
