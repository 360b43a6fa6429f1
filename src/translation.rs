//! Response localization
//!
//! Translates the string fields of a result through an external service.
//! Failures never escape: each field falls back to its original text.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::config::TranslationConfig;
use crate::error::ScreenerError;
use crate::models::{Language, PredictionResult};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: Language) -> Result<String>;
}

/// Result of translating one string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    Translated(String),
    /// Already in the target script, nothing sent
    Unchanged(String),
    /// Service failed; the original text is kept
    Fallback { original: String, reason: String },
}

impl TranslationOutcome {
    pub fn into_text(self) -> String {
        match self {
            TranslationOutcome::Translated(text) | TranslationOutcome::Unchanged(text) => text,
            TranslationOutcome::Fallback { original, .. } => original,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, TranslationOutcome::Fallback { .. })
    }
}

pub async fn translate_text(
    translator: &dyn Translator,
    text: &str,
    target: Language,
) -> TranslationOutcome {
    if text.trim().is_empty() || target.is_native_script(text) {
        return TranslationOutcome::Unchanged(text.to_string());
    }

    match translator.translate(text, target).await {
        Ok(translated) => TranslationOutcome::Translated(translated),
        Err(e) => TranslationOutcome::Fallback {
            original: text.to_string(),
            reason: e.to_string(),
        },
    }
}

/// Localize every string field of `result`; numeric fields are untouched
pub async fn localize_result(
    translator: &dyn Translator,
    result: PredictionResult,
    target: Language,
) -> PredictionResult {
    if target == Language::English {
        return result;
    }

    let mut fallbacks = Vec::new();
    let mut take = |outcome: TranslationOutcome| {
        if let TranslationOutcome::Fallback { reason, .. } = &outcome {
            fallbacks.push(reason.clone());
        }
        outcome.into_text()
    };

    let predicted_disease = take(translate_text(translator, &result.predicted_disease, target).await);
    let mut symptoms_matched = Vec::with_capacity(result.symptoms_matched.len());
    for symptom in &result.symptoms_matched {
        symptoms_matched.push(take(translate_text(translator, symptom, target).await));
    }
    let recommendation = take(translate_text(translator, &result.recommendation, target).await);
    let disclaimer = take(translate_text(translator, &result.disclaimer, target).await);

    if !fallbacks.is_empty() {
        warn!(
            failed_fields = fallbacks.len(),
            first_error = %fallbacks[0],
            "Translation degraded to original text"
        );
    }

    PredictionResult {
        predicted_disease,
        symptoms_matched,
        recommendation,
        disclaimer,
        ..result
    }
}

/// Client for a LibreTranslate-compatible `/translate` endpoint
pub struct HttpTranslator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// `None` when no translation endpoint is configured
    pub fn from_config(config: &TranslationConfig) -> Result<Option<Self>> {
        match &config.api_url {
            Some(url) => Ok(Some(Self::new(
                url.clone(),
                config.api_key.clone(),
                config.timeout,
            )?)),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target: Language) -> Result<String> {
        let request = TranslateRequest {
            q: text,
            source: "auto",
            target: target.code(),
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        debug!(target = target.code(), chars = text.len(), "Calling translation API");

        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScreenerError::TranslationError(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: TranslateResponse = response.json().await.map_err(|e| {
            ScreenerError::TranslationError(format!("unreadable response: {}", e))
        })?;

        Ok(parsed.translated_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LabelKind;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        async fn translate(&self, _text: &str, _target: Language) -> Result<String> {
            Err(ScreenerError::TranslationError("service down".to_string()))
        }
    }

    struct TaggingTranslator;

    #[async_trait]
    impl Translator for TaggingTranslator {
        async fn translate(&self, text: &str, target: Language) -> Result<String> {
            Ok(format!("[{}] {}", target.code(), text))
        }
    }

    fn sample() -> PredictionResult {
        PredictionResult::new(
            "Heart attack".to_string(),
            LabelKind::Predicted,
            0.8123,
            vec!["chest_pain".to_string(), "vomiting".to_string()],
            "Seek help".to_string(),
        )
    }

    #[tokio::test]
    async fn test_localize_translates_strings_only() {
        let localized = localize_result(&TaggingTranslator, sample(), Language::Hindi).await;

        assert_eq!(localized.predicted_disease, "[hi] Heart attack");
        assert_eq!(
            localized.symptoms_matched,
            vec!["[hi] chest_pain", "[hi] vomiting"]
        );
        assert_eq!(localized.recommendation, "[hi] Seek help");
        assert!(localized.disclaimer.starts_with("[hi] "));
        assert_eq!(localized.confidence_score, 0.812);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_original() {
        let original = sample();
        let localized = localize_result(&FailingTranslator, original.clone(), Language::Hindi).await;
        assert_eq!(localized, original);
    }

    #[tokio::test]
    async fn test_native_script_is_not_sent() {
        let outcome = translate_text(&FailingTranslator, "अनिश्चित", Language::Hindi).await;
        assert_eq!(outcome, TranslationOutcome::Unchanged("अनिश्चित".to_string()));

        let outcome = translate_text(&FailingTranslator, "Uncertain", Language::Hindi).await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_text(), "Uncertain");
    }

    #[tokio::test]
    async fn test_english_target_is_passthrough() {
        let original = sample();
        let localized = localize_result(&FailingTranslator, original.clone(), Language::English).await;
        assert_eq!(localized, original);
    }

    #[tokio::test]
    async fn test_http_translator_posts_to_translate_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_partial_json(json!({ "q": "Unknown", "target": "hi" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "translatedText": "अज्ञात"
            })))
            .mount(&server)
            .await;

        let translator =
            HttpTranslator::new(server.uri(), None, Duration::from_secs(5)).unwrap();
        let translated = translator.translate("Unknown", Language::Hindi).await.unwrap();
        assert_eq!(translated, "अज्ञात");
    }

    #[tokio::test]
    async fn test_http_translator_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let translator =
            HttpTranslator::new(server.uri(), None, Duration::from_secs(5)).unwrap();
        let err = translator.translate("Unknown", Language::Hindi).await.unwrap_err();
        assert!(matches!(err, ScreenerError::TranslationError(_)));
    }

    #[test]
    fn test_from_config_without_url() {
        let translator = HttpTranslator::from_config(&TranslationConfig::default()).unwrap();
        assert!(translator.is_none());
    }
}
