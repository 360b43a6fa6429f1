//! REST API Server for the symptom screener
//!
//! Exposes the prediction pipeline over HTTP.
//! Internal failures are logged with detail and answered with a generic message.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ScreenerError;
use crate::models::Language;
use crate::orchestrator::PredictionOrchestrator;
use crate::translation::{localize_result, Translator};

/// =============================
/// Response Models
/// =============================

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<PredictionOrchestrator>,
    pub translator: Option<Arc<dyn Translator>>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health(State(state): State<ApiState>) -> Json<Value> {
    let model = state.orchestrator.model();
    let cache = state.orchestrator.cache().stats().await;

    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "vocabulary_size": model.vocabulary().len(),
        "labels": model.classifier().labels().len(),
        "cache": cache,
        "translation_enabled": state.translator.is_some(),
    }))
}

/// =============================
/// Prediction Endpoints
/// =============================

async fn predict(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    handle_prediction(&state, payload, Language::English).await
}

async fn predict_hindi(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    handle_prediction(&state, payload, Language::Hindi).await
}

/// Pull a string `text` field out of the request body
fn extract_text(payload: Result<Json<Value>, JsonRejection>) -> Option<String> {
    let Json(body) = payload.ok()?;
    body.get("text")?.as_str().map(str::to_string)
}

async fn handle_prediction(
    state: &ApiState,
    payload: Result<Json<Value>, JsonRejection>,
    language: Language,
) -> Response {
    let request_id = Uuid::new_v4();

    let Some(text) = extract_text(payload) else {
        return error_response(StatusCode::BAD_REQUEST, language.missing_text_message());
    };

    info!(
        %request_id,
        language = language.code(),
        chars = text.len(),
        "Received prediction request"
    );

    match state.orchestrator.predict(&text, language).await {
        Ok(result) => {
            let result = match &state.translator {
                Some(translator) if language != Language::English => {
                    localize_result(translator.as_ref(), result, language).await
                }
                _ => result,
            };

            info!(
                %request_id,
                label = %result.predicted_disease,
                confidence = result.confidence_score,
                "Prediction served"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(ScreenerError::EmptyInput) => {
            error_response(StatusCode::BAD_REQUEST, language.empty_input_message())
        }
        Err(e) => {
            error!(%request_id, error = ?e, "Prediction failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                language.internal_error_message(),
            )
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/predict-hindi", post(predict_hindi))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(state: ApiState, port: u16) -> crate::Result<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResultCache;
    use crate::classifier::test_support::FixedClassifier;
    use crate::classifier::ProbabilisticClassifier;
    use crate::model::SymptomModel;
    use crate::policy::URGENT_ADVISORY;
    use crate::vocabulary::Vocabulary;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    const TERMS: &[&str] = &["itching", "skin_rash", "chest_pain", "vomiting"];

    fn vocabulary() -> Vocabulary {
        Vocabulary::new(TERMS.iter().map(|t| t.to_string()).collect()).unwrap()
    }

    fn state_with(
        classifier: Box<dyn ProbabilisticClassifier>,
        translator: Option<Arc<dyn Translator>>,
    ) -> ApiState {
        let model = SymptomModel::new(vocabulary(), classifier).unwrap();
        ApiState {
            orchestrator: Arc::new(PredictionOrchestrator::new(
                Arc::new(model),
                Arc::new(ResultCache::new(1000)),
            )),
            translator,
        }
    }

    fn state() -> ApiState {
        state_with(
            Box::new(FixedClassifier::new(
                &[("GERD", 0.1), ("Heart attack", 0.9)],
                TERMS.len(),
            )),
            None,
        )
    }

    async fn post_json(router: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_predict_success() {
        let (status, body) = post_json(
            create_router(state()),
            "/predict",
            r#"{"text": "I have chest pain and vomiting"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["predicted_disease"], "Heart attack");
        assert_eq!(body["confidence_score"], 0.9);
        assert_eq!(body["symptoms_matched"], serde_json::json!(["chest_pain", "vomiting"]));
        assert_eq!(body["recommendation"], URGENT_ADVISORY);
        assert!(body["disclaimer"].is_string());
    }

    #[tokio::test]
    async fn test_missing_text_is_bad_request() {
        let (status, body) = post_json(create_router(state()), "/predict", r#"{"msg": "hi"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing 'text' field in JSON input.");

        let (status, _) = post_json(create_router(state()), "/predict", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blank_text_is_bad_request() {
        let (status, body) = post_json(create_router(state()), "/predict", r#"{"text": "  "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Input text is empty.");

        let (status, body) =
            post_json(create_router(state()), "/predict-hindi", r#"{"text": ""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "इनपुट खाली है।");
    }

    #[tokio::test]
    async fn test_unrecognized_symptoms() {
        let (status, body) =
            post_json(create_router(state()), "/predict", r#"{"text": "asdf qwer"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["predicted_disease"], "Unknown");
        assert_eq!(body["confidence_score"], 0.0);
        assert_eq!(body["symptoms_matched"], serde_json::json!([]));
    }

    struct BrokenClassifier {
        labels: Vec<String>,
    }

    impl ProbabilisticClassifier for BrokenClassifier {
        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn n_features(&self) -> usize {
            TERMS.len()
        }

        fn predict_proba(&self, _features: &[u8]) -> Vec<f64> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn test_internal_failure_is_opaque() {
        let state = state_with(
            Box::new(BrokenClassifier {
                labels: vec!["Flu".to_string()],
            }),
            None,
        );

        let (status, body) =
            post_json(create_router(state), "/predict", r#"{"text": "itching"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({ "error": "Internal server error occurred processing your request." })
        );
    }

    struct UnavailableTranslator;

    #[async_trait]
    impl Translator for UnavailableTranslator {
        async fn translate(&self, _text: &str, _target: Language) -> crate::Result<String> {
            Err(ScreenerError::TranslationError("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_hindi_route_degrades_when_translation_fails() {
        let state = state_with(
            Box::new(FixedClassifier::new(
                &[("GERD", 0.1), ("Heart attack", 0.9)],
                TERMS.len(),
            )),
            Some(Arc::new(UnavailableTranslator) as Arc<dyn Translator>),
        );

        let (status, body) =
            post_json(create_router(state), "/predict-hindi", r#"{"text": "chest pain"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["predicted_disease"], "Heart attack");
        assert_eq!(body["confidence_score"], 0.9);
    }

    #[tokio::test]
    async fn test_hindi_route_unknown_sentinel() {
        let (status, body) =
            post_json(create_router(state()), "/predict-hindi", r#"{"text": "asdf"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["predicted_disease"], "अज्ञात");
    }

    #[tokio::test]
    async fn test_health_reports_model_and_cache() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = create_router(state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["vocabulary_size"], 4);
        assert_eq!(body["labels"], 2);
        assert_eq!(body["cache"]["capacity"], 1000);
    }
}
