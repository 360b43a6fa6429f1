use std::sync::Arc;
use symptom_screener::{
    api::{start_server, ApiState},
    cache::ResultCache,
    config::ScreenerConfig,
    model::SymptomModel,
    orchestrator::PredictionOrchestrator,
    translation::{HttpTranslator, Translator},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ScreenerConfig::from_env()?;

    info!("Symptom Screener - API Server");
    info!("Port: {}", config.port);

    // Never serve with a half-initialized model
    let model = Arc::new(SymptomModel::load_or_train(&config.model, &config.training)?);
    info!(
        symptoms = model.vocabulary().len(),
        labels = model.classifier().labels().len(),
        "Model ready"
    );

    let cache = Arc::new(ResultCache::new(config.cache_capacity));
    cache.spawn_sweeper(config.sweep_interval);

    let translator: Option<Arc<dyn Translator>> = match HttpTranslator::from_config(&config.translation)? {
        Some(translator) => Some(Arc::new(translator)),
        None => {
            warn!("TRANSLATION_API_URL not set; Hindi responses will not be translated");
            None
        }
    };

    let state = ApiState {
        orchestrator: Arc::new(PredictionOrchestrator::new(model, cache)),
        translator,
    };

    info!("Starting API server...");
    start_server(state, config.port).await?;

    Ok(())
}
