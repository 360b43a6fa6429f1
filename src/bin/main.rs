use std::sync::Arc;
use symptom_screener::{
    cache::ResultCache, config::ScreenerConfig, model::SymptomModel,
    orchestrator::PredictionOrchestrator, Language,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut language = Language::English;
    let mut words = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--hindi" {
            language = Language::Hindi;
        } else {
            words.push(arg);
        }
    }

    if words.is_empty() {
        eprintln!("usage: screener [--hindi] <symptom description>");
        std::process::exit(2);
    }
    let text = words.join(" ");

    let config = ScreenerConfig::from_env()?;
    let model = Arc::new(SymptomModel::load_or_train(&config.model, &config.training)?);
    let orchestrator =
        PredictionOrchestrator::new(model, Arc::new(ResultCache::new(config.cache_capacity)));

    info!(text = %text, "Screening symptoms");

    match orchestrator.predict(&text, language).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("Screening failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
