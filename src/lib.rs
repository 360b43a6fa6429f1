//! Symptom Screener
//!
//! Turns a free-text symptom description into a predicted condition with a
//! confidence score, the matched symptoms and a safety-oriented advisory:
//! - Normalizes text and matches it against a fixed symptom vocabulary
//! - Classifies the binary symptom vector with a pre-trained ensemble
//! - Applies confidence thresholds and a serious-symptom override
//! - Caches results per symptom set under concurrent access
//!
//! PIPELINE:
//! TEXT → NORMALIZE → MATCH → CACHE? → VECTORIZE → CLASSIFY → POLICY → RESPOND

pub mod api;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod policy;
pub mod translation;
pub mod vectorizer;
pub mod vocabulary;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use cache::ResultCache;
pub use model::SymptomModel;
pub use orchestrator::PredictionOrchestrator;
