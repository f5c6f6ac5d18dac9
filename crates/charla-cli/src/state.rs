//! Shared application state for both entry points.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use charla_core::engine::InferenceEngine;
use charla_infra::config;
use charla_infra::llama::LlamaServerEngine;
use charla_infra::store::DocumentStore;
use charla_types::config::Settings;

/// Everything a session loop needs, built once at startup.
pub struct AppState {
    pub settings: Settings,
    pub engine: Arc<dyn InferenceEngine>,
    pub vision_engine: Arc<dyn InferenceEngine>,
    pub store: DocumentStore,
}

impl AppState {
    pub async fn init(config_path: &Path) -> anyhow::Result<Self> {
        let settings = config::load_settings(config_path).await;

        let store = DocumentStore::open(&settings.database_path).await?;
        // The store is wired read-only: nothing downstream consumes this
        // yet, matching the placeholder role it has in the product.
        let documents = store.fetch_all().await?;
        debug!(count = documents.len(), "document store opened");

        let engine: Arc<dyn InferenceEngine> =
            Arc::new(LlamaServerEngine::new(settings.engine.clone()));
        let vision_engine: Arc<dyn InferenceEngine> =
            Arc::new(LlamaServerEngine::new(settings.vision.clone()));

        Ok(Self {
            settings,
            engine,
            vision_engine,
            store,
        })
    }
}
