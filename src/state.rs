use crate::analytics::AttemptAnalyzer;
use crate::assistant::Assistant;
use crate::backend::BackendClient;
use crate::config::Config;
use crate::error::Result;
use crate::seed::seed_demo;
use crate::store::Store;
use std::sync::{Mutex, MutexGuard};

pub struct AppState {
    pub config: Config,
    pub backend: BackendClient,
    pub assistant: Assistant,
    pub analyzer: AttemptAnalyzer,
    store: Mutex<Store>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let mut store = Store::new();
        if config.seed_demo_data {
            seed_demo(&mut store)?;
        }
        let backend = BackendClient::new(config.backend_url.clone(), config.http_timeout);
        let assistant = Assistant::new(
            config.ai_api_key.clone(),
            config.ai_endpoint.clone(),
            config.ai_model.clone(),
            config.http_timeout,
        );
        Ok(Self {
            config,
            backend,
            assistant,
            analyzer: AttemptAnalyzer::new(),
            store: Mutex::new(store),
        })
    }

    /// Locks the store. Callers must drop the guard before any `.await`.
    pub fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
