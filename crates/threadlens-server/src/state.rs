//! Shared application state.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use threadlens_core::ThreadLensConfig;
use threadlens_reason::{create_engine, EngineConfig, ReasoningEngine};
use threadlens_runtime::{AnalysisRequest, Coordinator, Worker};
use threadlens_store::SqliteStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: ThreadLensConfig,
    pub store: Arc<SqliteStore>,
    pub engine_config: Arc<RwLock<EngineConfig>>,
    pub engine: Arc<dyn ReasoningEngine>,
    pub coordinator: Coordinator,
    analysis_rx: parking_lot::Mutex<Option<mpsc::UnboundedReceiver<AnalysisRequest>>>,
}

impl AppState {
    pub fn new(config: ThreadLensConfig, store: SqliteStore) -> Self {
        let engine_config = EngineConfig::load(&config.data_paths.engine_config_file);
        Self::with_engine_config(config, store, engine_config)
    }

    pub fn with_engine_config(
        config: ThreadLensConfig,
        store: SqliteStore,
        engine_config: EngineConfig,
    ) -> Self {
        let store = Arc::new(store);
        let engine_config = Arc::new(RwLock::new(engine_config));
        let engine = create_engine(engine_config.clone());
        let (coordinator, rx) = Coordinator::new(store.clone(), config.limits.clone());

        Self {
            config,
            store,
            engine_config,
            engine,
            coordinator,
            analysis_rx: parking_lot::Mutex::new(Some(rx)),
        }
    }

    /// Take the analysis receiver (can only be called once, by the worker).
    pub fn take_analysis_rx(&self) -> Option<mpsc::UnboundedReceiver<AnalysisRequest>> {
        self.analysis_rx.lock().take()
    }

    pub fn worker(&self) -> Worker {
        Worker::new(
            self.store.clone(),
            self.engine.clone(),
            self.config.limits.clone(),
        )
    }
}
