use std::sync::{Arc, Mutex};

use crate::assets::{FontLoader, ImageDecoder};
use crate::config::Config;
use crate::errors::AppError;
use crate::layout::LayoutEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The engine owns both memoization caches; one call holds the lock at a time.
    pub engine: Arc<Mutex<LayoutEngine>>,
    pub config: Config,
    pub font_loader: Arc<dyn FontLoader>,
    pub decoder: Arc<dyn ImageDecoder>,
}

impl AppState {
    /// Runs `f` against the engine on a blocking thread.
    ///
    /// The lock is taken inside the blocking task and released when `f` returns.
    pub async fn with_engine<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut LayoutEngine) -> T + Send + 'static,
        T: Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || {
            let mut guard = engine
                .lock()
                .map_err(|e| AppError::Internal(anyhow::anyhow!("layout engine lock poisoned: {e}")))?;
            Ok(f(&mut guard))
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in layout engine: {e}")))?
    }
}
