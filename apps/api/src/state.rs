use std::sync::Arc;

use crate::config::Config;
use crate::matching::engine::MatchEngine;
use crate::notify::Notifier;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only: requests never share mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: Arc<MatchEngine>,
    /// Pluggable invitation sender. Default: LogNotifier.
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(config: Config, notifier: Arc<dyn Notifier>) -> Self {
        let engine = Arc::new(config.match_engine());
        Self {
            config,
            engine,
            notifier,
        }
    }
}
