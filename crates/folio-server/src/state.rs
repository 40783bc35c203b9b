//! Application state.

use folio_core::Aggregator;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Cache-backed aggregation service
    pub aggregator: Arc<Aggregator>,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config, aggregator: Aggregator) -> Self {
        Self {
            config: Arc::new(config),
            aggregator: Arc::new(aggregator),
            start_time: Instant::now(),
        }
    }

    /// Owner for routes that do not name one
    pub fn default_owner(&self) -> Option<&str> {
        self.config.server.default_owner.as_deref()
    }
}
