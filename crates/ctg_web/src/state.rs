use std::sync::Arc;
use ctg_fetch::Aggregator;

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_MAX_LIMIT: usize = 100;

pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    /// Largest `limit` a single request may ask for.
    pub max_limit: usize,
}

impl AppState {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self {
            aggregator,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }

    pub fn with_max_limit(mut self, max_limit: usize) -> Self {
        self.max_limit = max_limit;
        self
    }
}
