use std::sync::Arc;

use crate::config::Config;
use crate::services::Recommender;

/// Shared application state
///
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    /// `k` used when a request omits it
    pub default_k: usize,
    /// Largest `k` a request may ask for
    pub max_k: usize,
}

impl AppState {
    pub fn new(recommender: Arc<Recommender>, config: &Config) -> Self {
        Self::with_limits(recommender, config.default_k, config.max_k)
    }

    pub fn with_limits(recommender: Arc<Recommender>, default_k: usize, max_k: usize) -> Self {
        Self {
            recommender,
            default_k,
            max_k,
        }
    }
}
