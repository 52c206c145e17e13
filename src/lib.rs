pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod post;
pub mod prompt;
pub mod scheduler;
pub mod scraper;
pub mod search;

use std::sync::Arc;
use pipeline::Pipeline;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}
