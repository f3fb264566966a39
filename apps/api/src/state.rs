use std::sync::Arc;

use crate::config::Config;
use crate::review::ingest::TextExtractionAdapter;
use crate::review::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Review pipeline bound to the process-wide generation client.
    pub pipeline: Pipeline,
    /// Turns uploaded files into review text. Default: `PlainTextAdapter`.
    pub adapter: Arc<dyn TextExtractionAdapter>,
    pub config: Config,
}
