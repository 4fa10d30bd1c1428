//! Application context shared by all route handlers via Axum state.
//!
//! [`AppContext`] wraps immutable infrastructure (configuration, discovered
//! tools, the extractor) in `Arc`s. The only shared mutable piece is the
//! [`ExtractionPool`] semaphore; every request otherwise works in its own
//! directory.

use std::sync::Arc;
use std::time::Duration;

use mg_core::config::Config;
use mg_extract::{Extractor, ToolRegistry, YtDlpExtractor};

use crate::pool::ExtractionPool;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub tools: Arc<ToolRegistry>,
    pub extractor: Arc<dyn Extractor>,
    pub pool: ExtractionPool,
}

impl AppContext {
    /// Discover tools and build a context backed by yt-dlp.
    pub fn new(config: Config) -> Self {
        let tools = Arc::new(ToolRegistry::discover(&config.tools));
        let extractor = Arc::new(YtDlpExtractor::new(tools.clone()));
        Self::with_extractor(config, tools, extractor)
    }

    /// Build a context around an explicit extractor.
    pub fn with_extractor(
        config: Config,
        tools: Arc<ToolRegistry>,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        let pool = ExtractionPool::new(config.extraction.worker_slots());
        Self {
            config: Arc::new(config),
            tools,
            extractor,
            pool,
        }
    }

    /// Per-extraction time limit.
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.config.extraction.timeout_secs)
    }
}
