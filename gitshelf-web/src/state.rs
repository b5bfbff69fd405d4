//! Shared application state

use crate::WebResult;
use gitshelf_core::ShelfConfig;
use gitshelf_repo::RepositoryEngine;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RepositoryEngine>,
}

impl AppState {
    /// Validate `config` and build an engine on the system git
    pub fn new(config: ShelfConfig) -> WebResult<Self> {
        config.validate()?;
        info!(store_root = %config.store_root.display(), "repository store configured");
        Ok(Self::from_engine(RepositoryEngine::new(config)))
    }

    pub fn from_engine(engine: RepositoryEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
