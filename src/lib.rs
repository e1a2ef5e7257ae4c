pub mod config;
pub mod rest;
pub mod stats;
pub mod storage;
pub mod tasks;

use std::sync::Arc;

use config::DaemonConfig;
use storage::Storage;
use tasks::MutationCoordinator;

/// Shared application state passed to every request handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<DaemonConfig>,
    pub storage: Arc<Storage>,
    /// Sole write path for tasks — one serializable transaction per mutation.
    pub coordinator: Arc<MutationCoordinator>,
    pub started_at: std::time::Instant,
}

impl AppContext {
    pub fn new(config: Arc<DaemonConfig>, storage: Arc<Storage>) -> Self {
        let coordinator = Arc::new(MutationCoordinator::new(storage.pool()));
        Self {
            config,
            storage,
            coordinator,
            started_at: std::time::Instant::now(),
        }
    }
}
