use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use shared_config::AppConfig;
use shared_database::{FileBackend, RecordStore, StoreError};

/// Shared handler state: configuration plus the record store every cell
/// reads and writes through.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: RecordStore,
}

impl AppState {
    pub fn new(config: AppConfig, store: RecordStore) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Opens the file store when a data directory is configured, otherwise
    /// keeps everything in memory.
    pub async fn from_config(config: AppConfig) -> Result<Self, StoreError> {
        let store = match &config.data_dir {
            Some(dir) => RecordStore::new(Arc::new(FileBackend::open(dir).await?)),
            None => {
                info!("Using in-memory record store");
                RecordStore::in_memory()
            }
        };

        Ok(Self::new(config, store))
    }

    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.status_poll_interval_ms)
    }
}
