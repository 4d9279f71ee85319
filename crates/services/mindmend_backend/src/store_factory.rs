//! Picks the schedule store backing the API.
//!
//! With the `database` feature and a `database` section in the config the SQL
//! repository is used; otherwise the process falls back to the in-memory
//! store, which loses its data on restart.

use mindmend_common::{MindmendError, ScheduleStore};
use mindmend_config::AppConfig;
use mindmend_scheduling::InMemoryScheduleStore;
use std::sync::Arc;
#[allow(unused_imports)] // used only with the database feature
use tracing::{info, warn};

#[cfg(feature = "database")]
use mindmend_db::{DbClient, SqlScheduleRepository};

/// Builds the store for `config`. Database errors are fatal.
pub async fn create_store(config: &AppConfig) -> Result<Arc<dyn ScheduleStore>, MindmendError> {
    #[cfg(feature = "database")]
    if config.database.is_some() {
        let client = DbClient::new(config).await?;
        info!("Using SQL schedule store ({})", client);
        let repository = SqlScheduleRepository::new(client);
        repository.init_schema().await?;
        return Ok(Arc::new(repository));
    }

    if config.database.is_some() {
        warn!("A database is configured but the database feature is disabled");
    }
    warn!("No database configured; schedule data is kept in memory only");
    Ok(Arc::new(InMemoryScheduleStore::new()))
}
