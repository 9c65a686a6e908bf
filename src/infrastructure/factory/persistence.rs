//! Persistence factory.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::sqlite::database::connection;
use crate::adapter::outbound::sqlite::SqliteStore;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Open the SQLite database, apply migrations and return the store.
pub fn build_store(config: &Config) -> Result<Arc<SqliteStore>> {
    let db_url = format!("sqlite://{}", config.database);
    let pool = connection::open(&db_url)?;
    info!(database = %config.database, "Database ready");
    Ok(Arc::new(SqliteStore::new(pool)))
}
