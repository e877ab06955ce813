//! Record-store adapters that satisfy the domain `RecordStore` trait.
//!
//! `SeaOrmRecordStore` keeps the database backend swappable (SQLite by
//! default, PostgreSQL via feature flag); `WebApiRecordStore` talks to an
//! OData-style HTTP record API.

mod entity;
mod migration;
mod record_store;
mod web_api;

use std::sync::Arc;

use endpoint_relay_domain::storage::{RecordStore, StorageError, StorageResult};
use migration::run_migrations;
use sea_orm::{Database, DatabaseConnection};

pub use web_api::WebApiRecordStore;

/// SeaORM-backed record store over the configuration tables.
#[derive(Clone)]
pub struct SeaOrmRecordStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmRecordStore {
    /// Connects to the provided database URL and ensures the schema is present.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let db = Database::connect(database_url)
            .await
            .map_err(StorageError::from_source)?;
        run_migrations(&db).await?;
        Ok(Self { db: Arc::new(db) })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }
}

/// Picks the adapter from the URL scheme: `http(s)://` goes to the Web API
/// store, anything else is handed to SeaORM.
pub async fn connect_record_store(
    url: &str,
    token: Option<&str>,
) -> StorageResult<Arc<dyn RecordStore>> {
    if url.starts_with("http://") || url.starts_with("https://") {
        let store = WebApiRecordStore::new(url, token.map(str::to_string))?;
        return Ok(Arc::new(store));
    }

    let store = SeaOrmRecordStore::connect(url).await?;
    Ok(Arc::new(store))
}
