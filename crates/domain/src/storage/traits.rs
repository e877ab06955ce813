use async_trait::async_trait;
use thiserror::Error;

use super::query::{Record, RecordQuery};

/// Common result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("record store backend error: {0}")]
    Backend(String),
    #[error("unknown table `{0}`")]
    UnknownTable(String),
    #[error("unknown field `{field}` on table `{table}`")]
    UnknownField { table: String, field: String },
    #[error("record from `{table}` is missing field `{field}`")]
    MissingField { table: String, field: String },
}

impl StorageError {
    pub fn from_source(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Generic "fetch records matching a filter from a named table" capability.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn query(&self, query: &RecordQuery) -> StorageResult<Vec<Record>>;
}

#[async_trait]
impl<S> RecordStore for std::sync::Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn query(&self, query: &RecordQuery) -> StorageResult<Vec<Record>> {
        self.as_ref().query(query).await
    }
}
