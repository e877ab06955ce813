use thiserror::Error;

use crate::model::{IdentifierError, TransportError};
use crate::storage::StorageError;

/// Every way resolving or calling an endpoint can fail.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("configuration `{name}` not found ({matches} matching definitions)")]
    ConfigNotFound { name: String, matches: usize },
    #[error(
        "configuration `{name}` has {matches} values for definition `{definition_id}`, expected one"
    )]
    ConfigValueMissing {
        name: String,
        definition_id: String,
        matches: usize,
    },
    #[error("malformed endpoint configuration: {0}")]
    MalformedConfig(#[from] serde_json::Error),
    #[error("no endpoint configured for environment `{environment}`")]
    NoEndpointForEnvironment { environment: String },
    #[error("record store query for `{name}` on `{table}` failed ({query}): {source}")]
    RecordStore {
        name: String,
        table: String,
        query: String,
        #[source]
        source: StorageError,
    },
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("request failed with status {status}: {reason}")]
    RequestFailed { status: u16, reason: String },
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),
}
