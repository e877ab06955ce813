//! Record-store seam: the query builder the resolver speaks and the trait
//! adapters implement.

mod query;
mod traits;

pub use query::{FieldFilter, Record, RecordQuery};
pub use traits::{RecordStore, StorageError, StorageResult};

/// Logical table holding configuration definitions.
pub const DEFINITION_TABLE: &str = "configuration-definition";
/// Logical table holding configuration values.
pub const VALUE_TABLE: &str = "configuration-value";

/// Logical field names understood by every adapter.
pub mod fields {
    pub const ID: &str = "id";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const DEFINITION_ID: &str = "definitionId";
    pub const RAW_TEXT: &str = "rawText";
}
