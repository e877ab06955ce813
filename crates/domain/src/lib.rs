//! Domain-level building blocks shared across the dispatch and API crates.
//!
//! Everything needed to turn a configuration name into a resolved endpoint
//! lives here: the record-store seam, the two-step config resolver, the
//! endpoint selector and the collaborator traits the orchestrator drives.

pub mod config;
pub mod error;
pub mod model;
pub mod services;
pub mod storage;

pub use error::RelayError;
pub use model::*;
pub use storage::*;
