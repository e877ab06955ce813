//! Resolution services plus the collaborator seams and telemetry wiring the
//! orchestrator drives.

pub mod environment;
pub mod progress;
pub mod resolver;
pub mod selector;
pub mod telemetry;

pub use environment::*;
pub use progress::*;
pub use resolver::*;
pub use selector::*;
